//! Configuration management
//!
//! All knobs come from the environment with sensible defaults; `.env` files
//! are loaded by `main` before this runs.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub limits: LimitsConfig,
    pub renderer: RendererConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Externally supplied request limits, enforced at the HTTP boundary.
#[derive(Debug, Clone)]
pub struct LimitsConfig {
    /// Maximum number of documents per batch request.
    pub max_batch_size: usize,
    /// Maximum size of a single HTML payload in bytes.
    pub max_html_size: usize,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Overall wall-clock bound for each of the load and render phases.
    pub conversion_timeout: Duration,
    /// Shorter context-level timeout applied to in-page waits.
    pub load_timeout: Duration,
    /// Optional browser binary override; auto-detected when unset.
    pub chrome_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            limits: LimitsConfig {
                max_batch_size: 1000,
                max_html_size: 10_000_000,
            },
            renderer: RendererConfig {
                conversion_timeout: Duration::from_secs(60),
                load_timeout: Duration::from_secs(30),
                chrome_path: None,
            },
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Config::default();
        Config {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or(defaults.server.host),
                port: env_parse("PORT", defaults.server.port),
            },
            limits: LimitsConfig {
                max_batch_size: env_parse("MAX_BATCH_SIZE", defaults.limits.max_batch_size),
                max_html_size: env_parse("MAX_HTML_SIZE", defaults.limits.max_html_size),
            },
            renderer: RendererConfig {
                conversion_timeout: Duration::from_secs(env_parse("CONVERSION_TIMEOUT", 60)),
                load_timeout: Duration::from_secs(env_parse("BROWSER_TIMEOUT", 30)),
                chrome_path: env::var("CHROME_PATH").ok().map(PathBuf::from),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.limits.max_batch_size, 1000);
        assert_eq!(config.limits.max_html_size, 10_000_000);
        assert_eq!(config.renderer.conversion_timeout, Duration::from_secs(60));
        assert_eq!(config.renderer.load_timeout, Duration::from_secs(30));
        assert!(config.renderer.chrome_path.is_none());
    }

    #[test]
    fn test_unparseable_env_value_falls_back_to_default() {
        env::set_var("PLATEN_TEST_PORT", "not-a-number");
        assert_eq!(env_parse("PLATEN_TEST_PORT", 3000u16), 3000);
        env::remove_var("PLATEN_TEST_PORT");
    }
}
