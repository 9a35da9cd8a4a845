//! Headless Chrome engine adapter
//!
//! Drives a shared Chrome instance over CDP via the `headless_chrome` crate.
//! The crate's client is blocking, so every call is bridged onto the tokio
//! blocking pool; the `Browser` handle is cheaply cloneable and thread-safe,
//! which lets concurrent conversions run their own tabs against the one
//! underlying connection.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use headless_chrome::browser::tab::Tab;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptions};
use parking_lot::Mutex;

use super::engine::{EngineError, EngineFactory, RenderContext, RenderEngine, Result};
use crate::config::RendererConfig;
use crate::convert::options::RenderOptions;

/// Hardening flags carried over from the original deployment; they keep the
/// browser usable inside unprivileged containers. `--no-sandbox` is covered
/// by `LaunchOptions::sandbox(false)`.
const CHROME_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-accelerated-2d-canvas",
    "--no-first-run",
    "--disable-gpu",
    "--disable-software-rasterizer",
];

/// The shared instance must survive quiet periods between requests; the
/// crate's default idle timeout would reap it after 30 seconds.
const IDLE_BROWSER_TIMEOUT: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// Classify an engine-reported error, separating elapsed waits from
/// everything else.
fn engine_error(err: anyhow::Error) -> EngineError {
    if err.downcast_ref::<headless_chrome::util::Timeout>().is_some() {
        return EngineError::Timeout(err.to_string());
    }
    let message = err.to_string();
    if message.to_ascii_lowercase().contains("timed out") {
        EngineError::Timeout(message)
    } else {
        EngineError::Render(message)
    }
}

/// A blocking-pool task was cancelled or panicked.
fn task_error(err: tokio::task::JoinError) -> EngineError {
    EngineError::Render(format!("Render task failed: {}", err))
}

/// Map [`RenderOptions`] onto the CDP `Page.printToPDF` parameters.
///
/// The mapping is pure: identical options always produce identical CDP
/// parameters. `landscape` is only set when requested, matching the
/// engine's own default otherwise.
pub fn print_options(options: &RenderOptions) -> PrintToPdfOptions {
    let (paper_width, paper_height) = options.format.paper_size_inches();
    PrintToPdfOptions {
        landscape: if options.landscape { Some(true) } else { None },
        display_header_footer: Some(true),
        print_background: Some(options.print_background),
        scale: Some(options.scale),
        paper_width: Some(paper_width),
        paper_height: Some(paper_height),
        margin_top: Some(options.margin.top_inches()),
        margin_bottom: Some(options.margin.bottom_inches()),
        margin_left: Some(options.margin.left_inches()),
        margin_right: Some(options.margin.right_inches()),
        header_template: Some("<div></div>".to_string()),
        footer_template: Some(options.footer_html()),
        ..Default::default()
    }
}

/// Factory that launches headless Chrome processes.
pub struct ChromeEngineFactory {
    config: RendererConfig,
}

impl ChromeEngineFactory {
    pub fn new(config: RendererConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl EngineFactory for ChromeEngineFactory {
    async fn create(&self) -> Result<Arc<dyn RenderEngine>> {
        let engine = ChromeEngine::launch(&self.config).await?;
        Ok(Arc::new(engine))
    }
}

/// A live headless Chrome instance.
///
/// The browser slot is emptied on [`close`](RenderEngine::close); in-flight
/// calls hold their own `Browser` clone, and the process is terminated once
/// the last clone drops.
pub struct ChromeEngine {
    browser: Mutex<Option<Browser>>,
    load_timeout: Duration,
}

impl ChromeEngine {
    /// Launch a new headless Chrome process.
    pub async fn launch(config: &RendererConfig) -> Result<Self> {
        let chrome_path = config.chrome_path.clone();
        let load_timeout = config.load_timeout;

        let browser = tokio::task::spawn_blocking(move || {
            let args: Vec<&OsStr> = CHROME_ARGS.iter().map(OsStr::new).collect();
            let options = LaunchOptions::default_builder()
                .headless(true)
                .sandbox(false)
                .args(args)
                .path(chrome_path)
                .idle_browser_timeout(IDLE_BROWSER_TIMEOUT)
                .build()
                .map_err(|e| {
                    EngineError::Unavailable(format!("Failed to build launch options: {}", e))
                })?;

            Browser::new(options)
                .map_err(|e| EngineError::Unavailable(format!("Failed to launch browser: {}", e)))
        })
        .await
        .map_err(|e| EngineError::Unavailable(format!("Browser launch task failed: {}", e)))??;

        Ok(Self {
            browser: Mutex::new(Some(browser)),
            load_timeout,
        })
    }

    fn current_browser(&self) -> Result<Browser> {
        self.browser
            .lock()
            .clone()
            .ok_or_else(|| EngineError::Unavailable("Browser has been shut down".to_string()))
    }
}

#[async_trait]
impl RenderEngine for ChromeEngine {
    async fn is_connected(&self) -> bool {
        let Ok(browser) = self.current_browser() else {
            return false;
        };
        tokio::task::spawn_blocking(move || browser.get_version().is_ok())
            .await
            .unwrap_or(false)
    }

    async fn new_context(&self) -> Result<Box<dyn RenderContext>> {
        let browser = self.current_browser()?;
        let load_timeout = self.load_timeout;

        let tab = tokio::task::spawn_blocking(move || {
            let tab = browser.new_tab().map_err(engine_error)?;
            tab.set_default_timeout(load_timeout);
            Ok::<_, EngineError>(tab)
        })
        .await
        .map_err(task_error)??;

        Ok(Box::new(ChromeContext { tab }))
    }

    async fn close(&self) -> Result<()> {
        let browser = self.browser.lock().take();
        if let Some(browser) = browser {
            // Dropping the last handle terminates the Chrome process; the
            // drop can block on process reaping, so keep it off the runtime.
            tokio::task::spawn_blocking(move || drop(browser))
                .await
                .map_err(task_error)?;
        }
        Ok(())
    }
}

/// One Chrome tab, exclusively owned by a single conversion.
struct ChromeContext {
    tab: Arc<Tab>,
}

#[async_trait]
impl RenderContext for ChromeContext {
    async fn load_html(&self, html: &str) -> Result<()> {
        let tab = Arc::clone(&self.tab);
        // Data-URL navigation sidesteps any filesystem or network round trip
        // for the document itself; subresources still load normally.
        let url = format!("data:text/html;charset=utf-8;base64,{}", BASE64.encode(html));

        tokio::task::spawn_blocking(move || {
            tab.navigate_to(&url).map_err(engine_error)?;
            tab.wait_until_navigated().map_err(engine_error)?;
            Ok(())
        })
        .await
        .map_err(task_error)?
    }

    async fn print_to_pdf(&self, options: &RenderOptions) -> Result<Vec<u8>> {
        let tab = Arc::clone(&self.tab);
        let pdf_options = print_options(options);

        tokio::task::spawn_blocking(move || {
            tab.print_to_pdf(Some(pdf_options)).map_err(engine_error)
        })
        .await
        .map_err(task_error)?
    }

    async fn close(&self) -> Result<()> {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || {
            tab.close(false).map_err(engine_error)?;
            Ok(())
        })
        .await
        .map_err(task_error)?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::convert::options::{Margins, PageFormat};

    #[test]
    fn test_print_options_defaults() {
        let options = RenderOptions::default();
        let cdp = print_options(&options);

        assert_eq!(cdp.landscape, None);
        assert_eq!(cdp.display_header_footer, Some(true));
        assert_eq!(cdp.print_background, Some(true));
        assert_eq!(cdp.scale, Some(1.0));
        assert_eq!(cdp.paper_width, Some(8.27));
        assert_eq!(cdp.paper_height, Some(11.69));
        assert_eq!(cdp.header_template.as_deref(), Some("<div></div>"));
        assert!(cdp
            .footer_template
            .as_deref()
            .unwrap()
            .contains(&options.footer_text));
    }

    #[test]
    fn test_print_options_landscape_only_when_set() {
        let mut options = RenderOptions::default();
        options.landscape = true;
        assert_eq!(print_options(&options).landscape, Some(true));

        options.landscape = false;
        assert_eq!(print_options(&options).landscape, None);
    }

    #[test]
    fn test_print_options_margin_conversion() {
        let options = RenderOptions {
            margin: Margins::uniform(2.54),
            ..RenderOptions::default()
        };
        let cdp = print_options(&options);

        // 2.54 cm is exactly one inch
        assert!((cdp.margin_top.unwrap() - 1.0).abs() < 1e-9);
        assert!((cdp.margin_left.unwrap() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_print_options_deterministic() {
        let options = RenderOptions {
            format: PageFormat::Letter,
            landscape: true,
            scale: 0.8,
            ..RenderOptions::default()
        };
        let a = print_options(&options);
        let b = print_options(&options);
        assert_eq!(format!("{:?}", a), format!("{:?}", b));
    }
}
