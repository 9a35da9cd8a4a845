//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::convert::{options::RenderOptions, Converter};
use crate::renderer::RendererHandle;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: Config,
    converter: Converter,
}

impl AppState {
    /// Create the application state around a renderer handle.
    ///
    /// The handle is lazy: no engine is launched here. Callers that want a
    /// warm browser at startup acquire one explicitly.
    pub fn new(config: Config, renderer: RendererHandle) -> Self {
        let converter = Converter::new(
            Arc::new(renderer),
            RenderOptions::default(),
            config.renderer.conversion_timeout,
        );
        Self {
            inner: Arc::new(AppStateInner { config, converter }),
        }
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn converter(&self) -> &Converter {
        &self.inner.converter
    }

    /// Shut down the renderer engine gracefully.
    ///
    /// Called before the process exits so the browser child is reaped.
    pub async fn shutdown(&self) {
        tracing::info!("Shutting down application state...");
        self.inner.converter.shutdown().await;
    }
}
