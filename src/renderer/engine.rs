//! Rendering engine abstraction
//!
//! The conversion layer never talks to a concrete browser directly. It goes
//! through these traits so the engine can be swapped out (and faulted) in
//! tests.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::convert::options::RenderOptions;

/// Errors reported by the rendering engine or its driver.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The engine process could not be started or has gone away.
    #[error("Renderer engine unavailable: {0}")]
    Unavailable(String),

    /// A context-level wait (navigation, load) ran out of time.
    #[error("Renderer wait timed out: {0}")]
    Timeout(String),

    /// Any other error surfaced by the engine during load or render.
    #[error("Render error: {0}")]
    Render(String),
}

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// A live connection to the rendering engine.
///
/// Exactly one live engine exists process-wide; see
/// [`RendererHandle`](super::handle::RendererHandle).
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Probe whether the engine connection is still usable.
    async fn is_connected(&self) -> bool;

    /// Open an isolated rendering context (one browser tab).
    ///
    /// Contexts are single-use and exclusively owned by one conversion;
    /// they are never shared across jobs.
    async fn new_context(&self) -> Result<Box<dyn RenderContext>>;

    /// Tear down the engine connection.
    async fn close(&self) -> Result<()>;
}

/// An isolated, single-use rendering context scoped to one conversion.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Load the HTML document and wait until it has finished loading
    /// (no in-flight subresource requests remain).
    ///
    /// Bounded by the context-level load timeout configured at creation.
    async fn load_html(&self, html: &str) -> Result<()>;

    /// Print the loaded document to PDF with the given options.
    async fn print_to_pdf(&self, options: &RenderOptions) -> Result<Vec<u8>>;

    /// Release the context. Safe to call on any exit path.
    async fn close(&self) -> Result<()>;
}

/// Factory for engine instances.
///
/// Production wires in [`ChromeEngineFactory`](super::chrome::ChromeEngineFactory);
/// tests inject counting or faulty doubles.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn create(&self) -> Result<Arc<dyn RenderEngine>>;
}
