//! Conversion orchestration
//!
//! Turns HTML documents into PDF bytes through the shared renderer: single
//! conversions under a wall-clock timeout, batch fan-out with partial-failure
//! aggregation, and packaging of batch results into a zip archive or an
//! inline-base64 JSON body.

pub mod batch;
pub mod error;
pub mod options;
pub mod package;
pub mod single;
pub mod types;

use std::sync::Arc;
use std::time::Duration;

use crate::renderer::{EngineError, RendererHandle};
use options::RenderOptions;

pub use error::ConvertError;
pub use types::{BatchOutcome, ConversionFailure, RenderJob};

/// Conversion service: the shared renderer handle plus the immutable
/// options and timeout applied to every job.
///
/// Single conversions live in [`single`], batch fan-out in [`batch`].
pub struct Converter {
    renderer: Arc<RendererHandle>,
    options: RenderOptions,
    conversion_timeout: Duration,
}

impl Converter {
    pub fn new(
        renderer: Arc<RendererHandle>,
        options: RenderOptions,
        conversion_timeout: Duration,
    ) -> Self {
        Self { renderer, options, conversion_timeout }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Eagerly create the renderer engine so the first request doesn't pay
    /// the launch cost.
    pub async fn warm_up(&self) -> Result<(), EngineError> {
        self.renderer.acquire().await.map(|_| ())
    }

    /// Close the underlying renderer engine.
    pub async fn shutdown(&self) {
        self.renderer.shutdown().await;
    }
}
