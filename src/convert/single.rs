//! Single HTML-to-PDF conversion
//!
//! One job, one isolated rendering context, two timeout-bounded phases
//! (load, print). The context is released on every exit path; release
//! errors never override the primary outcome.

use tokio::time::timeout;

use super::error::ConvertError;
use super::types::RenderJob;
use super::Converter;
use crate::renderer::RenderContext;

impl Converter {
    /// Convert one HTML document to PDF bytes.
    ///
    /// The load and print phases are each bounded by the overall conversion
    /// timeout; the shorter context-level load timeout applies underneath.
    /// Whichever elapses first classifies the failure as a timeout.
    pub async fn convert(&self, job: RenderJob) -> Result<Vec<u8>, ConvertError> {
        let prefix = match job.index {
            Some(index) => format!("[Index {}] ", index),
            None => String::new(),
        };
        tracing::info!("{}Starting HTML to PDF conversion", prefix);

        let engine = self
            .renderer
            .acquire()
            .await
            .map_err(|e| ConvertError::EngineUnavailable(e.to_string()))?;

        let timeout_secs = self.conversion_timeout.as_secs();
        let context = engine
            .new_context()
            .await
            .map_err(|e| ConvertError::from_engine(e, timeout_secs, job.index))?;
        tracing::debug!("{}Rendering context created, loading HTML content", prefix);

        let result = self.render_in_context(context.as_ref(), &job).await;

        // Release the context on every exit path; a failed close must not
        // mask the conversion result.
        if let Err(e) = context.close().await {
            tracing::warn!("{}Error closing rendering context: {}", prefix, e);
        }

        match &result {
            Ok(pdf) => {
                tracing::info!("{}PDF generated successfully, size: {} bytes", prefix, pdf.len());
            }
            Err(e) => {
                tracing::error!("{}{}", prefix, e);
            }
        }
        result
    }

    async fn render_in_context(
        &self,
        context: &dyn RenderContext,
        job: &RenderJob,
    ) -> Result<Vec<u8>, ConvertError> {
        let timeout_secs = self.conversion_timeout.as_secs();

        match timeout(self.conversion_timeout, context.load_html(&job.html)).await {
            Err(_) => return Err(ConvertError::timeout(timeout_secs, job.index)),
            Ok(Err(e)) => return Err(ConvertError::from_engine(e, timeout_secs, job.index)),
            Ok(Ok(())) => {}
        }

        match timeout(self.conversion_timeout, context.print_to_pdf(&self.options)).await {
            Err(_) => Err(ConvertError::timeout(timeout_secs, job.index)),
            Ok(Err(e)) => Err(ConvertError::from_engine(e, timeout_secs, job.index)),
            Ok(Ok(pdf)) => Ok(pdf),
        }
    }
}
