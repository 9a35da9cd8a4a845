//! Conversion error taxonomy
//!
//! A tagged result type rather than exception-style control flow: the batch
//! orchestrator pattern-matches on these variants to classify per-item
//! failures, and the HTTP layer maps them onto status codes.

use thiserror::Error;

use crate::renderer::EngineError;

#[derive(Debug, Error)]
pub enum ConvertError {
    /// The renderer could not be created. Fatal for the request, not the
    /// process.
    #[error("Renderer engine unavailable: {0}")]
    EngineUnavailable(String),

    /// Either the context-level load timeout or the overall conversion
    /// timeout elapsed, whichever came first.
    #[error("Conversion timeout after {timeout_secs}s")]
    Timeout {
        timeout_secs: u64,
        index: Option<usize>,
    },

    /// The engine reported an error during load or render.
    #[error("Failed to convert HTML to PDF: {message}")]
    Failed {
        message: String,
        index: Option<usize>,
    },
}

impl ConvertError {
    pub fn timeout(timeout_secs: u64, index: Option<usize>) -> Self {
        ConvertError::Timeout { timeout_secs, index }
    }

    /// Classify an engine error for a job, folding context-level timeouts
    /// into the timeout class.
    pub fn from_engine(err: EngineError, timeout_secs: u64, index: Option<usize>) -> Self {
        match err {
            EngineError::Unavailable(msg) => ConvertError::EngineUnavailable(msg),
            EngineError::Timeout(_) => ConvertError::Timeout { timeout_secs, index },
            EngineError::Render(msg) => ConvertError::Failed { message: msg, index },
        }
    }

    /// The job index this failure is attributed to, if any.
    pub fn index(&self) -> Option<usize> {
        match self {
            ConvertError::EngineUnavailable(_) => None,
            ConvertError::Timeout { index, .. } | ConvertError::Failed { index, .. } => *index,
        }
    }

    /// Short classification string used in batch failure descriptors.
    pub fn kind(&self) -> &'static str {
        match self {
            ConvertError::EngineUnavailable(_) => "unavailable",
            ConvertError::Timeout { .. } => "timeout",
            ConvertError::Failed { .. } => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_timeout_classifies_as_timeout() {
        let err = ConvertError::from_engine(
            EngineError::Timeout("navigation wait elapsed".to_string()),
            30,
            Some(4),
        );
        assert!(matches!(err, ConvertError::Timeout { timeout_secs: 30, index: Some(4) }));
        assert_eq!(err.kind(), "timeout");
    }

    #[test]
    fn test_render_error_classifies_as_failed() {
        let err = ConvertError::from_engine(
            EngineError::Render("bad content".to_string()),
            30,
            Some(1),
        );
        assert_eq!(err.kind(), "error");
        assert_eq!(err.index(), Some(1));
        assert!(err.to_string().contains("bad content"));
    }

    #[test]
    fn test_timeout_message_carries_configured_value() {
        let err = ConvertError::timeout(60, None);
        assert_eq!(err.to_string(), "Conversion timeout after 60s");
    }
}
