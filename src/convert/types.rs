//! Conversion job and outcome types

use serde::Serialize;

/// One HTML document queued for conversion.
///
/// Created per request, consumed by exactly one conversion. `index` is the
/// position within a batch; single conversions carry `None`.
#[derive(Debug, Clone)]
pub struct RenderJob {
    pub html: String,
    pub index: Option<usize>,
}

impl RenderJob {
    pub fn single(html: String) -> Self {
        Self { html, index: None }
    }

    pub fn batched(html: String, index: usize) -> Self {
        Self { html, index: Some(index) }
    }
}

/// Per-item failure descriptor surfaced in batch responses.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionFailure {
    pub index: usize,
    pub message: String,
    pub kind: String,
}

/// Aggregate result of a batch conversion.
///
/// Successes and failures are both ordered by original job index, and
/// `successes.len() + failures.len() == total` always holds.
#[derive(Debug)]
pub struct BatchOutcome {
    pub total: usize,
    pub successes: Vec<(usize, Vec<u8>)>,
    pub failures: Vec<ConversionFailure>,
}

impl BatchOutcome {
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Zero successes: reported to the caller as a whole-batch failure
    /// rather than a partial one.
    pub fn is_total_failure(&self) -> bool {
        self.successes.is_empty()
    }
}
