//! Error and result types for SVG inlining

use thiserror::Error;

/// Pipeline stage at which a resource failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    Extract,
    Fetch,
    Convert,
}

impl std::fmt::Display for FailureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureStage::Extract => write!(f, "extract"),
            FailureStage::Fetch => write!(f, "fetch"),
            FailureStage::Convert => write!(f, "convert"),
        }
    }
}

/// Typed failure while turning fetched SVG text into an inline element
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The fetched document contains no root `<svg>` element
    #[error("fetched document has no <svg> root element")]
    MissingSvgRoot,

    /// The gradient attribute names something that is not a plain element tag.
    /// The tag is interpolated into markup, so only ASCII-alphabetic names
    /// are accepted.
    #[error("gradient tag {0:?} is not a valid element name")]
    InvalidGradientTag(String),
}

/// Error information for a single failed element
#[derive(Debug, Clone)]
pub struct InliningError {
    pub url: String,
    pub stage: FailureStage,
    pub error: String,
}

/// Result of one inlining pass with success and failure tracking
#[derive(Debug, Clone)]
pub struct InliningResult {
    pub html: String,
    pub successes: usize,
    pub failures: Vec<InliningError>,
}

impl InliningResult {
    /// Total number of elements processed
    #[must_use]
    pub fn total(&self) -> usize {
        self.successes + self.failures.len()
    }

    /// Check if any failures occurred
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Get failure rate as a ratio between 0.0 and 1.0
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            self.failures.len() as f64 / total as f64
        }
    }
}
