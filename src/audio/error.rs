use thiserror::Error;

/// Hard failures of the brightness transform. A run that hits one of these
/// produces no partial output.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalysisError {
    #[error("window of {window_ms}ms at {sample_rate}Hz is shorter than one sample")]
    InvalidWindowConfig { sample_rate: u32, window_ms: u32 },
    #[error("smoothing window must be odd and at least 1, got {0}")]
    InvalidSmoothingWindow(usize),
    #[error("no frames to analyze (empty sample buffer)")]
    EmptyProfile,
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
