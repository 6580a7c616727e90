//! Common error types for shotform

use thiserror::Error;

/// Common result type for shotform operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the shotform workspace
///
/// Only the `NoFrames` and `NoUsableLandmarks` variants represent a failed
/// analysis run. Degraded visibility, insufficient evidence, and an
/// unresolvable shot start are all resolved locally by the component that
/// detects them and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid caller input (bad fps, out-of-range threshold, malformed frame)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No frames were supplied for analysis
    #[error("No frames available for analysis")]
    NoFrames,

    /// Pose extraction produced no usable landmarks for the entire clip
    #[error("No usable landmarks in any frame")]
    NoUsableLandmarks,

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal pipeline error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error means the whole analysis run failed and no report
    /// may be rendered from it. Callers must never conflate this with an
    /// empty flaw list, which is a valid result.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(self, Error::NoFrames | Error::NoUsableLandmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_failure_classification() {
        assert!(Error::NoFrames.is_pipeline_failure());
        assert!(Error::NoUsableLandmarks.is_pipeline_failure());
        assert!(!Error::Config("bad".to_string()).is_pipeline_failure());
        assert!(!Error::InvalidInput("bad fps".to_string()).is_pipeline_failure());
    }
}
