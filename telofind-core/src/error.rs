//! Error type shared by the telofind core library

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while scanning sequences or handling their results
#[derive(Debug, Error)]
pub enum TelofindError {
    #[error("The window size must be smaller than the sequence (window {size}, sequence {len})")]
    WindowTooLarge { size: usize, len: usize },

    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No sequences found in {}", .0.display())]
    EmptyInput(PathBuf),

    #[error("Output already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("BAM error: {0}")]
    Bam(String),
}

pub type Result<T> = std::result::Result<T, TelofindError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_too_large_message() {
        let err = TelofindError::WindowTooLarge { size: 20, len: 5 };
        assert_eq!(
            err.to_string(),
            "The window size must be smaller than the sequence (window 20, sequence 5)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: TelofindError = io_err.into();
        assert!(matches!(err, TelofindError::Io(_)));
    }
}
