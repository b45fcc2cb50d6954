use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// A specialized `Result` type for screen matching operations.
pub type VisionResult<T> = Result<T, VisionError>;

/// The error type for geometry, pattern loading, capture and wait operations.
///
/// Reasons from lower layers are kept as strings so the error stays `Clone`;
/// the image cache hands the same failure to every waiter of a decode.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum VisionError {
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Pattern image not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("Failed to decode {format} image {path:?}: {reason}")]
    DecodeError {
        path: Option<PathBuf>,
        format: &'static str,
        reason: String,
    },

    #[error("Unsupported image format for {path:?} (no known file signature)")]
    UnsupportedFormat { path: Option<PathBuf> },

    #[error("I/O error on {path:?}: {reason}")]
    Io { path: PathBuf, reason: String },

    #[error("Screen capture unavailable after {attempts} attempt(s): {reason}")]
    CaptureUnavailable { attempts: u32, reason: String },

    #[error("Pattern '{pattern}' not found within {elapsed:?} ({attempts} attempts)")]
    MatchTimeout {
        pattern: String,
        elapsed: Duration,
        attempts: u32,
    },

    #[error("Wait for pattern '{pattern}' cancelled after {elapsed:?}")]
    Cancelled { pattern: String, elapsed: Duration },

    #[error("Background task failed to complete: {reason}")]
    TaskFailed { reason: String },
}

impl VisionError {
    pub fn invalid_geometry(reason: impl Into<String>) -> Self {
        VisionError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    pub fn capture_unavailable(reason: impl Into<String>) -> Self {
        VisionError::CaptureUnavailable {
            attempts: 1,
            reason: reason.into(),
        }
    }

    /// Timeouts and cancellations are normal outcomes of an automation flow.
    pub fn is_expected(&self) -> bool {
        matches!(
            self,
            VisionError::MatchTimeout { .. } | VisionError::Cancelled { .. }
        )
    }

    /// Check if the error is a display-surface failure worth retrying
    pub fn is_transient(&self) -> bool {
        matches!(self, VisionError::CaptureUnavailable { .. })
    }

    /// Re-tag a capture failure with the number of attempts spent on it
    pub fn with_attempts(self, attempts: u32) -> Self {
        match self {
            VisionError::CaptureUnavailable { reason, .. } => {
                VisionError::CaptureUnavailable { attempts, reason }
            }
            other => other,
        }
    }
}

impl From<tokio::task::JoinError> for VisionError {
    fn from(source: tokio::task::JoinError) -> Self {
        VisionError::TaskFailed {
            reason: source.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_outcomes() {
        let timeout = VisionError::MatchTimeout {
            pattern: "ok_button".to_string(),
            elapsed: Duration::from_secs(3),
            attempts: 12,
        };
        let cancelled = VisionError::Cancelled {
            pattern: "ok_button".to_string(),
            elapsed: Duration::from_millis(200),
        };
        assert!(timeout.is_expected());
        assert!(cancelled.is_expected());
        assert!(!VisionError::capture_unavailable("locked").is_expected());
    }

    #[test]
    fn test_with_attempts_only_touches_capture_errors() {
        let err = VisionError::capture_unavailable("session locked").with_attempts(3);
        assert_eq!(
            err,
            VisionError::CaptureUnavailable {
                attempts: 3,
                reason: "session locked".to_string()
            }
        );
        assert!(err.to_string().contains("3 attempt(s)"));

        let geometry = VisionError::invalid_geometry("negative width").with_attempts(3);
        assert!(matches!(geometry, VisionError::InvalidGeometry { .. }));
        assert!(!geometry.is_transient());
    }
}
