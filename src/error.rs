//! Central error types for SnapBooth.
//!
//! Every failure in the core is scoped to the current session or operation.
//! All errors implement `Serialize` so presentation layers receive a plain message.

use serde::Serialize;
use thiserror::Error;

use crate::camera::ConstraintTier;

/// Main error type for SnapBooth operations.
#[derive(Error, Debug)]
pub enum BoothError {
    /// Every fallback tier was rejected by the host.
    #[error("Camera negotiation exhausted after {} tier(s): {last_error}", attempted.len())]
    NegotiationExhausted {
        attempted: Vec<ConstraintTier>,
        last_error: String,
    },

    /// A stop was requested while negotiation was still in flight.
    #[error("Camera negotiation cancelled by stop request")]
    NegotiationCancelled,

    /// The live track ended without a successful automatic recovery.
    #[error("Camera session lost: {reason}")]
    SessionLost { reason: String },

    /// The render sink could not begin playback of a bound stream.
    #[error("Playback failed: {0}")]
    PlaybackFailed(String),

    /// Chroma-key processing could not decode or process a still.
    #[error("Compositing failed: {0}")]
    CompositingFailed(String),

    /// Device enumeration failed (non-fatal, callers see an empty list).
    #[error("Device enumeration failed: {0}")]
    EnumerationFailed(String),

    /// No live stream or no frame available for capture.
    #[error("Camera not ready")]
    CameraNotReady,

    /// Template not found by ID
    #[error("Template not found with ID {id}")]
    TemplateNotFound { id: String },

    /// Frame not found by ID in the active template
    #[error("Frame not found with ID {id}")]
    FrameNotFound { id: String },

    /// Operation needs an active template but none is selected
    #[error("No active template")]
    NoActiveTemplate,

    /// Configuration could not be loaded or is invalid
    #[error("Config error: {0}")]
    ConfigError(String),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// File operation failed
    #[error("Storage error: {0}")]
    StorageError(#[from] std::io::Error),

    /// Image processing error
    #[error("Image error: {0}")]
    ImageError(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl BoothError {
    /// Whether the failure ended the camera session (as opposed to one operation).
    pub fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            BoothError::NegotiationExhausted { .. }
                | BoothError::NegotiationCancelled
                | BoothError::SessionLost { .. }
        )
    }
}

/// Serialize as the error message string.
impl Serialize for BoothError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl From<image::ImageError> for BoothError {
    fn from(err: image::ImageError) -> Self {
        BoothError::ImageError(err.to_string())
    }
}

impl From<String> for BoothError {
    fn from(msg: String) -> Self {
        BoothError::Other(msg)
    }
}

impl From<&str> for BoothError {
    fn from(msg: &str) -> Self {
        BoothError::Other(msg.to_string())
    }
}

/// Extension trait for adding context to Results.
///
/// Similar to anyhow's `Context` trait, this allows chaining context
/// information onto errors for better debugging.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to BoothError::Other.
    fn context(self, msg: &str) -> BoothResult<T>;

    /// Add context lazily (only evaluated on error).
    fn with_context<F: FnOnce() -> String>(self, f: F) -> BoothResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> BoothResult<T> {
        self.map_err(|e| BoothError::Other(format!("{}: {}", msg, e)))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> BoothResult<T> {
        self.map_err(|e| BoothError::Other(format!("{}: {}", f(), e)))
    }
}

/// Type alias for Results using BoothError.
pub type BoothResult<T> = Result<T, BoothError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BoothError::PlaybackFailed("autoplay blocked".to_string());
        assert_eq!(err.to_string(), "Playback failed: autoplay blocked");
    }

    #[test]
    fn test_negotiation_exhausted_lists_tier_count() {
        let err = BoothError::NegotiationExhausted {
            attempted: vec![ConstraintTier::HighAnyDevice, ConstraintTier::LowAnyDevice],
            last_error: "NotReadableError".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("2 tier(s)"));
        assert!(msg.contains("NotReadableError"));
    }

    #[test]
    fn test_error_serialization() {
        let err = BoothError::CameraNotReady;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"Camera not ready\"");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: BoothError = io_err.into();
        assert!(matches!(err, BoothError::StorageError(_)));
    }

    #[test]
    fn test_from_string() {
        let err: BoothError = "test error".into();
        assert!(matches!(err, BoothError::Other(_)));
    }

    #[test]
    fn test_session_fatal_classification() {
        assert!(BoothError::SessionLost {
            reason: "track ended".to_string()
        }
        .is_session_fatal());
        assert!(BoothError::NegotiationCancelled.is_session_fatal());
        assert!(!BoothError::PlaybackFailed("x".to_string()).is_session_fatal());
        assert!(!BoothError::CompositingFailed("x".to_string()).is_session_fatal());
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let msg = result.context("operation failed").unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_result_ext_with_context() {
        let result: Result<(), &str> = Err("inner");
        let msg = result
            .with_context(|| format!("ctx-{}", 42))
            .unwrap_err()
            .to_string();
        assert!(msg.contains("ctx-42"));
        assert!(msg.contains("inner"));
    }
}
