//! Error types for Rewind

use std::io;
use thiserror::Error;

use crate::cassette::RecordMode;

/// Result type for Rewind operations
pub type Result<T> = std::result::Result<T, RewindError>;

/// Errors that can occur in Rewind
#[derive(Debug, Error)]
pub enum RewindError {
    /// Fault raised by the underlying real transport; passed through unmodified
    #[error("transport error: {0}")]
    Transport(#[from] io::Error),

    /// No recording matches and the cassette disallows new recordings
    #[error(
        "no match for the request ({request}) was found; \
         can't overwrite existing cassette ({cassette}) in record mode {record_mode}"
    )]
    CannotRecord {
        /// The request that could not be satisfied or recorded
        request: String,
        /// Cassette identity (path), for diagnostics only
        cassette: String,
        /// The record mode that disallowed recording
        record_mode: RecordMode,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cannot_record_message_names_all_parts() {
        let err = RewindError::CannotRecord {
            request: "GET http://api.test/widgets".to_string(),
            cassette: "fixtures/widgets.yaml".to_string(),
            record_mode: RecordMode::Once,
        };

        let message = err.to_string();
        assert!(message.contains("GET http://api.test/widgets"));
        assert!(message.contains("fixtures/widgets.yaml"));
        assert!(message.contains("once"));
    }

    #[test]
    fn test_transport_error_passes_through() {
        let inner = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
        let err = RewindError::from(inner);

        assert!(matches!(err, RewindError::Transport(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
