/// Error taxonomy for an analysis round trip

use thiserror::Error;

use crate::settings::SettingsError;

/// No usable text in the open message. Never reaches the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionError {
    #[error("Could not find the email body.")]
    BodyNotFound,
    #[error("Could not extract email text.")]
    EmptyText,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Network(String),
}

/// Failures on the content script side of the message bus
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    #[error("{0}")]
    Disconnected(String),
    #[error("No response from background")]
    NoResponse,
    #[error("Failed to encode message: {0}")]
    Encode(String),
    #[error("Failed to decode reply: {0}")]
    Decode(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Dom(#[from] DomError),
    /// Non-2xx reply; carries the backend's `detail` when present
    #[error("{0}")]
    Backend(String),
    #[error("Malformed response: {0}")]
    Protocol(String),
    /// Error string relayed verbatim over the message bus
    #[error("{0}")]
    Relayed(String),
    #[error("Request timed out")]
    Timeout,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("DOM operation failed: {0}")]
pub struct DomError(pub String);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_detail_is_displayed_verbatim() {
        let err = AnalysisError::Backend("model unavailable".to_string());
        assert_eq!(err.to_string(), "model unavailable");
    }

    #[test]
    fn test_transport_message_passes_through() {
        let err: AnalysisError = TransportError::Network("connection refused".to_string()).into();
        assert_eq!(err.to_string(), "connection refused");
    }

    #[test]
    fn test_extraction_message() {
        let err: AnalysisError = ExtractionError::EmptyText.into();
        assert_eq!(err.to_string(), "Could not extract email text.");
    }
}
