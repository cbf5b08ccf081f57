// Error handling module
// Closed failure taxonomy for the request pipeline

use thiserror::Error;

/// Failures surfaced by the HTTP client to its callers.
///
/// A request either never produced a server response (`Timeout`,
/// `NetworkUnreachable`, `Transport`) or produced an error status
/// (`Http`). Credential storage failures never abort a request; the
/// `Storage` variant exists so the classifier stays total.
#[derive(Error, Debug)]
pub enum RequestError {
    /// The request exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// Connection to the server could not be established.
    #[error("network unreachable")]
    NetworkUnreachable,

    /// Any other transport-level failure (body, decode, malformed response).
    #[error("transport error: {0}")]
    Transport(String),

    /// The server responded with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Credential store read/write/delete failed.
    #[error("credential storage error: {0}")]
    Storage(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(RequestError::Timeout.to_string(), "request timed out");
        assert_eq!(
            RequestError::NetworkUnreachable.to_string(),
            "network unreachable"
        );

        let err = RequestError::Http {
            status: 429,
            body: "slow down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 429: slow down");
    }

    #[test]
    fn test_transport_error_message() {
        let err = RequestError::Transport("connection reset".to_string());
        assert_eq!(err.to_string(), "transport error: connection reset");
    }
}
