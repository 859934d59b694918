//! Error types for backend API operations.

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// API error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Business failure reported by the server with its own message.
    #[error("{message}")]
    Server {
        /// HTTP status code of the response.
        status: u16,
        /// Message provided by the server.
        message: String,
    },

    /// Non-success status without a server-provided message.
    #[error("Request failed with status {0}")]
    Status(u16),

    /// The request did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Creates a server error from a status code and message.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server {
            status,
            message: message.into(),
        }
    }

    /// Returns true for failures of the network layer rather than the server.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Timeout | Self::Json(_))
    }

    /// Returns the HTTP status code, if the server answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Status(status) => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_error_is_verbatim() {
        let err = Error::server(404, "Message not found");
        assert_eq!(err.to_string(), "Message not found");
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_status_error_is_generic() {
        let err = Error::Status(502);
        assert_eq!(err.to_string(), "Request failed with status 502");
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn test_timeout_is_transport() {
        assert!(Error::Timeout.is_transport());
        assert_eq!(Error::Timeout.status(), None);
    }
}
