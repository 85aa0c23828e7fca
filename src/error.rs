use reqwest::StatusCode;
use thiserror::Error;

use crate::validation::ValidationError;

/// Everything that can go wrong talking to the zone API.
#[derive(Debug, Error)]
pub enum Error {
    /// Connection refused, TLS failure, timeout, truncated body, ...
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("NS1 API error (HTTP {status}): {message}")]
    Api { status: StatusCode, message: String },

    /// The response body was not the JSON we expected.
    #[error("deserialization error: {message}")]
    Deserialization { message: String, body: String },

    #[error("invalid zone name: {0}")]
    InvalidZoneName(#[from] ValidationError),

    /// The API key cannot be sent as a header value.
    #[error("API key is not a valid header value")]
    InvalidApiKey(#[source] reqwest::header::InvalidHeaderValue),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client")]
    Client(#[source] reqwest::Error),
}

impl Error {
    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_exposes_status() {
        let err = Error::Api {
            status: StatusCode::NOT_FOUND,
            message: "zone not found".into(),
        };

        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "NS1 API error (HTTP 404 Not Found): zone not found");
    }

    #[test]
    fn validation_error_has_no_status() {
        let err = Error::from(ValidationError::Empty);
        assert_eq!(err.status(), None);
        assert!(!err.is_not_found());
    }
}
