//! Fetch errors.

use thiserror::Error;

/// Errors that can occur while fetching from the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Backend answered with a status outside 200-299.
    #[error("HTTP error! Status: {0}")]
    HttpStatus(u16),
    /// Host unreachable, connection dropped, or the body was not JSON.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Body was JSON but not the shape the endpoint promises.
    #[error("Unexpected response from {endpoint}: {message}")]
    Decode {
        endpoint: &'static str,
        message: String,
    },
}

impl FetchError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        FetchError::Transport(err.to_string())
    }

    /// Whether this failure happened below the HTTP status layer.
    pub fn is_transport(&self) -> bool {
        matches!(self, FetchError::Transport(_) | FetchError::Decode { .. })
    }

    /// The HTTP status code, if the backend returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpStatus(code) => Some(*code),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_display() {
        let err = FetchError::HttpStatus(500);
        assert_eq!(err.to_string(), "HTTP error! Status: 500");
        assert_eq!(err.status(), Some(500));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_decode_counts_as_transport() {
        let err = FetchError::Decode {
            endpoint: "sentiment",
            message: "expected a map".to_string(),
        };
        assert!(err.is_transport());
        assert_eq!(err.status(), None);
    }
}
