// Error handling module
// Defines the error taxonomy surfaced by the session client

use thiserror::Error;

/// Errors that can occur while talking to the fitness backend
#[derive(Error, Debug)]
pub enum ClientError {
    /// Login endpoint rejected the credentials
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// A 401 that could not be recovered by refreshing the session
    #[error("Unauthorized: {status} - {message}")]
    Unauthorized { status: u16, message: String },

    /// The refresh-token exchange failed (rejected token, network error, timeout)
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// Non-success response from the backend, forwarded unchanged
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Transport-level failure (connect, timeout, decode)
    #[error("Transport error ({kind}): {message}")]
    Transport { kind: &'static str, message: String },

    /// Token store read/write failure
    #[error("Storage error: {0}")]
    Storage(String),


    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::AuthenticationFailed(_) => Some(401),
            ClientError::Unauthorized { status, .. } => Some(*status),
            ClientError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401s that survived the refresh cycle
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ClientError::Unauthorized { .. })
    }

    /// Categorize a reqwest error the same way for requests and refresh calls
    pub fn from_transport(e: reqwest::Error) -> Self {
        let kind = if e.is_timeout() {
            "timeout"
        } else if e.is_connect() {
            "connection_failed"
        } else if e.is_request() {
            "request_error"
        } else if e.is_body() {
            "body_error"
        } else if e.is_decode() {
            "decode_error"
        } else {
            "unknown"
        };

        ClientError::Transport {
            kind,
            message: e.to_string(),
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::AuthenticationFailed("Incorrect email or password".to_string());
        assert_eq!(
            err.to_string(),
            "Authentication failed: Incorrect email or password"
        );

        let err = ClientError::Unauthorized {
            status: 401,
            message: "Token is invalid or expired".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unauthorized: 401 - Token is invalid or expired"
        );

        let err = ClientError::Api {
            status: 404,
            message: "Not found".to_string(),
        };
        assert_eq!(err.to_string(), "API error: 404 - Not found");
    }

    #[test]
    fn test_transport_error_message() {
        let err = ClientError::Transport {
            kind: "timeout",
            message: "operation timed out".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Transport error (timeout): operation timed out"
        );
    }

    #[test]
    fn test_internal_error_message() {
        let err = ClientError::Internal(anyhow::anyhow!("Something went wrong"));
        assert_eq!(err.to_string(), "Internal error: Something went wrong");
    }

    #[test]
    fn test_status() {
        assert_eq!(
            ClientError::AuthenticationFailed(String::new()).status(),
            Some(401)
        );
        assert_eq!(
            ClientError::Api {
                status: 503,
                message: String::new()
            }
            .status(),
            Some(503)
        );
        assert_eq!(ClientError::RefreshFailed("x".to_string()).status(), None);
        assert_eq!(ClientError::Storage("x".to_string()).status(), None);
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ClientError::Unauthorized {
            status: 401,
            message: String::new(),
        };
        assert!(err.is_unauthorized());
        assert!(!ClientError::AuthenticationFailed(String::new()).is_unauthorized());
    }
}
