// Small helpers shared across modules

use reqwest::header::HeaderValue;

use crate::error::{ClientError, Result};

/// Shorten a token for log output
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(8).collect();
    if prefix.len() < token.len() {
        format!("{}...", prefix)
    } else {
        prefix
    }
}

/// `Authorization` header value for a bearer token
pub fn bearer_header(token: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(&format!("Bearer {}", token))
        .map_err(|e| ClientError::Internal(anyhow::anyhow!("Invalid access token header: {}", e)))
}
