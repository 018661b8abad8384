// Token refresh exchange

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::types::{RefreshRequest, TokenPair};
use crate::error::{ClientError, Result};

/// Trades a refresh token for a new access token
#[async_trait]
pub trait RefreshExchange: Send + Sync {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair>;
}

/// Refresh exchange against the backend's refresh endpoint
///
/// Shares the pipeline's `reqwest::Client`, so the exchange runs under the
/// same connect/request timeouts as every other call.
pub struct HttpRefreshExchange {
    client: Client,
    url: Url,
}

impl HttpRefreshExchange {
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[async_trait]
impl RefreshExchange for HttpRefreshExchange {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair> {
        tracing::info!(url = %self.url, "Exchanging refresh token...");

        let response = self
            .client
            .post(self.url.clone())
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| {
                let err = ClientError::from_transport(e);
                ClientError::RefreshFailed(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                body = %error_text,
                "Refresh exchange rejected"
            );
            return Err(ClientError::RefreshFailed(format!(
                "{} - {}",
                status, error_text
            )));
        }

        let data: TokenPair = response.json().await.map_err(|e| {
            ClientError::RefreshFailed(format!("Failed to parse refresh response: {}", e))
        })?;

        if data.access_token.is_empty() {
            return Err(ClientError::RefreshFailed(
                "Refresh response does not contain accessToken".to_string(),
            ));
        }

        tracing::info!(
            rotated_refresh_token = data.refresh_token.is_some(),
            "Access token refreshed"
        );

        Ok(data)
    }
}
