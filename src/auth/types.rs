// Authentication types

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};

/// Persisted session credentials
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Session {
    /// Read both tokens from the store
    pub async fn load(store: &dyn TokenStore) -> Result<Self> {
        Ok(Self {
            access_token: store.get(ACCESS_TOKEN_KEY).await?,
            refresh_token: store.get(REFRESH_TOKEN_KEY).await?,
        })
    }

    /// Write the tokens that are present; absent tokens are removed
    pub async fn save(&self, store: &dyn TokenStore) -> Result<()> {
        match &self.access_token {
            Some(token) => store.set(ACCESS_TOKEN_KEY, token).await?,
            None => store.remove(ACCESS_TOKEN_KEY).await?,
        }
        match &self.refresh_token {
            Some(token) => store.set(REFRESH_TOKEN_KEY, token).await?,
            None => store.remove(REFRESH_TOKEN_KEY).await?,
        }
        Ok(())
    }

    /// Remove both tokens, leaving unrelated keys untouched
    pub async fn purge(store: &dyn TokenStore) -> Result<()> {
        store.remove(ACCESS_TOKEN_KEY).await?;
        store.remove(REFRESH_TOKEN_KEY).await
    }

    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

impl From<TokenPair> for Session {
    fn from(pair: TokenPair) -> Self {
        Self {
            access_token: Some(pair.access_token),
            refresh_token: pair.refresh_token,
        }
    }
}

/// Token data from login, registration and refresh responses
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    #[serde(alias = "access_token")]
    pub access_token: String,
    #[serde(default, alias = "refresh_token")]
    pub refresh_token: Option<String>,
}

/// Refresh exchange request body
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Registration request body
#[derive(Debug, Clone, Serialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}
