// Typed REST API over the session-aware request pipeline

mod activity;
mod nutrition;
mod users;

use reqwest::{Method, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ClientError, Result};
use crate::http_client::{ApiClient, AuthPolicy};

/// Fitness backend endpoints
///
/// Every call goes through [`ApiClient`], so an expired access token is
/// refreshed transparently.
#[derive(Clone)]
pub struct FitnessApi {
    client: Arc<ApiClient>,
}

impl FitnessApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let builder = self.client.request(Method::GET, path)?.query(query);
        let response = self.client.send(builder, AuthPolicy::Refreshable).await?;
        decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let builder = self.client.request(method, path)?.json(body);
        let response = self.client.send(builder, AuthPolicy::Refreshable).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<()> {
        let builder = self.client.request(Method::DELETE, path)?;
        self.client.send(builder, AuthPolicy::Refreshable).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    response.json::<T>().await.map_err(ClientError::from_transport)
}
