use anyhow::Context;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Method, Request, RequestBuilder, Response, StatusCode, Url};
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{HttpRefreshExchange, RefreshOutcome, SessionManager};
use crate::config::{join_url, Config};
use crate::error::{ClientError, Result};
use crate::navigation::Navigator;
use crate::store::TokenStore;
use crate::utils::bearer_header;

/// How a 401 on a request is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Expired access token: recover through the refresh cycle
    Refreshable,
    /// Login endpoint: a 401 means wrong credentials
    LoginExempt,
}

/// Request pipeline for the fitness backend
///
/// Attaches the stored bearer token to every call and routes 401s through
/// the session manager. Every other status is handed back unchanged.
pub struct ApiClient {
    /// Shared HTTP client with connection pooling
    client: Client,

    /// Backend base URL
    base_url: String,

    /// Session & token refresh manager
    session: SessionManager,
}

impl ApiClient {
    /// Create the pipeline, its refresh exchange and session manager from config
    pub fn new(
        config: &Config,
        store: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> anyhow::Result<Self> {
        let client = build_http_client(config.http_connect_timeout, config.http_request_timeout)?;
        let exchange = Arc::new(HttpRefreshExchange::new(
            client.clone(),
            config.endpoint_url(&config.refresh_path)?,
        ));
        let session = SessionManager::new(store, exchange, navigator);

        Ok(Self::with_session(client, &config.base_url, session))
    }

    /// Create the pipeline around an existing session manager
    pub fn with_session(client: Client, base_url: &str, session: SessionManager) -> Self {
        Self {
            client,
            base_url: base_url.to_string(),
            session,
        }
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Absolute URL for a backend path
    pub fn url(&self, path: &str) -> Result<Url> {
        join_url(&self.base_url, path).map_err(ClientError::Internal)
    }

    /// Start building a request against a backend path
    pub fn request(&self, method: Method, path: &str) -> Result<RequestBuilder> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Build and execute a request
    pub async fn send(&self, builder: RequestBuilder, policy: AuthPolicy) -> Result<Response> {
        let request = builder.build().map_err(ClientError::from_transport)?;
        self.execute(request, policy).await
    }

    /// Execute a request, replaying it at most once after a token refresh
    pub async fn execute(&self, request: Request, policy: AuthPolicy) -> Result<Response> {
        let method = request.method().clone();
        let url = request.url().clone();
        tracing::debug!(
            method = %method,
            url = %url,
            policy = ?policy,
            "Sending HTTP request"
        );

        let mut token = self.session.access_token().await?;
        let mut retried = false;

        loop {
            // Clone the request for this attempt
            let mut req = request.try_clone().ok_or_else(|| {
                ClientError::Internal(anyhow::anyhow!("Request body is not cloneable"))
            })?;
            if let Some(ref t) = token {
                req.headers_mut().insert(AUTHORIZATION, bearer_header(t)?);
            }

            let response = match self.client.execute(req).await {
                Ok(response) => response,
                Err(e) => {
                    let err = ClientError::from_transport(e);
                    tracing::warn!(
                        method = %method,
                        url = %url,
                        error = %err,
                        "HTTP request error"
                    );
                    return Err(err);
                }
            };

            let status = response.status();
            tracing::debug!(status = %status, retried, "Received HTTP response");

            if status.is_success() {
                return Ok(response);
            }

            let message = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                match policy {
                    AuthPolicy::LoginExempt => {
                        tracing::info!(url = %url, "Credentials rejected by login endpoint");
                        return Err(ClientError::AuthenticationFailed(message));
                    }
                    AuthPolicy::Refreshable if !retried => {
                        match self.session.recover_unauthorized(token.as_deref()).await {
                            RefreshOutcome::Refreshed(new_token) => {
                                tracing::debug!(url = %url, "Replaying request with refreshed token");
                                token = Some(new_token);
                                retried = true;
                                continue;
                            }
                            RefreshOutcome::Failed => {
                                tracing::warn!(url = %url, "Session could not be refreshed");
                            }
                        }
                    }
                    AuthPolicy::Refreshable => {
                        tracing::warn!(url = %url, "Replayed request rejected again, giving up");
                    }
                }

                return Err(ClientError::Unauthorized {
                    status: status.as_u16(),
                    message,
                });
            }

            tracing::warn!(
                status = status.as_u16(),
                method = %method,
                url = %url,
                response_body = %message,
                "HTTP request failed with error response"
            );
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }
    }
}

/// Shared reqwest client; the refresh exchange uses the same timeouts
pub fn build_http_client(connect_timeout: u64, request_timeout: u64) -> anyhow::Result<Client> {
    Client::builder()
        .connect_timeout(Duration::from_secs(connect_timeout))
        .timeout(Duration::from_secs(request_timeout))
        .build()
        .context("Failed to create HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::{NavigationState, Route};
    use crate::store::{MemoryTokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
    use crate::testing::ScriptedExchange;
    use mockito::Matcher;

    struct Harness {
        api: ApiClient,
        store: Arc<MemoryTokenStore>,
        exchange: Arc<ScriptedExchange>,
        nav: Arc<NavigationState>,
    }

    fn harness(server: &mockito::ServerGuard, exchange: ScriptedExchange, entries: &[(&str, &str)]) -> Harness {
        let store = Arc::new(MemoryTokenStore::with_entries(entries.iter().copied()));
        let exchange = Arc::new(exchange);
        let nav = Arc::new(NavigationState::new());
        let session = SessionManager::new(store.clone(), exchange.clone(), nav.clone());
        let api = ApiClient::with_session(Client::new(), &server.url(), session);
        Harness {
            api,
            store,
            exchange,
            nav,
        }
    }

    const LOGGED_IN: &[(&str, &str)] = &[(ACCESS_TOKEN_KEY, "T1"), (REFRESH_TOKEN_KEY, "R1")];

    async fn get(h: &Harness, path: &str) -> Result<Response> {
        let builder = h.api.request(Method::GET, path).unwrap();
        h.api.send(builder, AuthPolicy::Refreshable).await
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer T1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&[]), LOGGED_IN);
        let response = get(&h, "/users/me").await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_no_header_without_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/foods/")
            .match_header("authorization", Matcher::Missing)
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&[]), &[]);
        get(&h, "/foods/").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_status_forwarded() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/meals/42")
            .with_status(404)
            .with_body("Not found")
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&[]), LOGGED_IN);
        let err = get(&h, "/meals/42").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 404, ref message } if message == "Not found"));
        assert_eq!(h.exchange.calls(), 0);
    }

    #[tokio::test]
    async fn test_401_refreshes_and_replays_once() {
        let mut server = mockito::Server::new_async().await;
        let rejected = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer T1")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let replayed = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer T2")
            .with_status(200)
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&["T2"]), LOGGED_IN);
        let response = get(&h, "/users/me").await.unwrap();
        assert_eq!(response.text().await.unwrap(), r#"{"ok":true}"#);

        rejected.assert_async().await;
        replayed.assert_async().await;
        assert_eq!(h.exchange.calls(), 1);
        assert!(h.nav.resets().is_empty());
    }

    #[tokio::test]
    async fn test_replayed_401_is_not_retried_again() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer T1")
            .with_status(401)
            .expect(1)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/users/me")
            .match_header("authorization", "Bearer T2")
            .with_status(401)
            .with_body("still expired")
            .expect(1)
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&["T2", "T3"]), LOGGED_IN);
        let err = get(&h, "/users/me").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { status: 401, ref message } if message == "still expired"));

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(h.exchange.calls(), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_surfaces_original_401() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me")
            .with_status(401)
            .with_body("Token is invalid or expired")
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::failing("403 Forbidden"), LOGGED_IN);
        let err = get(&h, "/users/me").await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Unauthorized { status: 401, ref message } if message == "Token is invalid or expired"
        ));

        assert_eq!(h.store.get(ACCESS_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(h.store.get(REFRESH_TOKEN_KEY).await.unwrap(), None);
        assert_eq!(h.nav.resets(), vec![Route::Login]);
    }

    #[tokio::test]
    async fn test_login_exempt_401_skips_refresh() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/users/login")
            .with_status(401)
            .with_body("Incorrect email or password")
            .create_async()
            .await;

        let h = harness(&server, ScriptedExchange::succeeding(&["T2"]), LOGGED_IN);
        let builder = h.api.request(Method::POST, "/users/login").unwrap();
        let err = h.api.send(builder, AuthPolicy::LoginExempt).await.unwrap_err();

        assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Incorrect email or password"));
        assert_eq!(h.exchange.calls(), 0);
        assert_eq!(
            h.store.get(ACCESS_TOKEN_KEY).await.unwrap().as_deref(),
            Some("T1")
        );
        assert!(h.nav.resets().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error() {
        let store = Arc::new(MemoryTokenStore::new());
        let session = SessionManager::new(
            store,
            Arc::new(ScriptedExchange::succeeding(&[])),
            Arc::new(NavigationState::new()),
        );
        let api = ApiClient::with_session(Client::new(), "http://127.0.0.1:9", session);

        let builder = api.request(Method::GET, "/users/me").unwrap();
        let err = api.send(builder, AuthPolicy::Refreshable).await.unwrap_err();
        assert!(matches!(err, ClientError::Transport { .. }));
    }

    #[test]
    fn test_url_joins_base_prefix() {
        let session = SessionManager::new(
            Arc::new(MemoryTokenStore::new()),
            Arc::new(ScriptedExchange::succeeding(&[])),
            Arc::new(NavigationState::new()),
        );
        let api = ApiClient::with_session(Client::new(), "http://localhost:8000/api/", session);
        assert_eq!(
            api.url("/foods/").unwrap().as_str(),
            "http://localhost:8000/api/foods/"
        );
    }

    #[test]
    fn test_build_http_client() {
        assert!(build_http_client(10, 30).is_ok());
    }
}
