// Login, registration, logout and the startup routing decision

use reqwest::Method;
use std::sync::Arc;

use super::manager::SessionManager;
use super::types::{NewUser, Session, TokenPair};
use crate::api::FitnessApi;
use crate::error::{ClientError, Result};
use crate::http_client::{ApiClient, AuthPolicy};
use crate::navigation::Route;

/// User-facing authentication flows built on the session manager
pub struct AuthService {
    api: FitnessApi,
    login_path: String,
    register_path: String,
}

impl AuthService {
    pub fn new(client: Arc<ApiClient>, login_path: &str, register_path: &str) -> Self {
        Self {
            api: FitnessApi::new(client),
            login_path: login_path.to_string(),
            register_path: register_path.to_string(),
        }
    }

    fn session(&self) -> &SessionManager {
        self.api.client().session()
    }

    /// Log in with email and password
    ///
    /// A rejected login is returned as `AuthenticationFailed` and leaves the
    /// stored session untouched.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        tracing::info!(username, "Logging in");

        let client = self.api.client();
        let builder = client
            .request(Method::POST, &self.login_path)?
            .form(&[("username", username), ("password", password)]);
        let response = client.send(builder, AuthPolicy::LoginExempt).await?;
        let tokens: TokenPair = response.json().await.map_err(ClientError::from_transport)?;

        self.session().establish(tokens).await?;
        self.session().navigator().reset_to_route(Route::Home);
        Ok(())
    }

    /// Create an account; the backend answers with a fresh session
    pub async fn register(&self, user: &NewUser) -> Result<()> {
        tracing::info!(email = %user.email, "Registering account");

        let client = self.api.client();
        let builder = client.request(Method::POST, &self.register_path)?.json(user);
        let response = client.send(builder, AuthPolicy::Refreshable).await?;
        let tokens: TokenPair = response.json().await.map_err(ClientError::from_transport)?;

        self.session().establish(tokens).await?;
        self.session().navigator().reset_to_route(Route::Home);
        Ok(())
    }

    pub async fn logout(&self) -> Result<()> {
        self.session().terminate().await
    }

    /// Decide where the app opens and reset navigation there
    ///
    /// No token goes to `Login`. A token the backend keeps rejecting (even
    /// after a refresh attempt) is dropped and also goes to `Login`. Otherwise
    /// users that completed onboarding land on `Home`, the rest on
    /// `InitialForm`. A token check failing for any other reason falls
    /// through to the profile call; profile errors other than 401 are
    /// returned with navigation unchanged.
    pub async fn bootstrap(&self) -> Result<Route> {
        let session = self.session().session().await?;
        if !session.is_authenticated() {
            tracing::info!("No stored session");
            return Ok(self.go_to(Route::Login));
        }

        let user = match self.api.check_token().await {
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                // Only a 401 is conclusive; let the profile call decide
                tracing::warn!(error = %e, "Token check failed, loading profile anyway");
                self.api.me().await
            }
            Ok(()) => self.api.me().await,
        };

        match user {
            Ok(user) => {
                let route = if user.has_provided_info {
                    Route::Home
                } else {
                    Route::InitialForm
                };
                tracing::info!(user_id = user.id, route = %route, "Session restored");
                Ok(self.go_to(route))
            }
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(error = %e, "Stored session rejected");
                self.drop_rejected_session().await?;
                Ok(Route::Login)
            }
            Err(e) => Err(e),
        }
    }

    /// Clear a rejected session unless a failed refresh already tore it down
    async fn drop_rejected_session(&self) -> Result<()> {
        let store = self.session().store();
        if Session::load(store.as_ref()).await?.is_authenticated() {
            Session::purge(store.as_ref()).await?;
            self.go_to(Route::Login);
        }
        Ok(())
    }

    fn go_to(&self, route: Route) -> Route {
        self.session().navigator().reset_to_route(route);
        route
    }
}
