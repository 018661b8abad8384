use reqwest::Method;

use super::FitnessApi;
use crate::error::Result;
use crate::models::{Physiology, ProfileUpdate, User};

impl FitnessApi {
    /// Profile of the logged-in user
    pub async fn me(&self) -> Result<User> {
        self.get_json("/users/me", &[]).await
    }

    /// Succeeds while the stored access token is (or can be made) valid
    pub async fn check_token(&self) -> Result<()> {
        let _: serde_json::Value = self.get_json("/users/check-token", &[]).await?;
        Ok(())
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User> {
        self.send_json(Method::PUT, "/users/", update).await
    }

    /// Submit the onboarding form
    pub async fn submit_physiology(&self, physiology: &Physiology) -> Result<User> {
        tracing::info!(goal = ?physiology.goal_type, "Submitting onboarding data");
        self.send_json(Method::PUT, "/users/me", physiology).await
    }
}
