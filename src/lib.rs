// Fitness Session - library root

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod http_client;
pub mod models;
pub mod navigation;
pub mod store;
pub mod utils;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use api::FitnessApi;
pub use auth::{AuthService, SessionManager};
pub use error::{ClientError, Result};
pub use http_client::{ApiClient, AuthPolicy};
pub use navigation::{NavigationState, Navigator, Route};
