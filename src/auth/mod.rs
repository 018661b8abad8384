// Authentication module
// Session lifecycle: token persistence, single-flight refresh, login/logout flows

mod manager;
mod refresh;
mod service;
mod types;

pub use manager::{RefreshOutcome, RefreshPhase, SessionManager};
pub use refresh::{HttpRefreshExchange, RefreshExchange};
pub use service::AuthService;
pub use types::{NewUser, RefreshRequest, Session, TokenPair};
