// Token persistence
// Opaque key-value capability used to keep the session between requests and runs

mod memory;
mod sqlite;

pub use memory::MemoryTokenStore;
pub use sqlite::SqliteTokenStore;

use async_trait::async_trait;

use crate::error::Result;

/// Storage key for the bearer access token
pub const ACCESS_TOKEN_KEY: &str = "accessToken";

/// Storage key for the refresh token
pub const REFRESH_TOKEN_KEY: &str = "refreshToken";

/// Key-value persistence for session credentials
///
/// Implementations only need "last write visible to next read" semantics.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn remove(&self, key: &str) -> Result<()>;

    /// Remove every key (used on logout)
    async fn clear(&self) -> Result<()>;
}
