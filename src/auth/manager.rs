use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::oneshot;
use uuid::Uuid;

use super::refresh::RefreshExchange;
use super::types::{Session, TokenPair};
use crate::error::{ClientError, Result};
use crate::navigation::{Navigator, Route};
use crate::store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use crate::utils::redact_token;

/// Result of a refresh cycle, broadcast to every waiter of that cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Replay the request once with this access token
    Refreshed(String),
    /// Session was torn down; the caller surfaces its original 401
    Failed,
}

/// Observable phase of the refresh state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshPhase {
    Idle,
    Refreshing,
}

enum RefreshState {
    Idle,
    Refreshing {
        cycle: u64,
        waiters: VecDeque<Waiter>,
    },
}

/// A request suspended until the in-flight refresh settles
struct Waiter {
    id: Uuid,
    tx: oneshot::Sender<RefreshOutcome>,
}

struct StateCell {
    state: RefreshState,
    cycles: u64,
}

/// Session & token refresh manager
///
/// Owns the "refresh in progress" flag and the waiter queue. The first 401
/// observed while idle starts exactly one refresh exchange; every 401 that
/// arrives while it is in flight queues behind it and receives the same
/// outcome. Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    store: Arc<dyn TokenStore>,
    exchange: Arc<dyn RefreshExchange>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<StateCell>,
}

impl SessionManager {
    pub fn new(
        store: Arc<dyn TokenStore>,
        exchange: Arc<dyn RefreshExchange>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                store,
                exchange,
                navigator,
                state: Mutex::new(StateCell {
                    state: RefreshState::Idle,
                    cycles: 0,
                }),
            }),
        }
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.inner.store
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.inner.navigator
    }

    /// Current access token, if a session exists
    pub async fn access_token(&self) -> Result<Option<String>> {
        self.inner.store.get(ACCESS_TOKEN_KEY).await
    }

    pub async fn session(&self) -> Result<Session> {
        Session::load(self.inner.store.as_ref()).await
    }

    /// Persist the tokens returned by login or registration
    pub async fn establish(&self, tokens: TokenPair) -> Result<()> {
        tracing::info!(
            token = %redact_token(&tokens.access_token),
            has_refresh_token = tokens.refresh_token.is_some(),
            "Session established"
        );
        Session::from(tokens).save(self.inner.store.as_ref()).await
    }

    /// Explicit logout: wipe the store and return to the login screen
    pub async fn terminate(&self) -> Result<()> {
        tracing::info!("Terminating session");
        self.inner.store.clear().await?;
        self.inner.navigator.reset_to_route(Route::Login);
        Ok(())
    }

    pub fn phase(&self) -> RefreshPhase {
        match self.inner.lock().state {
            RefreshState::Idle => RefreshPhase::Idle,
            RefreshState::Refreshing { .. } => RefreshPhase::Refreshing,
        }
    }

    /// Number of requests queued behind the in-flight refresh
    pub fn pending_waiters(&self) -> usize {
        match &self.inner.lock().state {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters, .. } => waiters.len(),
        }
    }

    /// Refresh cycles started over the lifetime of this session
    pub fn cycles_started(&self) -> u64 {
        self.inner.lock().cycles
    }

    /// Resolve a 401 received by a request that carried `used_token`
    ///
    /// Joins the in-flight refresh if there is one, otherwise starts a new
    /// cycle. If the stored token has already moved past `used_token` (an
    /// earlier cycle or a fresh login rotated it), the request is told to
    /// replay with the stored token and no exchange is issued. With no
    /// session left at all the 401 is final and nothing is torn down again.
    pub async fn recover_unauthorized(&self, used_token: Option<&str>) -> RefreshOutcome {
        let waiter_id = Uuid::new_v4();
        let stored = match Session::load(self.inner.store.as_ref()).await {
            Ok(session) => session,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read session before refresh");
                Session::default()
            }
        };

        let (tx, rx) = oneshot::channel();
        let started = {
            let mut guard = self.inner.lock();
            let cell = &mut *guard;
            match &mut cell.state {
                RefreshState::Refreshing { cycle, waiters } => {
                    waiters.push_back(Waiter { id: waiter_id, tx });
                    tracing::debug!(
                        cycle = *cycle,
                        waiters = waiters.len(),
                        waiter = %waiter_id,
                        "Joined in-flight refresh"
                    );
                    None
                }
                RefreshState::Idle => {
                    // Logged out or already torn down; the 401 is final
                    if !stored.is_authenticated() && stored.refresh_token.is_none() {
                        tracing::debug!("No session to recover");
                        return RefreshOutcome::Failed;
                    }

                    if let Some(current) = stored
                        .access_token
                        .filter(|token| Some(token.as_str()) != used_token)
                    {
                        tracing::debug!(
                            token = %redact_token(&current),
                            "Access token already rotated, replaying without refresh"
                        );
                        return RefreshOutcome::Refreshed(current);
                    }

                    cell.cycles += 1;
                    let cycle = cell.cycles;
                    let mut waiters = VecDeque::new();
                    waiters.push_back(Waiter { id: waiter_id, tx });
                    cell.state = RefreshState::Refreshing { cycle, waiters };
                    Some(cycle)
                }
            }
        };

        if let Some(cycle) = started {
            tracing::info!(cycle, waiter = %waiter_id, "Access token rejected, starting refresh cycle");

            // Runs detached so a dropped caller cannot strand the other waiters
            let inner = self.inner.clone();
            tokio::spawn(async move { inner.run_cycle(cycle).await });
        }

        rx.await.unwrap_or(RefreshOutcome::Failed)
    }
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, StateCell> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn run_cycle(self: Arc<Self>, cycle: u64) {
        match self.exchange_and_persist().await {
            Ok(access_token) => {
                let waiters = self.settle();
                tracing::info!(
                    cycle,
                    waiters = waiters.len(),
                    token = %redact_token(&access_token),
                    "Refresh succeeded, releasing waiters"
                );

                for waiter in waiters {
                    let outcome = RefreshOutcome::Refreshed(access_token.clone());
                    if waiter.tx.send(outcome).is_err() {
                        tracing::debug!(waiter = %waiter.id, "Waiter gone before release");
                    }
                }
            }
            Err(e) => {
                tracing::error!(cycle, error = %e, "Refresh failed, tearing down session");

                if let Err(e) = Session::purge(self.store.as_ref()).await {
                    tracing::error!(error = %e, "Failed to clear tokens after refresh failure");
                }

                let waiters = self.settle();
                tracing::warn!(cycle, waiters = waiters.len(), "Rejecting queued requests");
                for waiter in waiters {
                    if waiter.tx.send(RefreshOutcome::Failed).is_err() {
                        tracing::debug!(waiter = %waiter.id, "Waiter gone before rejection");
                    }
                }

                self.navigator.reset_to_route(Route::Login);
            }
        }
    }

    /// Exchange the stored refresh token and persist the result
    ///
    /// The new access token is written before any waiter is released.
    async fn exchange_and_persist(&self) -> Result<String> {
        let refresh_token = self
            .store
            .get(REFRESH_TOKEN_KEY)
            .await?
            .ok_or_else(|| ClientError::RefreshFailed("No refresh token stored".to_string()))?;

        let tokens = self.exchange.exchange(&refresh_token).await?;

        self.store
            .set(ACCESS_TOKEN_KEY, &tokens.access_token)
            .await?;
        if let Some(ref rotated) = tokens.refresh_token {
            self.store.set(REFRESH_TOKEN_KEY, rotated).await?;
        }

        Ok(tokens.access_token)
    }

    /// Back to idle, handing over the queue of the cycle that just ended
    fn settle(&self) -> VecDeque<Waiter> {
        let mut cell = self.lock();
        match std::mem::replace(&mut cell.state, RefreshState::Idle) {
            RefreshState::Refreshing { waiters, .. } => waiters,
            RefreshState::Idle => VecDeque::new(),
        }
    }
}
