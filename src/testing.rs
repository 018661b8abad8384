// Test doubles for the session core
// Available in unit tests and to integration tests via the `test-utils` feature

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::Notify;

use crate::auth::{RefreshExchange, TokenPair};
use crate::error::{ClientError, Result};

/// Refresh exchange that replays scripted responses in order
///
/// When gated, every call blocks until [`ScriptedExchange::release`] is
/// called, which lets tests pile up waiters behind an in-flight refresh.
pub struct ScriptedExchange {
    responses: Mutex<VecDeque<std::result::Result<TokenPair, String>>>,
    seen: Mutex<Vec<String>>,
    calls: AtomicUsize,
    gate: Option<Notify>,
}

impl ScriptedExchange {
    pub fn with_responses(responses: Vec<std::result::Result<TokenPair, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            seen: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            gate: None,
        }
    }

    /// One successful exchange per token, in order
    pub fn succeeding(tokens: &[&str]) -> Self {
        Self::with_responses(
            tokens
                .iter()
                .map(|token| {
                    Ok(TokenPair {
                        access_token: token.to_string(),
                        refresh_token: None,
                    })
                })
                .collect(),
        )
    }

    pub fn failing(message: &str) -> Self {
        Self::with_responses(vec![Err(message.to_string())])
    }

    pub fn gated(mut self) -> Self {
        self.gate = Some(Notify::new());
        self
    }

    /// Let one gated exchange proceed
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Refresh tokens presented to the exchange, oldest first
    pub fn seen_refresh_tokens(&self) -> Vec<String> {
        self.seen.lock().map(|seen| seen.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl RefreshExchange for ScriptedExchange {
    async fn exchange(&self, refresh_token: &str) -> Result<TokenPair> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(refresh_token.to_string());
        }

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front());

        match next {
            Some(Ok(tokens)) => Ok(tokens),
            Some(Err(message)) => Err(ClientError::RefreshFailed(message)),
            None => Err(ClientError::RefreshFailed(
                "No scripted refresh response left".to_string(),
            )),
        }
    }
}
