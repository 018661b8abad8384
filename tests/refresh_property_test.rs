// Property tests for the single-flight refresh guarantee

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use fitness_session::auth::{RefreshOutcome, RefreshPhase, SessionManager};
use fitness_session::store::{MemoryTokenStore, TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use fitness_session::testing::ScriptedExchange;
use fitness_session::{NavigationState, Route};

struct Outcome {
    outcomes: Vec<RefreshOutcome>,
    exchanges: usize,
    cycles: u64,
    phase: RefreshPhase,
    access_token: Option<String>,
    login_resets: usize,
}

/// Fire `concurrent` 401 recoveries at a gated exchange, then release it
fn run_burst(concurrent: usize, succeed: bool) -> Outcome {
    tokio_test::block_on(async move {
        let store = Arc::new(MemoryTokenStore::with_entries([
            (ACCESS_TOKEN_KEY, "T1"),
            (REFRESH_TOKEN_KEY, "R1"),
        ]));
        let exchange = Arc::new(
            if succeed {
                ScriptedExchange::succeeding(&["T2"])
            } else {
                ScriptedExchange::failing("401 - expired")
            }
            .gated(),
        );
        let nav = Arc::new(NavigationState::new());
        let manager = SessionManager::new(store.clone(), exchange.clone(), nav.clone());

        let handles: Vec<_> = (0..concurrent)
            .map(|_| {
                let manager = manager.clone();
                tokio::spawn(async move { manager.recover_unauthorized(Some("T1")).await })
            })
            .collect();

        tokio::time::timeout(Duration::from_secs(5), async {
            while manager.pending_waiters() < concurrent {
                tokio::time::sleep(Duration::from_millis(1)).await;
            }
        })
        .await
        .expect("Waiters never queued");

        exchange.release();

        let outcomes: Vec<RefreshOutcome> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|joined| joined.expect("Waiter task panicked"))
            .collect();

        Outcome {
            outcomes,
            exchanges: exchange.calls(),
            cycles: manager.cycles_started(),
            phase: manager.phase(),
            access_token: store.get(ACCESS_TOKEN_KEY).await.expect("Store read failed"),
            login_resets: nav.reset_count(Route::Login),
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn prop_burst_issues_one_exchange(concurrent in 1usize..16, succeed in any::<bool>()) {
        let result = run_burst(concurrent, succeed);

        prop_assert_eq!(result.exchanges, 1);
        prop_assert_eq!(result.cycles, 1);
        prop_assert_eq!(result.phase, RefreshPhase::Idle);
        prop_assert_eq!(result.outcomes.len(), concurrent);

        if succeed {
            prop_assert!(result
                .outcomes
                .iter()
                .all(|o| *o == RefreshOutcome::Refreshed("T2".to_string())));
            prop_assert_eq!(result.access_token.as_deref(), Some("T2"));
            prop_assert_eq!(result.login_resets, 0);
        } else {
            prop_assert!(result.outcomes.iter().all(|o| *o == RefreshOutcome::Failed));
            prop_assert_eq!(result.access_token, None);
            prop_assert_eq!(result.login_resets, 1);
        }
    }
}
