// Navigation reset dispatcher
// The session core only ever resets the stack; it never pushes screens

use std::fmt;
use std::sync::Mutex;

/// Root screens the session layer can reset to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    /// Splash screen that runs the bootstrap decision tree
    AuthLoading,
    Login,
    Home,
    /// Onboarding form for physiological data
    InitialForm,
}

impl Route {
    pub fn name(&self) -> &'static str {
        match self {
            Route::AuthLoading => "AuthLoading",
            Route::Login => "Login",
            Route::Home => "Home",
            Route::InitialForm => "InitialForm",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Discards navigation history and places `route` at the root
pub trait Navigator: Send + Sync {
    fn reset_to_route(&self, route: Route);
}

/// In-process dispatcher that tracks the current root screen
///
/// Every reset is recorded so callers (and tests) can tell how many times
/// the stack was torn down.
#[derive(Debug)]
pub struct NavigationState {
    inner: Mutex<NavigationInner>,
}

#[derive(Debug)]
struct NavigationInner {
    current: Route,
    resets: Vec<Route>,
}

impl NavigationState {
    /// Start at the auth-loading splash screen
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(NavigationInner {
                current: Route::AuthLoading,
                resets: Vec::new(),
            }),
        }
    }

    pub fn current(&self) -> Route {
        self.lock().current
    }

    /// Every route reset to, oldest first
    pub fn resets(&self) -> Vec<Route> {
        self.lock().resets.clone()
    }

    pub fn reset_count(&self, route: Route) -> usize {
        self.lock().resets.iter().filter(|r| **r == route).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NavigationInner> {
        // Poisoning is ignored; every write is a single push or assignment
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for NavigationState {
    fn default() -> Self {
        Self::new()
    }
}

impl Navigator for NavigationState {
    fn reset_to_route(&self, route: Route) {
        let mut inner = self.lock();
        tracing::info!(from = %inner.current, to = %route, "Resetting navigation stack");
        inner.current = route;
        inner.resets.push(route);
    }
}
