//! The navigation context: where the user is, and how to send them elsewhere.
//!
//! The gateway needs both when a 401 arrives deep inside some request: it
//! reads the current location to build the pending redirect and to avoid
//! redirecting from the login page to itself.

use parking_lot::Mutex;
use realmgate_protocol::Location;

/// Host navigation.
pub trait Navigator: Send + Sync {
    /// The location currently displayed.
    fn current(&self) -> Location;

    /// Navigates to `target` (an in-app `path?query#fragment`).
    fn go(&self, target: &str);

    /// Navigates to `target` in place of the current history entry.
    ///
    /// Hosts without a history stack can keep the default, which is `go`.
    fn replace(&self, target: &str) {
        self.go(target);
    }
}

/// A navigator that only records where it was sent.
///
/// Useful for headless hosts and for tests that assert on redirects.
#[derive(Debug)]
pub struct MemoryNavigator {
    state: Mutex<NavState>,
}

#[derive(Debug)]
struct NavState {
    current: Location,
    history: Vec<String>,
}

impl MemoryNavigator {
    /// Starts at `initial`.
    pub fn new(initial: &str) -> Self {
        Self {
            state: Mutex::new(NavState {
                current: Location::parse(initial),
                history: Vec::new(),
            }),
        }
    }

    /// The history stack: every target passed to [`Navigator::go`], with
    /// [`Navigator::replace`] overwriting the top entry.
    pub fn history(&self) -> Vec<String> {
        self.state.lock().history.clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current(&self) -> Location {
        self.state.lock().current.clone()
    }

    fn go(&self, target: &str) {
        let mut state = self.state.lock();
        state.current = Location::parse(target);
        state.history.push(target.to_string());
    }

    fn replace(&self, target: &str) {
        let mut state = self.state.lock();
        state.current = Location::parse(target);
        state.history.pop();
        state.history.push(target.to_string());
    }
}
