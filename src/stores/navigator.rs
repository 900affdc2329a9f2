//! Location sink for URL synchronisation.

use std::sync::{Mutex, MutexGuard, PoisonError};

/// The page location the stores read from and write to.
///
/// Writes replace the current history entry; they never add one. Stores
/// call [`replace`](Self::replace) while holding their own state lock, so
/// implementations must not call back into a store.
pub trait Navigator: Send + Sync {
    /// Current query string, without the leading `?`.
    fn query(&self) -> String;

    /// Replace the current location's query string.
    fn replace(&self, query: &str);
}

/// In-memory [`Navigator`], for the CLI and tests.
pub struct MemoryNavigator {
    path: String,
    state: Mutex<Location>,
}

struct Location {
    query: String,
    replacements: usize,
}

impl MemoryNavigator {
    /// Navigator at `path` with an empty query.
    pub fn new(path: impl Into<String>) -> Self {
        Self::with_query(path, "")
    }

    /// Navigator at `path?query`.
    pub fn with_query(path: impl Into<String>, query: impl Into<String>) -> Self {
        let query = query.into();
        Self {
            path: path.into(),
            state: Mutex::new(Location {
                query: query.strip_prefix('?').unwrap_or(&query).to_string(),
                replacements: 0,
            }),
        }
    }

    /// Full location, e.g. `/explore?q=MIT`.
    pub fn location(&self) -> String {
        let state = self.lock();
        if state.query.is_empty() {
            self.path.clone()
        } else {
            format!("{}?{}", self.path, state.query)
        }
    }

    /// Number of [`replace`](Navigator::replace) calls so far.
    pub fn replacements(&self) -> usize {
        self.lock().replacements
    }

    fn lock(&self) -> MutexGuard<'_, Location> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/explore")
    }
}

impl Navigator for MemoryNavigator {
    fn query(&self) -> String {
        self.lock().query.clone()
    }

    fn replace(&self, query: &str) {
        let mut state = self.lock();
        state.query = query.to_string();
        state.replacements += 1;
    }
}
