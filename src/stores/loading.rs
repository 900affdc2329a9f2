//! Global loading/error state.

use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Whether a batch load is in progress, and the last user-facing error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingState {
    pub is_loading: bool,
    pub error: Option<String>,
}

impl Default for LoadingState {
    fn default() -> Self {
        // The page starts out loading until the first initialize completes.
        Self {
            is_loading: true,
            error: None,
        }
    }
}

/// Observable [`LoadingState`].
pub struct LoadingStore {
    state: watch::Sender<LoadingState>,
}

impl LoadingStore {
    pub fn new() -> Self {
        let (state, _) = watch::channel(LoadingState::default());
        Self { state }
    }

    pub fn get(&self) -> LoadingState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<LoadingState> {
        self.state.subscribe()
    }

    pub fn stream(&self) -> WatchStream<LoadingState> {
        WatchStream::new(self.subscribe())
    }

    /// Mark loading and clear any previous error.
    pub fn start_loading(&self) {
        self.state.send_modify(|state| {
            state.is_loading = true;
            state.error = None;
        });
    }

    pub fn stop_loading(&self) {
        self.state.send_modify(|state| state.is_loading = false);
    }

    /// Record an error; also stops loading.
    pub fn set_error(&self, error: impl Into<String>) {
        let error = error.into();
        self.state.send_modify(|state| {
            state.is_loading = false;
            state.error = Some(error);
        });
    }
}

impl Default for LoadingStore {
    fn default() -> Self {
        Self::new()
    }
}
