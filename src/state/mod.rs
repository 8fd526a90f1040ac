//! Long-lived state the orchestrator owns between commands.

pub mod puzzle;

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, RwLock};

/// Shared handle to the application state.
pub type SharedState = Arc<AppState>;

/// The only state the core keeps between commands.
///
/// Everything else (puzzle existence, solved status, voice presence) is
/// re-derived from the external systems on every call.
pub struct AppState {
    current_round: RwLock<Option<String>>,
    title_gates: DashMap<String, Arc<Mutex<()>>>,
}

impl AppState {
    /// Construct a fresh state wrapped in an [`Arc`] so it can be cloned
    /// cheaply.
    pub fn new() -> SharedState {
        Arc::new(Self {
            current_round: RwLock::new(None),
            title_gates: DashMap::new(),
        })
    }

    /// Round new puzzles default into when none is named.
    pub async fn current_round(&self) -> Option<String> {
        self.current_round.read().await.clone()
    }

    /// Point the default round at the given canonical name.
    pub async fn set_current_round(&self, name: String) {
        let mut slot = self.current_round.write().await;
        *slot = Some(name);
    }

    /// Forget the default round; done on reconnect so a stale pointer never
    /// outlives a category rescan.
    pub async fn clear_current_round(&self) {
        let mut slot = self.current_round.write().await;
        slot.take();
    }

    /// Gate serializing add/solve/remove for one sanitized title.
    ///
    /// Commands for different puzzles interleave freely; two identical
    /// commands cannot both pass the existence check before either creates.
    pub fn title_gate(&self, title: &str) -> Arc<Mutex<()>> {
        self.title_gates
            .entry(title.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}
