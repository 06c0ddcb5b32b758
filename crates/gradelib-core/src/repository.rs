//! Repository registration and clone-state tracking: the concurrent
//! progress registry the manager and clone engine share.

use std::path::PathBuf;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// A repository the manager knows about. The scratch path is only
/// meaningful once the clone has reached [`CloneState::Completed`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryRef {
    pub url: String,
}

impl RepositoryRef {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

/// Tagged clone-state variant. Transitions are owned by the Clone Engine;
/// the registry only enforces monotonic progress and terminal-state
/// finality (see [`ProgressRegistry::update`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status_type", rename_all = "snake_case")]
pub enum CloneState {
    Queued,
    Cloning { progress: u8 },
    Completed { scratch_path: PathBuf },
    Failed { error_message: String },
}

impl CloneState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, CloneState::Completed { .. } | CloneState::Failed { .. })
    }

    /// `status_type` string as polled by embedders (mirrors the Python
    /// reference's `status_type` field: `"queued" | "cloning" |
    /// "completed" | "failed"`).
    pub fn status_type(&self) -> &'static str {
        match self {
            CloneState::Queued => "queued",
            CloneState::Cloning { .. } => "cloning",
            CloneState::Completed { .. } => "completed",
            CloneState::Failed { .. } => "failed",
        }
    }
}

/// Read-only snapshot returned by `fetch_clone_tasks`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CloneTaskView {
    pub url: String,
    pub state: CloneState,
}

/// Concurrent URL → [`CloneState`] map. A `DashMap` gives per-shard
/// locking for free, which is what lets the manager update one
/// repository's progress without blocking a snapshot read of another's —
/// the same sharded-map choice the git-internals reference makes for its
/// object caches.
#[derive(Debug, Default)]
pub struct ProgressRegistry {
    states: DashMap<String, CloneState>,
}

impl ProgressRegistry {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Registers a URL if unknown. Re-registering a known URL is a no-op
    /// (does not reset its state).
    pub fn register(&self, url: &str) {
        self.states.entry(url.to_string()).or_insert(CloneState::Queued);
    }

    /// Resets a URL to `Queued`, whatever its current state. Used when a
    /// caller re-issues `clone(url)`.
    pub fn reset(&self, url: &str) {
        self.states.insert(url.to_string(), CloneState::Queued);
    }

    /// Unconditionally sets the state. Used for the Queued→Cloning(0) and
    /// the terminal transitions, which are not subject to the monotonic
    /// check below.
    pub fn set(&self, url: &str, state: CloneState) {
        self.states.insert(url.to_string(), state);
    }

    /// Updates progress while `Cloning`, dropping the update if it would
    /// decrease the percentage (monotonic-progress invariant). No-op if
    /// the URL is not currently `Cloning` or is unknown.
    pub fn update_progress(&self, url: &str, progress: u8) {
        if let Some(mut entry) = self.states.get_mut(url) {
            if let CloneState::Cloning { progress: current } = *entry {
                if progress > current {
                    *entry = CloneState::Cloning { progress };
                }
            }
        }
    }

    pub fn get(&self, url: &str) -> Option<CloneState> {
        self.states.get(url).map(|e| e.clone())
    }

    /// Point-in-time snapshot. Not globally atomic across entries, only
    /// per-entry consistent.
    pub fn snapshot(&self) -> Vec<CloneTaskView> {
        self.states
            .iter()
            .map(|e| CloneTaskView {
                url: e.key().clone(),
                state: e.value().clone(),
            })
            .collect()
    }

    pub fn known_urls(&self) -> Vec<String> {
        self.states.iter().map(|e| e.key().clone()).collect()
    }
}
