//! Application state management
//!
//! Global state accessible via Dioxus context providers.

use std::sync::Arc;

use dioxus::prelude::*;

use promptlib_core::collection::{MutationStatus, PendingMutation};
use promptlib_core::query::LiveQuery;
use promptlib_core::sync::SyncOutcome;
use promptlib_core::{Prompt, PromptId, PromptLibrary};

/// Status of the startup pull from the remote record API
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyncStatus {
    Starting,
    Syncing,
    Synced(usize),
    LocalOnly,
    Failed(String),
}

impl SyncStatus {
    pub fn label(&self) -> String {
        match self {
            Self::Starting => "Opening library...".to_string(),
            Self::Syncing => "Syncing...".to_string(),
            Self::Synced(count) => format!("Synced {count} prompts"),
            Self::LocalOnly => "Local only".to_string(),
            Self::Failed(reason) => format!("Offline: {reason}"),
        }
    }
}

impl From<SyncOutcome> for SyncStatus {
    fn from(outcome: SyncOutcome) -> Self {
        match outcome {
            SyncOutcome::Synced { count } => Self::Synced(count),
            SyncOutcome::Failed { reason } => Self::Failed(reason),
            SyncOutcome::Skipped => Self::LocalOnly,
        }
    }
}

/// What the prompt form is editing
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormTarget {
    Closed,
    New,
    Existing(PromptId),
}

impl FormTarget {
    /// Target to switch to after a prompt moved from `from` to `to`
    #[must_use]
    pub fn after_rekey(&self, from: &PromptId, to: &PromptId) -> Option<Self> {
        match self {
            Self::Existing(id) if id == from => Some(Self::Existing(to.clone())),
            _ => None,
        }
    }
}

/// Global application state
#[derive(Clone, Copy)]
pub struct AppState {
    /// Library handle, set once the local store is open
    pub library: Signal<Option<PromptLibrary>>,
    /// Live query driving the prompt list
    pub query: Signal<Option<Arc<LiveQuery>>>,
    /// Latest result set of `query`
    pub prompts: Signal<Vec<Prompt>>,
    /// Raw search box contents (applied to `query` after a debounce)
    pub search_query: Signal<String>,
    pub form: Signal<FormTarget>,
    pub sync_status: Signal<SyncStatus>,
    /// Remote phases still in flight
    pub pending_remote: Signal<usize>,
    /// Last error worth showing to the user
    pub error: Signal<Option<String>>,
}

impl AppState {
    /// Prompt currently open in the form, if any
    #[must_use]
    pub fn editing_prompt(&self) -> Option<Prompt> {
        let FormTarget::Existing(id) = (self.form)() else {
            return None;
        };
        (self.prompts)().into_iter().find(|prompt| prompt.id == id)
    }

    /// Track a mutation's remote phase and surface failures.
    pub fn track(mut self, pending: PendingMutation) {
        self.refresh_pending();
        spawn(async move {
            let kind = pending.kind();
            if let MutationStatus::Failed { error } = pending.settle().await {
                tracing::warn!("Remote {kind} failed: {error}");
                self.error.set(Some(format!("Saved locally, remote {kind} failed: {error}")));
            }
            self.refresh_pending();
        });
    }

    fn refresh_pending(&mut self) {
        let count = self
            .library
            .peek()
            .as_ref()
            .map_or(0, |library| library.collection().pending_remote());
        self.pending_remote.set(count);
    }
}
