//! Handles for the remote phase of a mutation.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::oneshot;

use crate::models::PromptId;

static NEXT_MUTATION_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identifier of one mutation call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MutationId(u64);

impl MutationId {
    pub(crate) fn next() -> Self {
        Self(NEXT_MUTATION_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MutationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

impl fmt::Display for MutationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        f.write_str(label)
    }
}

/// Outcome of the remote phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    /// The remote store accepted the change; `key` is the final identifier
    Confirmed { key: PromptId },
    /// The remote call failed; local state was left as the local phase wrote it
    Failed { error: String },
    /// No remote store is configured
    LocalOnly,
}

impl MutationStatus {
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}

/// A mutation whose local phase has completed.
///
/// Dropping the handle does not cancel the remote phase.
#[derive(Debug)]
pub struct PendingMutation {
    id: MutationId,
    kind: MutationKind,
    key: PromptId,
    outcome: Option<oneshot::Receiver<MutationStatus>>,
}

impl PendingMutation {
    pub(crate) const fn new(
        id: MutationId,
        kind: MutationKind,
        key: PromptId,
        outcome: oneshot::Receiver<MutationStatus>,
    ) -> Self {
        Self {
            id,
            kind,
            key,
            outcome: Some(outcome),
        }
    }

    pub(crate) const fn local_only(id: MutationId, kind: MutationKind, key: PromptId) -> Self {
        Self {
            id,
            kind,
            key,
            outcome: None,
        }
    }

    pub const fn id(&self) -> MutationId {
        self.id
    }

    pub const fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Identifier the local phase wrote (before any server re-key)
    pub const fn key(&self) -> &PromptId {
        &self.key
    }

    /// Wait for the remote phase to finish.
    pub async fn settle(self) -> MutationStatus {
        match self.outcome {
            None => MutationStatus::LocalOnly,
            Some(outcome) => outcome.await.unwrap_or_else(|_| MutationStatus::Failed {
                error: "remote phase was cancelled".to_string(),
            }),
        }
    }
}

/// Counts one in-flight remote phase until dropped.
pub(crate) struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    pub(crate) fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
