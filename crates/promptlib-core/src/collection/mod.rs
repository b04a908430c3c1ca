//! Optimistic mutation collection.
//!
//! Every mutation runs in two phases. The local phase writes the
//! [`LocalStore`] before the call returns. The remote phase is spawned on
//! the runtime the collection was built on and forwards exactly one request
//! to the [`RecordApi`]. Its outcome is reported through [`PendingMutation`]
//! and never rolls back the local write.

mod creates;
mod pending;

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::oneshot;

pub use pending::{MutationId, MutationKind, MutationStatus, PendingMutation};

use crate::error::{Error, Result};
use crate::models::{Prompt, PromptDraft, PromptId};
use crate::remote::{NewPrompt, PromptPatch, RecordApi};
use crate::store::LocalStore;
use crate::util::unix_millis_now;
use creates::{remote_target, PendingCreates};
use pending::InFlight;

/// Prompt collection with optimistic local writes.
#[derive(Clone)]
pub struct MutationCollection {
    store: LocalStore,
    remote: Option<Arc<dyn RecordApi>>,
    runtime: Handle,
    in_flight: Arc<AtomicUsize>,
    creates: PendingCreates,
}

impl MutationCollection {
    /// Build a collection whose remote phases run on `runtime`.
    pub fn new(store: LocalStore, remote: Option<Arc<dyn RecordApi>>, runtime: Handle) -> Self {
        Self {
            store,
            remote,
            runtime,
            in_flight: Arc::new(AtomicUsize::new(0)),
            creates: PendingCreates::default(),
        }
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Whether mutations are forwarded to a remote store
    pub const fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// Number of remote phases that have not finished yet
    pub fn pending_remote(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Insert a prompt.
    ///
    /// The remote create does not carry the local id. When the server
    /// assigns a different one, the local row is re-keyed to it, keeping
    /// whatever the row holds at that moment. A row deleted while the create
    /// was in flight stays deleted. Updates and deletes issued before the
    /// create returns are sent to the server id once it is known.
    pub fn insert(&self, prompt: Prompt) -> Result<PendingMutation> {
        self.store.upsert(&prompt)?;
        tracing::debug!(id = %prompt.id, "Inserted prompt locally");

        let local_id = prompt.id.clone();
        let fields = NewPrompt::from(&prompt);
        let creates = self.creates.clone();
        Ok(self.dispatch(MutationKind::Insert, local_id, |remote, store, local_id| {
            let ticket = creates.register(local_id.clone());
            async move {
                let server_id = remote.create(&fields).await?;
                ticket.complete(&server_id, || rekey_created(&store, &local_id, &server_id))?;
                Ok::<_, Error>(server_id)
            }
        }))
    }

    /// Edit a prompt through `mutator` and refresh its `updated_at`.
    ///
    /// Only changed fields are sent to the remote update. Returns
    /// [`Error::NotFound`] if the prompt is not in the local store, in which
    /// case nothing is sent.
    ///
    /// `mutator` runs while the store is locked and must not call back into
    /// the store or this collection; doing so deadlocks.
    pub fn update(
        &self,
        id: &PromptId,
        mutator: impl FnOnce(&mut PromptDraft),
    ) -> Result<PendingMutation> {
        let now = unix_millis_now();
        let (modified, create) = self.creates.write_local(id, || {
            self.store.modify(id, |prompt| {
                let mut draft = prompt.draft();
                mutator(&mut draft);
                prompt.name = draft.name;
                prompt.text = draft.text;
                prompt.updated_at = now.max(prompt.updated_at);
            })
        });
        let (before, after) = modified?.ok_or_else(|| Error::NotFound(id.to_string()))?;
        tracing::debug!(id = %id, "Updated prompt locally");

        let patch = PromptPatch::between(&before, &after);
        Ok(self.dispatch(MutationKind::Update, id.clone(), |remote, _, id| async move {
            let target = remote_target(create, id).await;
            remote.update(&target, &patch).await?;
            Ok::<_, Error>(target)
        }))
    }

    /// Delete a prompt. A missing row is not an error; the remote delete is
    /// sent either way.
    pub fn delete(&self, id: &PromptId) -> Result<PendingMutation> {
        let (removed, create) = self.creates.write_local(id, || self.store.delete(id));
        let removed = removed?;
        tracing::debug!(id = %id, removed, "Deleted prompt locally");

        Ok(self.dispatch(MutationKind::Delete, id.clone(), |remote, _, id| async move {
            let target = remote_target(create, id).await;
            remote.delete(&target).await?;
            Ok::<_, Error>(target)
        }))
    }

    fn dispatch<F, Fut>(&self, kind: MutationKind, key: PromptId, remote_phase: F) -> PendingMutation
    where
        F: FnOnce(Arc<dyn RecordApi>, LocalStore, PromptId) -> Fut,
        Fut: Future<Output = Result<PromptId>> + Send + 'static,
    {
        let mutation = MutationId::next();
        let Some(remote) = self.remote.clone() else {
            return PendingMutation::local_only(mutation, kind, key);
        };

        let (tx, rx) = oneshot::channel();
        let in_flight = InFlight::enter(&self.in_flight);
        let task = remote_phase(remote, self.store.clone(), key.clone());
        let target = key.clone();

        self.runtime.spawn(async move {
            let status = match task.await {
                Ok(key) => MutationStatus::Confirmed { key },
                Err(error) => {
                    tracing::warn!(
                        mutation = %mutation,
                        id = %target,
                        "Remote {kind} failed: {error}"
                    );
                    MutationStatus::Failed {
                        error: remote_message(&error),
                    }
                }
            };
            drop(in_flight);
            // The caller may have dropped the handle.
            let _ = tx.send(status);
        });

        PendingMutation::new(mutation, kind, key, rx)
    }
}

fn rekey_created(store: &LocalStore, local_id: &PromptId, server_id: &PromptId) -> Result<()> {
    if server_id == local_id {
        return Ok(());
    }
    match store.rekey(local_id, server_id)? {
        Some(_) => tracing::debug!(
            from = %local_id,
            to = %server_id,
            "Re-keyed prompt to server id"
        ),
        None => tracing::debug!(
            id = %local_id,
            server_id = %server_id,
            "Prompt was deleted before the server confirmed it"
        ),
    }
    Ok(())
}

fn remote_message(error: &Error) -> String {
    match error {
        Error::Remote(remote) => remote.to_string(),
        other => other.to_string(),
    }
}
