//! Registry of remote creates that have not returned a server id yet.
//!
//! A later update or delete of the same prompt must reach the record the
//! create produces, so its remote phase waits for the server id first.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use crate::models::PromptId;

type ServerIdSlot = watch::Receiver<Option<PromptId>>;

#[derive(Clone, Default)]
pub(crate) struct PendingCreates {
    by_local_id: Arc<Mutex<HashMap<PromptId, ServerIdSlot>>>,
}

impl PendingCreates {
    /// Mark a create for `local_id` as in flight.
    pub(crate) fn register(&self, local_id: PromptId) -> CreateTicket {
        let (sender, receiver) = watch::channel(None);
        self.by_local_id.lock().insert(local_id.clone(), receiver);
        CreateTicket {
            local_id,
            sender,
            creates: self.clone(),
        }
    }

    /// Run a local write of `id` and capture the create it has to follow.
    ///
    /// The registry lock is held across `write`, so a create cannot finish
    /// between the local write and the lookup.
    pub(crate) fn write_local<R>(
        &self,
        id: &PromptId,
        write: impl FnOnce() -> R,
    ) -> (R, Option<ServerIdWait>) {
        let waiting = self.by_local_id.lock();
        let written = write();
        let wait = waiting.get(id).cloned().map(ServerIdWait);
        (written, wait)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.by_local_id.lock().len()
    }
}

/// Held by the remote phase of an insert until the create returns.
///
/// Dropping it without [`CreateTicket::complete`] releases waiters with no
/// server id.
pub(crate) struct CreateTicket {
    local_id: PromptId,
    sender: watch::Sender<Option<PromptId>>,
    creates: PendingCreates,
}

impl CreateTicket {
    /// Run `finish` and publish `server_id` under the registry lock.
    pub(crate) fn complete<R>(self, server_id: &PromptId, finish: impl FnOnce() -> R) -> R {
        let mut waiting = self.creates.by_local_id.lock();
        let finished = finish();
        self.sender.send_replace(Some(server_id.clone()));
        waiting.remove(&self.local_id);
        finished
    }
}

impl Drop for CreateTicket {
    fn drop(&mut self) {
        self.creates.by_local_id.lock().remove(&self.local_id);
    }
}

/// Server id of an in-flight create, once it is known.
pub(crate) struct ServerIdWait(ServerIdSlot);

impl ServerIdWait {
    /// The assigned server id, or `local_id` if the create failed.
    pub(crate) async fn resolve(mut self, local_id: PromptId) -> PromptId {
        let assigned = match self.0.wait_for(Option::is_some).await {
            Ok(server_id) => server_id.clone(),
            Err(_) => None,
        };
        assigned.unwrap_or(local_id)
    }
}

/// Remote target for a write issued against `local_id`.
pub(crate) async fn remote_target(wait: Option<ServerIdWait>, local_id: PromptId) -> PromptId {
    match wait {
        Some(wait) => wait.resolve(local_id).await,
        None => local_id,
    }
}
