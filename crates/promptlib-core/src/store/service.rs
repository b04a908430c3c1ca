//! Shared local store used by the mutation collection, the sync
//! bootstrapper and live queries.

use std::path::Path;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::{Database, PromptRepository, SqlitePromptRepository};
use crate::error::Result;
use crate::models::{Prompt, PromptId};

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Change notification emitted after a write has been committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// A single prompt was inserted or overwritten
    Upserted(PromptId),
    /// A batch of prompts was upserted in one transaction
    BulkUpserted(usize),
    /// A prompt was removed
    Deleted(PromptId),
    /// A prompt moved from a local id to a server-assigned id
    Rekeyed { from: PromptId, to: PromptId },
}

/// Thread-safe handle to the local prompt table.
///
/// All operations are synchronous and complete before returning, so a read
/// issued right after a write observes it. Cloning is cheap and every clone
/// shares the same connection and event channel.
#[derive(Clone)]
pub struct LocalStore {
    db: Arc<Mutex<Database>>,
    events: broadcast::Sender<StoreEvent>,
}

impl LocalStore {
    /// Open the store at the given filesystem path.
    pub fn open_path(db_path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from_database(Database::open(db_path)?))
    }

    /// Open an in-memory store (primarily for tests).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::from_database(Database::open_in_memory()?))
    }

    fn from_database(db: Database) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            db: Arc::new(Mutex::new(db)),
            events,
        }
    }

    pub(crate) fn downgrade(&self) -> WeakLocalStore {
        WeakLocalStore {
            db: Arc::downgrade(&self.db),
        }
    }

    /// Subscribe to change events.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No receivers is the normal state for headless use.
        let _ = self.events.send(event);
    }

    /// Fetch a prompt by id.
    pub fn get(&self, id: &PromptId) -> Result<Option<Prompt>> {
        let db = self.db.lock();
        SqlitePromptRepository::new(db.connection()).get(id)
    }

    /// All prompts, most recently updated first.
    pub fn list_all(&self) -> Result<Vec<Prompt>> {
        let db = self.db.lock();
        SqlitePromptRepository::new(db.connection()).list_all()
    }

    /// Number of stored prompts.
    pub fn count(&self) -> Result<usize> {
        let db = self.db.lock();
        SqlitePromptRepository::new(db.connection()).count()
    }

    /// IDs starting with `prefix`, newest first.
    pub fn ids_with_prefix(&self, prefix: &str, limit: usize) -> Result<Vec<PromptId>> {
        let db = self.db.lock();
        SqlitePromptRepository::new(db.connection()).ids_with_prefix(prefix, limit)
    }

    /// Insert or overwrite one prompt.
    pub fn upsert(&self, prompt: &Prompt) -> Result<()> {
        {
            let db = self.db.lock();
            SqlitePromptRepository::new(db.connection()).upsert(prompt)?;
        }
        self.emit(StoreEvent::Upserted(prompt.id.clone()));
        Ok(())
    }

    /// Read-modify-write of one prompt under the store lock.
    ///
    /// Returns the previous and new versions, or `None` if the prompt does
    /// not exist. `apply` runs with the store locked, so it must not use
    /// this store.
    pub fn modify(
        &self,
        id: &PromptId,
        apply: impl FnOnce(&mut Prompt),
    ) -> Result<Option<(Prompt, Prompt)>> {
        let modified = {
            let db = self.db.lock();
            let repo = SqlitePromptRepository::new(db.connection());
            let Some(before) = repo.get(id)? else {
                return Ok(None);
            };
            let mut after = before.clone();
            apply(&mut after);
            after.id = before.id.clone();
            repo.upsert(&after)?;
            (before, after)
        };
        self.emit(StoreEvent::Upserted(id.clone()));
        Ok(Some(modified))
    }

    /// Upsert a batch in one transaction. Rows not in the batch are kept.
    pub fn bulk_upsert(&self, prompts: &[Prompt]) -> Result<usize> {
        if prompts.is_empty() {
            return Ok(0);
        }

        let count = {
            let db = self.db.lock();
            SqlitePromptRepository::new(db.connection()).bulk_upsert(prompts)?
        };
        self.emit(StoreEvent::BulkUpserted(count));
        Ok(count)
    }

    /// Delete a prompt; returns whether a row was removed.
    pub fn delete(&self, id: &PromptId) -> Result<bool> {
        let removed = {
            let db = self.db.lock();
            SqlitePromptRepository::new(db.connection()).delete(id)?
        };
        if removed {
            self.emit(StoreEvent::Deleted(id.clone()));
        }
        Ok(removed)
    }

    /// Atomically move a prompt to a new id.
    pub fn rekey(&self, from: &PromptId, to: &PromptId) -> Result<Option<Prompt>> {
        let rekeyed = {
            let db = self.db.lock();
            SqlitePromptRepository::new(db.connection()).rekey(from, to)?
        };
        if rekeyed.is_some() {
            self.emit(StoreEvent::Rekeyed {
                from: from.clone(),
                to: to.clone(),
            });
        }
        Ok(rekeyed)
    }
}

/// Non-owning read handle, so observers do not keep the store open.
pub(crate) struct WeakLocalStore {
    db: Weak<Mutex<Database>>,
}

impl WeakLocalStore {
    /// All prompts, or `None` once every [`LocalStore`] handle is gone.
    pub(crate) fn list_all(&self) -> Option<Result<Vec<Prompt>>> {
        let shared = self.db.upgrade()?;
        let db = shared.lock();
        Some(SqlitePromptRepository::new(db.connection()).list_all())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn prompt(id: &str, updated_at: i64) -> Prompt {
        Prompt {
            id: PromptId::parse(id).unwrap(),
            name: format!("name {id}"),
            text: format!("text {id}"),
            created_at: 0,
            updated_at,
        }
    }

    #[test]
    fn writes_emit_events() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut events = store.subscribe();

        let p = prompt("a", 1);
        store.upsert(&p).unwrap();
        store
            .rekey(&p.id, &PromptId::parse("b").unwrap())
            .unwrap();
        store.delete(&PromptId::parse("b").unwrap()).unwrap();
        store.bulk_upsert(&[prompt("c", 2), prompt("d", 3)]).unwrap();

        assert_eq!(events.try_recv().unwrap(), StoreEvent::Upserted(p.id.clone()));
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::Rekeyed {
                from: p.id,
                to: PromptId::parse("b").unwrap()
            }
        );
        assert_eq!(
            events.try_recv().unwrap(),
            StoreEvent::Deleted(PromptId::parse("b").unwrap())
        );
        assert_eq!(events.try_recv().unwrap(), StoreEvent::BulkUpserted(2));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn noop_writes_do_not_emit() {
        let store = LocalStore::open_in_memory().unwrap();
        let mut events = store.subscribe();

        assert!(!store.delete(&PromptId::parse("missing").unwrap()).unwrap());
        assert!(store
            .rekey(
                &PromptId::parse("missing").unwrap(),
                &PromptId::parse("other").unwrap()
            )
            .unwrap()
            .is_none());
        assert_eq!(store.bulk_upsert(&[]).unwrap(), 0);

        assert!(events.try_recv().is_err());
    }

    #[test]
    fn modify_returns_before_and_after() {
        let store = LocalStore::open_in_memory().unwrap();
        let p = prompt("a", 1);
        store.upsert(&p).unwrap();

        let (before, after) = store
            .modify(&p.id, |prompt| {
                prompt.name = "changed".to_string();
                prompt.updated_at = 99;
            })
            .unwrap()
            .unwrap();

        assert_eq!(before, p);
        assert_eq!(after.name, "changed");
        assert_eq!(store.get(&p.id).unwrap(), Some(after));
        assert!(store
            .modify(&PromptId::parse("missing").unwrap(), |_| {})
            .unwrap()
            .is_none());
    }

    #[test]
    fn file_backed_store_persists_across_reopen() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("prompts.db");

        let store = LocalStore::open_path(&path).unwrap();
        store.upsert(&prompt("persisted", 5)).unwrap();
        drop(store);

        let reopened = LocalStore::open_path(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }
}
