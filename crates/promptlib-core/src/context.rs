//! Process-wide handle to the prompt library.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::collection::MutationCollection;
use crate::config::LibraryConfig;
use crate::error::Result;
use crate::query::LiveQuery;
use crate::remote::{HttpRecordApi, RecordApi};
use crate::store::LocalStore;
use crate::sync::{SyncBootstrapper, SyncOutcome};

/// Owns the local store, the optional remote client and the mutation
/// collection. Build one per process and clone it where needed.
#[derive(Clone)]
pub struct PromptLibrary {
    store: LocalStore,
    remote: Option<Arc<dyn RecordApi>>,
    collection: MutationCollection,
}

impl PromptLibrary {
    /// Open the library described by `config`.
    ///
    /// Remote phases of mutations run on the runtime this is awaited on.
    pub async fn open(config: &LibraryConfig) -> Result<Self> {
        let store = LocalStore::open_path(&config.db_path)?;
        let remote = match &config.remote {
            Some(remote_config) => {
                tracing::info!("Remote record API: {}", remote_config.collection_url());
                let api: Arc<dyn RecordApi> = Arc::new(HttpRecordApi::new(remote_config)?);
                Some(api)
            }
            None => {
                tracing::info!("Running in local-only mode (no remote configured)");
                None
            }
        };

        Ok(Self::from_parts(store, remote, Handle::current()))
    }

    /// Assemble a library from already-built parts.
    pub fn from_parts(
        store: LocalStore,
        remote: Option<Arc<dyn RecordApi>>,
        runtime: Handle,
    ) -> Self {
        let collection = MutationCollection::new(store.clone(), remote.clone(), runtime);
        Self {
            store,
            remote,
            collection,
        }
    }

    pub const fn store(&self) -> &LocalStore {
        &self.store
    }

    pub const fn collection(&self) -> &MutationCollection {
        &self.collection
    }

    pub const fn is_remote(&self) -> bool {
        self.remote.is_some()
    }

    /// A live query filtered by `term`.
    pub fn live_query(&self, term: impl Into<String>) -> LiveQuery {
        LiveQuery::new(self.store.clone(), term)
    }

    pub fn bootstrapper(&self) -> SyncBootstrapper {
        SyncBootstrapper::new(self.store.clone(), self.remote.clone())
    }

    /// Start the startup sync in the background.
    pub fn spawn_sync(&self) -> JoinHandle<SyncOutcome> {
        self.bootstrapper().spawn()
    }
}
