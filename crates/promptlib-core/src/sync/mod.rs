//! Startup pull of the remote collection into the local store.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::remote::RecordApi;
use crate::store::LocalStore;
use crate::util::unix_millis_now;

/// Result of one [`SyncBootstrapper::sync_from_server`] run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// `count` remote records were upserted
    Synced { count: usize },
    /// The pull failed; the local store is unchanged
    Failed { reason: String },
    /// No remote store is configured
    Skipped,
}

/// Pulls the full remote collection and upserts it locally.
///
/// Rows missing from the remote response are never deleted, so prompts
/// created offline survive a sync.
#[derive(Clone)]
pub struct SyncBootstrapper {
    store: LocalStore,
    remote: Option<Arc<dyn RecordApi>>,
}

impl SyncBootstrapper {
    pub fn new(store: LocalStore, remote: Option<Arc<dyn RecordApi>>) -> Self {
        Self { store, remote }
    }

    /// Run one sync. Failures are logged and reported, never returned.
    pub async fn sync_from_server(&self) -> SyncOutcome {
        let Some(remote) = &self.remote else {
            tracing::debug!("Skipping sync, no remote configured");
            return SyncOutcome::Skipped;
        };

        let records = match remote.list().await {
            Ok(records) => records,
            Err(error) => {
                tracing::warn!("Sync failed to fetch prompts: {error}");
                return SyncOutcome::Failed {
                    reason: error.to_string(),
                };
            }
        };

        let now = unix_millis_now();
        let prompts: Vec<_> = records
            .into_iter()
            .map(|record| record.into_prompt(now))
            .collect();

        match self.store.bulk_upsert(&prompts) {
            Ok(count) => {
                tracing::info!(count, "Synced {count} prompts");
                SyncOutcome::Synced { count }
            }
            Err(error) => {
                tracing::warn!("Sync failed to store prompts: {error}");
                SyncOutcome::Failed {
                    reason: error.to_string(),
                }
            }
        }
    }

    /// Run [`Self::sync_from_server`] in the background.
    pub fn spawn(self) -> JoinHandle<SyncOutcome> {
        tokio::spawn(async move { self.sync_from_server().await })
    }
}
