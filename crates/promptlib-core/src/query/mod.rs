//! Live, filtered views over the local store.

use tokio::sync::{broadcast, watch};

use crate::error::Result;
use crate::models::Prompt;
use crate::store::{LocalStore, StoreEvent, WeakLocalStore};

/// Keep prompts whose name or text contains `term` (trimmed, case
/// insensitive), newest `updated_at` first with ties ordered by id.
///
/// A blank term keeps everything.
pub fn filter_prompts(mut prompts: Vec<Prompt>, term: &str) -> Vec<Prompt> {
    let needle = term.trim().to_lowercase();
    prompts.retain(|prompt| prompt.matches_lowercase(&needle));
    prompts.sort_by(|a, b| {
        b.updated_at
            .cmp(&a.updated_at)
            .then_with(|| a.id.cmp(&b.id))
    });
    prompts
}

/// A search term bound to a [`LocalStore`].
pub struct LiveQuery {
    store: LocalStore,
    filter: watch::Sender<String>,
}

impl LiveQuery {
    pub fn new(store: LocalStore, term: impl Into<String>) -> Self {
        let (filter, _) = watch::channel(term.into());
        Self { store, filter }
    }

    /// Current search term
    pub fn filter(&self) -> String {
        self.filter.borrow().clone()
    }

    /// Replace the search term. Subscribers are woken only if it changed.
    pub fn set_filter(&self, term: impl Into<String>) {
        let term = term.into();
        self.filter.send_if_modified(|current| {
            if *current == term {
                false
            } else {
                *current = term;
                true
            }
        });
    }

    /// Snapshot of the matching prompts.
    pub fn results(&self) -> Result<Vec<Prompt>> {
        let prompts = self.store.list_all()?;
        Ok(filter_prompts(prompts, &self.filter.borrow()))
    }

    /// Stream of result sets, starting with the current one.
    pub fn subscribe(&self) -> QuerySubscription {
        QuerySubscription {
            store: self.store.downgrade(),
            events: self.store.subscribe(),
            filter: self.filter.subscribe(),
            filter_open: true,
            primed: false,
        }
    }
}

/// Receiver side of a [`LiveQuery`].
///
/// The subscription does not keep the store alive.
pub struct QuerySubscription {
    store: WeakLocalStore,
    events: broadcast::Receiver<StoreEvent>,
    filter: watch::Receiver<String>,
    filter_open: bool,
    primed: bool,
}

impl QuerySubscription {
    /// Wait for the next result set.
    ///
    /// The first call returns immediately. Later calls wait for a store
    /// change or a filter change; a burst of store events yields one result
    /// set. Returns `None` once the store has been dropped.
    pub async fn next(&mut self) -> Option<Result<Vec<Prompt>>> {
        if self.primed {
            self.wait_for_change().await?;
        }
        self.primed = true;

        let term = self.filter.borrow_and_update().clone();
        let prompts = match self.store.list_all()? {
            Ok(prompts) => prompts,
            Err(error) => return Some(Err(error)),
        };
        Some(Ok(filter_prompts(prompts, &term)))
    }

    async fn wait_for_change(&mut self) -> Option<()> {
        loop {
            let filter_open = self.filter_open;
            let wake = tokio::select! {
                event = self.events.recv() => Wake::Store(event),
                changed = self.filter.changed(), if filter_open => Wake::Filter(changed.is_ok()),
            };

            match wake {
                Wake::Store(Ok(_) | Err(broadcast::error::RecvError::Lagged(_))) => {
                    self.drain_events();
                    return Some(());
                }
                Wake::Store(Err(broadcast::error::RecvError::Closed)) => return None,
                Wake::Filter(true) => return Some(()),
                // The LiveQuery is gone; keep following store events.
                Wake::Filter(false) => self.filter_open = false,
            }
        }
    }

    fn drain_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
    }
}

enum Wake {
    Store(std::result::Result<StoreEvent, broadcast::error::RecvError>),
    Filter(bool),
}
