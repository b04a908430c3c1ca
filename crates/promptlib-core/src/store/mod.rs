//! Local store for Prompt Library
//!
//! A SQLite table keyed by prompt id, wrapped by [`LocalStore`] which
//! serializes access and broadcasts a [`StoreEvent`] after every committed
//! write.

mod connection;
mod migrations;
mod repository;
mod service;

pub use connection::Database;
pub use repository::{PromptRepository, SqlitePromptRepository};
pub use service::{LocalStore, StoreEvent};
pub(crate) use service::WeakLocalStore;
