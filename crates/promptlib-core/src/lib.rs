//! promptlib-core - Core library for Prompt Library
//!
//! This crate contains the prompt model, the local SQLite store, the remote
//! record API client, and the local-first layer built on top of them: the
//! optimistic mutation collection, the startup sync bootstrapper and live
//! queries. Desktop and CLI front ends share it through [`PromptLibrary`].

pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod query;
pub mod remote;
pub mod store;
pub mod sync;
pub mod util;

pub use context::PromptLibrary;
pub use error::{Error, Result};
pub use models::{Prompt, PromptDraft, PromptId};
