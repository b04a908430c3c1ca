//! Remote record API client.
//!
//! [`RecordApi`] is the seam between the local-first layer and the backend
//! system of record. All values crossing it use local units (timestamps in
//! Unix milliseconds); implementations convert to whatever the wire wants.

mod http;
#[cfg(test)]
pub(crate) mod fake;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Prompt, PromptId};

pub use http::HttpRecordApi;

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("Invalid remote configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Remote request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{0}")]
    Api(String),
    #[error("Invalid remote payload: {0}")]
    InvalidPayload(String),
}

pub type RemoteResult<T> = Result<T, RemoteError>;

/// A record as returned by the remote `list` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePrompt {
    pub id: PromptId,
    pub name: String,
    pub text: String,
    /// Unix ms, if the server reported one
    pub created_at: Option<i64>,
    /// Unix ms, if the server reported one
    pub updated_at: Option<i64>,
}

impl RemotePrompt {
    /// Map to the local entity shape, filling missing timestamps with `now_ms`.
    #[must_use]
    pub fn into_prompt(self, now_ms: i64) -> Prompt {
        let created_at = self.created_at.unwrap_or(now_ms);
        Prompt {
            id: self.id,
            name: self.name,
            text: self.text,
            created_at,
            updated_at: self.updated_at.unwrap_or(created_at),
        }
    }
}

/// Fields sent to the remote `create` operation. The local id is withheld
/// because the server assigns its own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPrompt {
    pub name: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<&Prompt> for NewPrompt {
    fn from(prompt: &Prompt) -> Self {
        Self {
            name: prompt.name.clone(),
            text: prompt.text.clone(),
            created_at: prompt.created_at,
            updated_at: prompt.updated_at,
        }
    }
}

/// Partial update: only changed fields are `Some`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptPatch {
    pub name: Option<String>,
    pub text: Option<String>,
    pub updated_at: i64,
}

impl PromptPatch {
    /// Diff two versions of a prompt
    #[must_use]
    pub fn between(before: &Prompt, after: &Prompt) -> Self {
        Self {
            name: (before.name != after.name).then(|| after.name.clone()),
            text: (before.text != after.text).then(|| after.text.clone()),
            updated_at: after.updated_at,
        }
    }
}

/// Operations against one remote collection.
///
/// Each call is a single request/response round trip: no retries and no
/// pagination beyond the first page.
#[async_trait]
pub trait RecordApi: Send + Sync {
    /// Fetch the whole collection.
    async fn list(&self) -> RemoteResult<Vec<RemotePrompt>>;

    /// Create a record and return the identifier the server assigned.
    async fn create(&self, prompt: &NewPrompt) -> RemoteResult<PromptId>;

    /// Apply a partial update to the record `id`.
    async fn update(&self, id: &PromptId, patch: &PromptPatch) -> RemoteResult<()>;

    /// Delete the record `id`.
    async fn delete(&self, id: &PromptId) -> RemoteResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn patch_contains_only_changed_fields() {
        let before = Prompt::new("Name", "Text");
        let after = Prompt {
            text: "New text".to_string(),
            updated_at: before.updated_at + 5,
            ..before.clone()
        };

        let patch = PromptPatch::between(&before, &after);
        assert_eq!(
            patch,
            PromptPatch {
                name: None,
                text: Some("New text".to_string()),
                updated_at: after.updated_at,
            }
        );
    }

    #[test]
    fn remote_prompt_fills_missing_timestamps() {
        let remote = RemotePrompt {
            id: PromptId::parse("7").unwrap(),
            name: "n".to_string(),
            text: "t".to_string(),
            created_at: Some(1_000),
            updated_at: None,
        };
        let prompt = remote.into_prompt(5_000);
        assert_eq!(prompt.created_at, 1_000);
        assert_eq!(prompt.updated_at, 1_000);

        let remote = RemotePrompt {
            id: PromptId::parse("8").unwrap(),
            name: "n".to_string(),
            text: "t".to_string(),
            created_at: None,
            updated_at: None,
        };
        assert_eq!(remote.into_prompt(5_000).created_at, 5_000);
    }
}
