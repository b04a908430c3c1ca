//! Prompt model

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::util::unix_millis_now;

/// Identifier of a prompt.
///
/// Freshly created prompts get a client-generated UUID v7. Once the remote
/// store has confirmed a create, the identifier is whatever the server
/// assigned, so no format beyond "non-empty" is assumed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PromptId(String);

impl PromptId {
    /// Generate a new client-side identifier
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Wrap an existing identifier, rejecting blank values
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidInput("prompt id cannot be empty".into()));
        }
        if trimmed.len() == value.len() {
            Ok(Self(value))
        } else {
            Ok(Self(trimmed.to_string()))
        }
    }

    /// Borrow the identifier as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PromptId {
    fn default() -> Self {
        Self::generate()
    }
}

impl fmt::Display for PromptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PromptId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl AsRef<str> for PromptId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// A prompt in the library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Unique identifier
    pub id: PromptId,
    /// Short display name
    pub name: String,
    /// Prompt body
    pub text: String,
    /// Creation timestamp (Unix ms)
    pub created_at: i64,
    /// Last update timestamp (Unix ms)
    pub updated_at: i64,
}

impl Prompt {
    /// Create a new prompt with a fresh client-side id
    #[must_use]
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        let now = unix_millis_now();
        Self {
            id: PromptId::generate(),
            name: name.into(),
            text: text.into(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Case-insensitive substring match against name or text.
    ///
    /// `needle` must already be lowercased.
    #[must_use]
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        needle.is_empty()
            || self.name.to_lowercase().contains(needle)
            || self.text.to_lowercase().contains(needle)
    }

    /// Get first line of the text, truncated to `max_len` characters
    #[must_use]
    pub fn text_preview(&self, max_len: usize) -> String {
        self.text
            .lines()
            .next()
            .unwrap_or("")
            .chars()
            .take(max_len)
            .collect()
    }

    /// Editable view of this prompt
    #[must_use]
    pub fn draft(&self) -> PromptDraft {
        PromptDraft {
            name: self.name.clone(),
            text: self.text.clone(),
        }
    }
}

/// The user-editable fields of a prompt, handed to update mutators.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PromptDraft {
    pub name: String,
    pub text: String,
}
