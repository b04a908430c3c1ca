//! Data models for Prompt Library

mod prompt;

pub use prompt::{Prompt, PromptDraft, PromptId};
