use std::env;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use promptlib_core::collection::{MutationStatus, PendingMutation};
use promptlib_core::config::LibraryConfig;
use promptlib_core::store::LocalStore;
use promptlib_core::{Prompt, PromptId, PromptLibrary};
use serde::Serialize;

use crate::error::CliError;

const SHORT_ID_LEN: usize = 13;

#[derive(Debug, Serialize)]
pub struct PromptListItem {
    pub id: String,
    pub name: String,
    pub preview: String,
    pub text: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub relative_time: String,
}

pub async fn open_library(cli_db_path: Option<PathBuf>) -> Result<PromptLibrary, CliError> {
    let mut config = LibraryConfig::from_env()?;
    if let Some(db_path) = cli_db_path {
        config.db_path = db_path;
    }
    Ok(PromptLibrary::open(&config).await?)
}

/// Wait for the remote phase so the process does not exit mid-request.
///
/// Returns the identifier the prompt ended up with. A remote failure only
/// produces a warning because the local write already happened.
pub async fn finish_mutation(pending: PendingMutation) -> PromptId {
    let local_key = pending.key().clone();
    let pending_kind = pending.kind();
    match pending.settle().await {
        MutationStatus::Confirmed { key } => {
            tracing::debug!(local = %local_key, remote = %key, "Remote {pending_kind} confirmed");
            key
        }
        MutationStatus::LocalOnly => local_key,
        MutationStatus::Failed { error } => {
            tracing::warn!(id = %local_key, "Saved locally, but the remote {pending_kind} failed: {error}");
            local_key
        }
    }
}

pub fn resolve_prompt(query: &str, store: &LocalStore) -> Result<Prompt, CliError> {
    if let Ok(id) = query.parse::<PromptId>() {
        if let Some(prompt) = store.get(&id)? {
            return Ok(prompt);
        }
    }

    let matching_ids = store.ids_with_prefix(query, 3)?;

    match matching_ids.as_slice() {
        [] => Err(CliError::PromptNotFound(query.to_string())),
        [id] => store
            .get(id)?
            .ok_or_else(|| CliError::PromptNotFound(query.to_string())),
        _ => {
            let options = matching_ids
                .iter()
                .map(|id| short_id(id))
                .collect::<Vec<_>>()
                .join(", ");

            Err(CliError::AmbiguousPromptId(format!(
                "ID prefix '{query}' is ambiguous; matches: {options}"
            )))
        }
    }
}

pub fn short_id(id: &PromptId) -> String {
    id.as_str().chars().take(SHORT_ID_LEN).collect()
}

pub fn format_prompt_lines(prompts: &[Prompt]) -> Vec<String> {
    let now_ms = Utc::now().timestamp_millis();
    prompts
        .iter()
        .map(|prompt| {
            let id = short_id(&prompt.id);
            let name = truncate_chars(&collapse_whitespace(&prompt.name), 24);
            let preview = text_preview(&prompt.text, 40);
            let relative_time = format_relative_time(prompt.updated_at, now_ms);
            format!("{id:<13}  {name:<24}  {preview:<40}  {relative_time}")
        })
        .collect()
}

pub fn prompt_to_list_item(prompt: &Prompt) -> PromptListItem {
    let now_ms = Utc::now().timestamp_millis();
    PromptListItem {
        id: prompt.id.to_string(),
        name: prompt.name.clone(),
        preview: text_preview(&prompt.text, 80),
        text: prompt.text.clone(),
        created_at: prompt.created_at,
        updated_at: prompt.updated_at,
        relative_time: format_relative_time(prompt.updated_at, now_ms),
    }
}

pub fn print_prompts(prompts: &[Prompt], as_json: bool) -> Result<(), CliError> {
    if as_json {
        let items = prompts
            .iter()
            .map(prompt_to_list_item)
            .collect::<Vec<PromptListItem>>();
        println!("{}", serde_json::to_string_pretty(&items)?);
    } else if prompts.is_empty() {
        println!("No prompts found.");
    } else {
        for line in format_prompt_lines(prompts) {
            println!("{line}");
        }
    }
    Ok(())
}

fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        value.to_string()
    } else {
        let mut truncated = value
            .chars()
            .take(max_chars.saturating_sub(3))
            .collect::<String>();
        truncated.push_str("...");
        truncated
    }
}

/// First line of `text`, whitespace-collapsed and cut to `max_chars`.
pub fn text_preview(text: &str, max_chars: usize) -> String {
    let first_line = text.lines().next().unwrap_or("").trim();
    truncate_chars(&collapse_whitespace(first_line), max_chars)
}

pub fn format_relative_time(timestamp_ms: i64, now_ms: i64) -> String {
    let diff = now_ms.saturating_sub(timestamp_ms);
    let minute = 60_000;
    let hour = 60 * minute;
    let day = 24 * hour;
    let week = 7 * day;
    let month = 30 * day;
    let year = 365 * day;

    if diff < minute {
        "just now".to_string()
    } else if diff < hour {
        format!("{}m ago", diff / minute)
    } else if diff < day {
        format!("{}h ago", diff / hour)
    } else if diff < week {
        format!("{}d ago", diff / day)
    } else if diff < month {
        format!("{}w ago", diff / week)
    } else if diff < year {
        format!("{}mo ago", diff / month)
    } else {
        format!("{}y ago", diff / year)
    }
}

/// Prompt text from arguments, then piped stdin, then `$EDITOR`.
pub fn resolve_prompt_text(text_parts: &[String]) -> Result<String, CliError> {
    if let Some(text) = normalize_content(&text_parts.join(" ")) {
        return Ok(text);
    }

    if let Some(text) = read_piped_stdin()? {
        return Ok(text);
    }

    if let Some(text) = capture_editor_input_with_initial("")? {
        return Ok(text);
    }

    Err(CliError::EmptyText)
}

pub fn normalize_content(content: &str) -> Option<String> {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub fn normalize_name(name: &str) -> Result<String, CliError> {
    normalize_content(name).ok_or(CliError::EmptyName)
}

pub fn normalize_search_query(query: &str) -> Result<String, CliError> {
    normalize_content(query).ok_or(CliError::EmptySearchQuery)
}

pub fn normalize_prompt_identifier(id: &str) -> Result<String, CliError> {
    normalize_content(id).ok_or(CliError::EmptyPromptId)
}

pub fn read_piped_stdin() -> Result<Option<String>, CliError> {
    let stdin = io::stdin();
    if stdin.is_terminal() {
        return Ok(None);
    }

    let mut buffer = String::new();
    stdin.lock().read_to_string(&mut buffer)?;
    Ok(normalize_content(&buffer))
}

pub fn capture_editor_input_with_initial(
    initial_content: &str,
) -> Result<Option<String>, CliError> {
    let editor = preferred_editor();
    let temp_file = create_temp_prompt_file_path();
    std::fs::write(&temp_file, initial_content)?;

    let launch_result = launch_editor(&editor, &temp_file);
    let content = std::fs::read_to_string(&temp_file)?;
    let _ = std::fs::remove_file(&temp_file);

    launch_result?;
    Ok(normalize_content(&content))
}

pub fn launch_editor(editor: &str, file_path: &Path) -> Result<(), CliError> {
    let status = match Command::new(editor).arg(file_path).status() {
        Ok(status) => status,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            // EDITOR may carry arguments, e.g. "code --wait".
            let mut parts = editor.split_whitespace();
            let Some(program) = parts.next() else {
                return Err(CliError::EditorFailed("empty EDITOR command".into()));
            };
            Command::new(program).args(parts).arg(file_path).status()?
        }
        Err(err) => return Err(CliError::Io(err)),
    };

    if status.success() {
        Ok(())
    } else {
        Err(CliError::EditorFailed(format!(
            "`{editor}` exited with status {status}"
        )))
    }
}

pub fn preferred_editor() -> String {
    env::var("VISUAL")
        .or_else(|_| env::var("EDITOR"))
        .unwrap_or_else(|_| default_editor().to_string())
}

pub const fn default_editor() -> &'static str {
    if cfg!(windows) {
        "notepad"
    } else {
        "vi"
    }
}

fn create_temp_prompt_file_path() -> PathBuf {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_nanos());
    env::temp_dir().join(format!("promptlib-{}-{now}.txt", std::process::id()))
}
