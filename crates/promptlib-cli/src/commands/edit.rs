use promptlib_core::PromptLibrary;

use crate::commands::common::{
    capture_editor_input_with_initial, finish_mutation, normalize_content, normalize_name,
    normalize_prompt_identifier, resolve_prompt,
};
use crate::error::CliError;

pub async fn run_edit(
    library: &PromptLibrary,
    id: &str,
    name: Option<&str>,
    text: Option<&str>,
) -> Result<(), CliError> {
    let normalized_id = normalize_prompt_identifier(id)?;
    let prompt = resolve_prompt(&normalized_id, library.store())?;

    let new_name = name.map(normalize_name).transpose()?;
    let new_text = match (name, text) {
        (_, Some(text)) => Some(normalize_content(text).ok_or(CliError::EmptyText)?),
        (None, None) => Some(
            capture_editor_input_with_initial(&prompt.text)?.ok_or(CliError::EmptyText)?,
        ),
        (Some(_), None) => None,
    };

    let unchanged = new_name.as_ref().is_none_or(|name| *name == prompt.name)
        && new_text.as_ref().is_none_or(|text| *text == prompt.text);
    if unchanged {
        println!("{}", prompt.id);
        return Ok(());
    }

    let pending = library.collection().update(&prompt.id, |draft| {
        if let Some(name) = new_name {
            draft.name = name;
        }
        if let Some(text) = new_text {
            draft.text = text;
        }
    })?;
    let id = finish_mutation(pending).await;

    println!("{id}");
    Ok(())
}
