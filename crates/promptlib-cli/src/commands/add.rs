use promptlib_core::{Prompt, PromptLibrary};

use crate::commands::common::{finish_mutation, normalize_name, resolve_prompt_text};
use crate::error::CliError;

pub async fn run_add(
    library: &PromptLibrary,
    name: &str,
    text_parts: &[String],
) -> Result<(), CliError> {
    let name = normalize_name(name)?;
    let text = resolve_prompt_text(text_parts)?;

    let pending = library.collection().insert(Prompt::new(name, text))?;
    let id = finish_mutation(pending).await;

    println!("{id}");
    Ok(())
}
