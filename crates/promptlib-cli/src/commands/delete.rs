use promptlib_core::PromptLibrary;

use crate::commands::common::{finish_mutation, normalize_prompt_identifier, resolve_prompt};
use crate::error::CliError;

pub async fn run_delete(library: &PromptLibrary, id: &str) -> Result<(), CliError> {
    let normalized_id = normalize_prompt_identifier(id)?;
    let prompt = resolve_prompt(&normalized_id, library.store())?;

    let pending = library.collection().delete(&prompt.id)?;
    finish_mutation(pending).await;

    println!("{}", prompt.id);
    Ok(())
}
