use promptlib_core::PromptLibrary;

use crate::commands::common::print_prompts;
use crate::error::CliError;

pub fn run_list(library: &PromptLibrary, limit: usize, as_json: bool) -> Result<(), CliError> {
    let mut prompts = library.store().list_all()?;
    prompts.truncate(limit);
    print_prompts(&prompts, as_json)
}
