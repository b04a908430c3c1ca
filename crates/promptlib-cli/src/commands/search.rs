use promptlib_core::PromptLibrary;

use crate::commands::common::{normalize_search_query, print_prompts};
use crate::error::CliError;

pub fn run_search(
    library: &PromptLibrary,
    query: &str,
    limit: usize,
    as_json: bool,
) -> Result<(), CliError> {
    let normalized_query = normalize_search_query(query)?;
    let mut prompts = library.live_query(normalized_query).results()?;
    prompts.truncate(limit);
    print_prompts(&prompts, as_json)
}
