use promptlib_core::sync::SyncOutcome;
use promptlib_core::PromptLibrary;

use crate::error::CliError;

pub async fn run_sync(library: &PromptLibrary) -> Result<(), CliError> {
    match library.bootstrapper().sync_from_server().await {
        SyncOutcome::Synced { count } => {
            println!("Synced {count} prompts");
            Ok(())
        }
        SyncOutcome::Failed { reason } => Err(CliError::SyncFailed(reason)),
        SyncOutcome::Skipped => Err(CliError::SyncNotConfigured),
    }
}
