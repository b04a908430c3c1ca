//! Prompt Library CLI - manage reusable prompts from the terminal
//!
//! Shares the local store and remote sync with the desktop app.

mod cli;
mod commands;
mod error;


use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::common::open_library;
use crate::commands::delete::run_delete;
use crate::commands::edit::run_edit;
use crate::commands::list::run_list;
use crate::commands::search::run_search;
use crate::commands::sync::run_sync;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["promptlib=info", "promptlib_core=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let library = open_library(cli.db_path).await?;

    match cli.command {
        Commands::Add { name, text } => run_add(&library, &name, &text).await?,
        Commands::List { limit, json } => run_list(&library, limit, json)?,
        Commands::Search { query, limit, json } => {
            run_search(&library, &query, limit, json)?;
        }
        Commands::Edit { id, name, text } => {
            run_edit(&library, &id, name.as_deref(), text.as_deref()).await?;
        }
        Commands::Delete { id } => run_delete(&library, &id).await?,
        Commands::Sync => run_sync(&library).await?,
    }

    Ok(())
}
