use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "promptlib")]
#[command(about = "Manage a library of reusable prompts")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Optional path to local database file
    #[arg(long, global = true, value_name = "PATH")]
    pub db_path: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new prompt
    #[command(alias = "new")]
    Add {
        /// Prompt name
        #[arg(short, long)]
        name: String,
        /// Prompt text (read from stdin or $EDITOR when omitted)
        text: Vec<String>,
    },
    /// List prompts, most recently updated first
    List {
        /// Number of prompts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Search prompt names and text
    Search {
        /// Search term (case-insensitive substring)
        query: String,
        /// Number of prompts to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Edit an existing prompt
    Edit {
        /// Prompt ID or unique ID prefix
        id: String,
        /// New name
        #[arg(short, long)]
        name: Option<String>,
        /// New text (opens $EDITOR when neither --name nor --text is given)
        #[arg(short, long)]
        text: Option<String>,
    },
    /// Delete a prompt
    Delete {
        /// Prompt ID or unique ID prefix
        id: String,
    },
    /// Pull all prompts from the remote record API
    Sync,
}
