//! Prompt Library Desktop Application
//!
//! Search, create, edit and delete prompts. Reads and writes go to the local
//! store; the remote record API is synced in the background.

#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

mod app;
mod components;
mod state;
mod theme;

use dioxus::desktop::{Config, WindowBuilder};

fn main() {
    dotenvy::dotenv().ok();

    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    for directive in ["promptlib_desktop=debug", "promptlib_core=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Prompt Library...");

    let config = Config::new().with_window(
        WindowBuilder::new()
            .with_title("Prompt Library")
            .with_resizable(true),
    );

    dioxus::LaunchBuilder::new()
        .with_cfg(config)
        .launch(app::App);
}
