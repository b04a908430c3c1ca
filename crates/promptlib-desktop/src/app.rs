//! Main application component

use std::sync::Arc;

use dioxus::prelude::*;

use promptlib_core::config::LibraryConfig;
use promptlib_core::PromptLibrary;

use crate::components::{PromptForm, PromptList, SearchInput, Toolbar};
use crate::state::{AppState, FormTarget, SyncStatus};
use crate::theme::PALETTE;

/// Root application component
#[component]
pub fn App() -> Element {
    let mut library = use_signal(|| None::<PromptLibrary>);
    let mut query = use_signal(|| None);
    let mut prompts = use_signal(Vec::new);
    let search_query = use_signal(String::new);
    let form = use_signal(|| FormTarget::Closed);
    let mut sync_status = use_signal(|| SyncStatus::Starting);
    let pending_remote = use_signal(|| 0usize);
    let mut error = use_signal(|| None::<String>);

    // Open the library, start the background sync, then keep the prompt
    // list fed from the live query for the lifetime of the window.
    use_future(move || async move {
        let opened = match LibraryConfig::from_env() {
            Ok(config) => PromptLibrary::open(&config).await,
            Err(config_error) => Err(config_error.into()),
        };
        let opened = match opened {
            Ok(opened) => opened,
            Err(open_error) => {
                tracing::error!("Failed to open prompt library: {open_error}");
                error.set(Some(open_error.to_string()));
                sync_status.set(SyncStatus::Failed(open_error.to_string()));
                return;
            }
        };

        let live_query = Arc::new(opened.live_query(search_query.peek().clone()));
        let mut results = live_query.subscribe();
        query.set(Some(live_query));

        if opened.is_remote() {
            sync_status.set(SyncStatus::Syncing);
            let sync = opened.spawn_sync();
            spawn(async move {
                match sync.await {
                    Ok(outcome) => sync_status.set(outcome.into()),
                    Err(join_error) => {
                        sync_status.set(SyncStatus::Failed(join_error.to_string()));
                    }
                }
            });
        } else {
            sync_status.set(SyncStatus::LocalOnly);
        }
        library.set(Some(opened));

        while let Some(result) = results.next().await {
            match result {
                Ok(next) => {
                    tracing::debug!("Prompt list refreshed ({} prompts)", next.len());
                    prompts.set(next);
                }
                Err(query_error) => {
                    tracing::error!("Failed to read prompts: {query_error}");
                    error.set(Some(query_error.to_string()));
                }
            }
        }
    });

    use_context_provider(|| AppState {
        library,
        query,
        prompts,
        search_query,
        form,
        sync_status,
        pending_remote,
        error,
    });

    let colors = PALETTE;

    rsx! {
        div {
            class: "app-container",
            style: "
                min-height: 100vh;
                display: flex;
                flex-direction: column;
                font-family: system-ui, -apple-system, sans-serif;
                font-size: 14px;
                background: {colors.bg_primary};
                color: {colors.text_primary};
            ",

            Toolbar {}
            SearchInput {}

            if let Some(message) = error() {
                div {
                    class: "error-banner",
                    style: "
                        padding: 8px 16px;
                        color: {colors.error};
                        border-bottom: 1px solid {colors.border};
                        display: flex;
                        justify-content: space-between;
                    ",
                    span { "{message}" }
                    button {
                        onclick: move |_| error.set(None),
                        "Dismiss"
                    }
                }
            }

            div {
                class: "content-area",
                style: "flex: 1; display: flex; overflow: hidden;",

                PromptList {}

                if form() != FormTarget::Closed {
                    PromptForm {}
                }
            }
        }
    }
}
