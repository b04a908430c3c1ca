//! Search input component

use std::time::Duration;

use dioxus::prelude::*;

use crate::state::AppState;
use crate::theme::PALETTE;

/// Keystrokes are applied to the live query after this much idle time
const SEARCH_DEBOUNCE_MS: u64 = 200;

/// Search box filtering the prompt list by name or text
#[component]
pub fn SearchInput() -> Element {
    let mut state = use_context::<AppState>();
    let colors = PALETTE;
    let mut input_version = use_signal(|| 0u64);

    rsx! {
        div {
            class: "search-input",
            style: "
                padding: 12px 16px;
                border-bottom: 1px solid {colors.border};
                background: {colors.bg_secondary};
            ",

            input {
                r#type: "search",
                placeholder: "Search prompts...",
                value: "{state.search_query}",
                oninput: move |evt| {
                    let term = evt.value();
                    state.search_query.set(term.clone());

                    let version = input_version() + 1;
                    input_version.set(version);
                    spawn(async move {
                        tokio::time::sleep(Duration::from_millis(SEARCH_DEBOUNCE_MS)).await;
                        // A newer keystroke supersedes this one.
                        if input_version() != version {
                            return;
                        }
                        if let Some(query) = state.query.read().as_ref() {
                            query.set_filter(term);
                        }
                    });
                },
                style: "
                    width: 100%;
                    box-sizing: border-box;
                    padding: 8px 12px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    font-size: 14px;
                    background: {colors.bg_primary};
                    color: {colors.text_primary};
                    outline: none;
                ",
            }
        }
    }
}
