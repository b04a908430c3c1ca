//! Prompt list component

use dioxus::prelude::*;

use super::PromptCard;
use crate::state::{AppState, FormTarget};
use crate::theme::PALETTE;

/// Prompts matching the current search, newest first
#[component]
pub fn PromptList() -> Element {
    let mut state = use_context::<AppState>();
    let prompts = (state.prompts)();
    let selected = (state.form)();
    let searching = !state.search_query.read().trim().is_empty();
    let colors = PALETTE;

    rsx! {
        div {
            class: "prompt-list",
            style: "
                flex: 1;
                overflow-y: auto;
                background: {colors.bg_primary};
            ",

            if prompts.is_empty() {
                div {
                    style: "
                        padding: 20px;
                        text-align: center;
                        color: {colors.text_muted};
                    ",
                    if searching { "No prompts match your search" } else { "No prompts yet" }
                }
            } else {
                for prompt in prompts {
                    {
                        let id = prompt.id.clone();
                        let delete_id = prompt.id.clone();
                        let is_selected = selected == FormTarget::Existing(prompt.id.clone());
                        let preview = prompt.text_preview(80);

                        rsx! {
                            PromptCard {
                                key: "{prompt.id}",
                                name: prompt.name.clone(),
                                preview,
                                updated_at: prompt.updated_at,
                                is_selected,
                                onselect: move |()| state.form.set(FormTarget::Existing(id.clone())),
                                ondelete: move |()| {
                                    let library = state.library.read().clone();
                                    let Some(library) = library else {
                                        return;
                                    };
                                    match library.collection().delete(&delete_id) {
                                        Ok(pending) => {
                                            if (state.form)() == FormTarget::Existing(delete_id.clone()) {
                                                state.form.set(FormTarget::Closed);
                                            }
                                            state.track(pending);
                                        }
                                        Err(e) => {
                                            tracing::error!("Failed to delete prompt: {e}");
                                            state.error.set(Some(e.to_string()));
                                        }
                                    }
                                },
                            }
                        }
                    }
                }
            }
        }
    }
}
