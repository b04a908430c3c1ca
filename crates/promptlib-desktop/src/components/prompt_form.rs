//! Create/edit form for a single prompt

use dioxus::prelude::*;
use tokio::sync::broadcast::error::RecvError;

use promptlib_core::store::StoreEvent;
use promptlib_core::Prompt;

use crate::state::{AppState, FormTarget};
use crate::theme::PALETTE;

#[component]
pub fn PromptForm() -> Element {
    let mut state = use_context::<AppState>();
    let colors = PALETTE;

    let mut name = use_signal(String::new);
    let mut text = use_signal(String::new);
    let mut loaded_target = use_signal(|| FormTarget::Closed);

    // Keep editing the same prompt when the server assigns its id
    use_future(move || async move {
        let Some(library) = state.library.peek().clone() else {
            return;
        };
        let mut events = library.store().subscribe();
        loop {
            match events.recv().await {
                Ok(StoreEvent::Rekeyed { from, to }) => {
                    let next = state.form.peek().after_rekey(&from, &to);
                    if let Some(next) = next {
                        tracing::debug!("Form now editing {to} (was {from})");
                        loaded_target.set(next.clone());
                        state.form.set(next);
                    }
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            }
        }
    });

    // Load field values when the form switches to another prompt
    use_effect(move || {
        let target = (state.form)();
        if target == *loaded_target.peek() {
            return;
        }
        let (initial_name, initial_text) = match state.editing_prompt() {
            Some(prompt) => (prompt.name, prompt.text),
            None => (String::new(), String::new()),
        };
        name.set(initial_name);
        text.set(initial_text);
        loaded_target.set(target);
    });

    let mut save = move || {
        let new_name = name.read().trim().to_string();
        let new_text = text.read().trim().to_string();
        if new_name.is_empty() || new_text.is_empty() {
            state
                .error
                .set(Some("A prompt needs both a name and text".to_string()));
            return;
        }

        let library = state.library.read().clone();
        let Some(library) = library else {
            return;
        };
        let result = match (state.form)() {
            FormTarget::New => library.collection().insert(Prompt::new(new_name, new_text)),
            FormTarget::Existing(id) => library.collection().update(&id, |draft| {
                draft.name = new_name;
                draft.text = new_text;
            }),
            FormTarget::Closed => return,
        };

        match result {
            Ok(pending) => {
                tracing::debug!("Saved prompt {}", pending.key());
                state.track(pending);
                state.form.set(FormTarget::Closed);
            }
            Err(e) => {
                tracing::error!("Failed to save prompt: {e}");
                state.error.set(Some(e.to_string()));
            }
        }
    };

    let title = if (state.form)() == FormTarget::New {
        "New prompt"
    } else {
        "Edit prompt"
    };

    rsx! {
        div {
            class: "prompt-form",
            style: "
                width: 420px;
                display: flex;
                flex-direction: column;
                gap: 8px;
                padding: 16px;
                border-left: 1px solid {colors.border};
                background: {colors.bg_secondary};
            ",

            h2 { style: "font-size: 15px; margin: 0 0 8px 0;", "{title}" }

            input {
                r#type: "text",
                placeholder: "Name",
                value: "{name}",
                oninput: move |evt| name.set(evt.value()),
                style: "
                    padding: 8px 12px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    background: {colors.bg_primary};
                    color: {colors.text_primary};
                ",
            }

            textarea {
                placeholder: "Prompt text",
                value: "{text}",
                oninput: move |evt| text.set(evt.value()),
                style: "
                    flex: 1;
                    min-height: 240px;
                    padding: 8px 12px;
                    border: 1px solid {colors.border};
                    border-radius: 6px;
                    font-family: ui-monospace, monospace;
                    background: {colors.bg_primary};
                    color: {colors.text_primary};
                    resize: vertical;
                ",
            }

            div {
                style: "display: flex; gap: 8px; justify-content: flex-end;",
                button {
                    onclick: move |_| state.form.set(FormTarget::Closed),
                    "Cancel"
                }
                button {
                    style: "
                        background: {colors.accent};
                        color: {colors.accent_text};
                        border: none;
                        border-radius: 6px;
                        padding: 6px 12px;
                    ",
                    onclick: move |_| save(),
                    "Save"
                }
            }
        }
    }
}
