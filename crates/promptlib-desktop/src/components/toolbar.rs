//! Toolbar with the "new prompt" action and sync status

use dioxus::prelude::*;

use crate::state::{AppState, FormTarget};
use crate::theme::PALETTE;

#[component]
pub fn Toolbar() -> Element {
    let mut state = use_context::<AppState>();
    let colors = PALETTE;
    let status = (state.sync_status)().label();
    let pending = (state.pending_remote)();
    let ready = state.library.read().is_some();

    rsx! {
        div {
            class: "toolbar",
            style: "
                display: flex;
                align-items: center;
                gap: 12px;
                padding: 10px 16px;
                border-bottom: 1px solid {colors.border};
                background: {colors.bg_secondary};
            ",

            h1 {
                style: "font-size: 16px; font-weight: 600; margin: 0; flex: 1;",
                "Prompt Library"
            }

            span {
                class: "sync-status",
                style: "font-size: 12px; color: {colors.text_secondary};",
                "{status}"
                if pending > 0 {
                    " · saving {pending}"
                }
            }

            button {
                disabled: !ready,
                style: "
                    padding: 6px 12px;
                    border: none;
                    border-radius: 6px;
                    background: {colors.accent};
                    color: {colors.accent_text};
                    cursor: pointer;
                ",
                onclick: move |_| state.form.set(FormTarget::New),
                "New prompt"
            }
        }
    }
}
