//! Prompt card component

use chrono::{DateTime, Utc};
use dioxus::prelude::*;

use crate::theme::PALETTE;

/// Two-click delete: the first click asks, the second deletes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(super) enum DeleteStep {
    Idle,
    Confirming,
}

impl DeleteStep {
    /// Next step after a click on the delete button, and whether to delete now
    pub(super) const fn click(self) -> (Self, bool) {
        match self {
            Self::Idle => (Self::Confirming, false),
            Self::Confirming => (Self::Idle, true),
        }
    }

    const fn label(self) -> &'static str {
        match self {
            Self::Idle => "Delete",
            Self::Confirming => "Confirm",
        }
    }
}

/// Relative age for the last week, a calendar date after that.
pub(super) fn format_updated_at(updated_at: i64, now: i64) -> String {
    let seconds = now.saturating_sub(updated_at).max(0) / 1_000;
    if seconds < 60 {
        return "just now".to_string();
    }
    if seconds < 60 * 60 {
        return format!("{}m ago", seconds / 60);
    }
    if seconds < 24 * 60 * 60 {
        return format!("{}h ago", seconds / (60 * 60));
    }
    if seconds < 7 * 24 * 60 * 60 {
        return format!("{}d ago", seconds / (24 * 60 * 60));
    }
    DateTime::<Utc>::from_timestamp_millis(updated_at).map_or_else(
        || "unknown".to_string(),
        |date| date.format("%b %-d, %Y").to_string(),
    )
}

/// A single prompt row rendered in the prompt list.
#[component]
pub fn PromptCard(
    name: String,
    preview: String,
    updated_at: i64,
    is_selected: bool,
    onselect: EventHandler<()>,
    ondelete: EventHandler<()>,
) -> Element {
    let colors = PALETTE;
    let mut delete_step = use_signal(|| DeleteStep::Idle);
    let updated = format_updated_at(updated_at, Utc::now().timestamp_millis());
    let delete_title = match delete_step() {
        DeleteStep::Idle => "Delete prompt".to_string(),
        DeleteStep::Confirming => format!("Delete \"{name}\"?"),
    };
    let delete_label = delete_step().label();
    let delete_color = match delete_step() {
        DeleteStep::Idle => colors.text_muted,
        DeleteStep::Confirming => colors.error,
    };
    let bg = if is_selected {
        colors.bg_tertiary
    } else {
        colors.bg_primary
    };
    let border_left = if is_selected {
        format!("3px solid {}", colors.accent)
    } else {
        "3px solid transparent".to_string()
    };

    rsx! {
        div {
            class: if is_selected { "prompt-item selected" } else { "prompt-item" },
            style: "
                display: flex;
                align-items: center;
                gap: 8px;
                padding: 12px 16px;
                border-bottom: 1px solid {colors.border};
                border-left: {border_left};
                cursor: pointer;
                background: {bg};
            ",
            onclick: move |_| onselect.call(()),
            onmouseleave: move |_| delete_step.set(DeleteStep::Idle),

            div {
                style: "flex: 1; min-width: 0;",
                div {
                    class: "prompt-name",
                    style: "
                        font-weight: 500;
                        margin-bottom: 4px;
                        overflow: hidden;
                        text-overflow: ellipsis;
                        white-space: nowrap;
                    ",
                    "{name}"
                }
                div {
                    class: "prompt-preview",
                    style: "
                        font-size: 12px;
                        color: {colors.text_secondary};
                        overflow: hidden;
                        text-overflow: ellipsis;
                        white-space: nowrap;
                    ",
                    "{preview}"
                }
                div {
                    class: "prompt-updated",
                    style: "
                        font-size: 11px;
                        margin-top: 4px;
                        color: {colors.text_muted};
                    ",
                    "{updated}"
                }
            }

            button {
                title: "{delete_title}",
                style: "
                    border: none;
                    background: transparent;
                    color: {delete_color};
                    cursor: pointer;
                ",
                onclick: move |evt| {
                    evt.stop_propagation();
                    let (next, confirmed) = delete_step().click();
                    delete_step.set(next);
                    if confirmed {
                        ondelete.call(());
                    }
                },
                "{delete_label}"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn delete_needs_a_second_click() {
        let (step, delete) = DeleteStep::Idle.click();
        assert_eq!((step, delete), (DeleteStep::Confirming, false));
        assert_eq!(step.label(), "Confirm");

        let (step, delete) = step.click();
        assert_eq!((step, delete), (DeleteStep::Idle, true));
    }

    #[test]
    fn formats_recent_updates_relatively() {
        let now = 1_700_000_000_000;
        assert_eq!(format_updated_at(now - 5_000, now), "just now");
        assert_eq!(format_updated_at(now + 5_000, now), "just now");
        assert_eq!(format_updated_at(now - 5 * 60_000, now), "5m ago");
        assert_eq!(format_updated_at(now - 3 * 60 * 60_000, now), "3h ago");
        assert_eq!(format_updated_at(now - 2 * 24 * 60 * 60_000, now), "2d ago");
    }

    #[test]
    fn formats_old_updates_as_dates() {
        let now = 1_700_000_000_000;
        assert_eq!(format_updated_at(0, now), "Jan 1, 1970");
    }
}
