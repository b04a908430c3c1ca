//! UI Components
//!
//! Reusable UI components for the desktop application.

mod prompt_card;
mod prompt_form;
mod prompt_list;
mod search_input;
mod toolbar;

pub use prompt_card::PromptCard;
pub use prompt_form::PromptForm;
pub use prompt_list::PromptList;
pub use search_input::SearchInput;
pub use toolbar::Toolbar;
