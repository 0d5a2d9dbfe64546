//! Configuration module for Sok.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, SummaryPrompts};
pub use settings::{
    GeneralSettings, PromptSettings, SearchProvider, SearchSettings, Settings, SummarySettings,
    WarehouseSettings,
};
