//! Terminal interface for AdGen

mod export;
mod key_selector;
mod ui;
mod views;


pub use export::{campaign_json, extension_for, write_creative};
pub use key_selector::TerminalKeySelector;
pub use ui::{
    KeyOutcome, apply_key, display_banner, print_help, prompt_line, read_line_with_history,
    read_secret, with_progress,
};
pub use views::{
    render_ad_preview, render_dashboard, render_intake_form, render_notice, render_sources, render_status,
    render_step_indicator, render_strategy_panel, render_view, render_workspace,
};

// Re-export core types
pub use adgen_core::{Error, Result};
