//! UI rendering module for coinlens
//!
//! All terminal rendering lives here, built on ratatui widgets.

pub mod chart;
pub mod dashboard;
pub mod help_overlay;
pub mod widgets;

pub use dashboard::render as render_dashboard;
pub use help_overlay::render as render_help_overlay;
