//! Terminal user interface for picking files.

pub mod app;
pub mod components;

pub use app::TerminalSelector;
