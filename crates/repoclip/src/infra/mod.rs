//! Infrastructure adapters for git, config, clipboard, and logging.

pub mod clipboard;
pub mod config;
pub mod git;
pub mod logging;
