//! Infrastructure adapters for external programs, git, config, and the clipboard.

pub mod clipboard;
pub mod config;
pub mod git;
pub mod logging;
pub mod process;
pub mod tree;
