//! Domain-specific errors.

use std::path::PathBuf;

use thiserror::Error;

/// Problems with the requested run that are reported before any work is done.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("pattern '{pattern}' from {origin} uses a character class ([...]), which is not supported")]
    CharacterClass { pattern: String, origin: String },
    #[error("invalid pattern '{pattern}' from {origin}: {source}")]
    InvalidGlob {
        pattern: String,
        origin: String,
        #[source]
        source: globset::Error,
    },
    #[error("scope path '{}' does not exist or is not a directory", .0.display())]
    ScopeNotDirectory(PathBuf),
    #[error("'{}' is not inside a git working copy", .0.display())]
    NotWorkingCopy(PathBuf),
}

/// The host is missing something the run needs.
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("no clipboard utility found (tried: {0})")]
    NoClipboardUtility(String),
}
