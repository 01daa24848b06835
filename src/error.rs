use std::path::PathBuf;
use thiserror::Error;

use crate::shell::SUPPORTED_SHELLS;

/// Failures of the on-disk profile store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read profile store {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("profile store {} is malformed: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("failed to write profile store {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("failed to replace profile store {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything else that ends an invocation. None of these are retried.
#[derive(Debug, Error)]
pub enum SwitchError {
    #[error("profile not found: {0}")]
    NotFound(String),

    #[error("profile already exists: {0}")]
    AlreadyExists(String),

    #[error("unsupported shell `{0}` (supported: {list})", list = SUPPORTED_SHELLS.join(", "))]
    UnsupportedShell(String),

    #[error("selection cancelled")]
    SelectionCancelled,

    #[error("no profiles to choose from; create one with `envswap create <name>`")]
    NoProfiles,

    #[error("invalid variable name `{0}`: expected letters, digits or `_`, not starting with a digit")]
    InvalidVarName(String),

    #[error("variable `{0}` is defined more than once")]
    DuplicateVar(String),

    #[error("invalid profile name `{0}`")]
    InvalidProfileName(String),

    #[error("invalid assignment `{0}`: expected VAR=VALUE")]
    InvalidAssignment(String),
}

/// Failures reading another tool's configuration for `import`.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot locate {provider} configuration; set HOME or pass --from")]
    NoSource { provider: &'static str },

    #[error("failed to read {provider} configuration at {}", path.display())]
    Read {
        provider: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no {provider} entries found in {}", path.display())]
    Empty { provider: &'static str, path: PathBuf },
}
