use std::path::PathBuf;

/// Everything that can go wrong while loading, saving or editing profiles.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unable to locate the home directory")]
    NoHomeDir,

    #[error("failed to create config directory {path:?}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file does not exist yet. Not fatal on construction.
    #[error("config file {path:?} does not exist")]
    NotFound { path: PathBuf },

    #[error("failed to read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("failed to write config file {path:?}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("profile name is required")]
    EmptyName,

    #[error("no profile specified and no default profile set")]
    NoDefault,

    #[error("profile '{0}' not found")]
    ProfileNotFound(String),
}

impl ConfigError {
    /// `true` only for a missing config file, which callers may treat as "start empty".
    pub fn is_not_found(&self) -> bool {
        matches!(self, ConfigError::NotFound { .. })
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
