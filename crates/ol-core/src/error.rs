//! Error types for the orbis-launcher

use thiserror::Error;

/// Errors that abort a launch before control reaches the emulator
#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Error: Please provide a game path or ID.")]
    MissingGameArgument,

    #[error("Error: Game ID or file path not found: {0}")]
    GameNotFound(String),

    #[error("Config error")]
    Config(#[from] ConfigError),
}

impl LaunchError {
    /// Process exit status reported for this error
    pub fn exit_code(&self) -> u8 {
        1
    }
}

/// Configuration load/save errors.
///
/// Messages leave the underlying cause to `source()`, so print the whole
/// chain (`{:#}` through anyhow) to see it.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config")]
    Serialize(#[from] toml::ser::Error),
}

impl ConfigError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

/// Result type alias for launcher operations
pub type Result<T> = std::result::Result<T, LaunchError>;
