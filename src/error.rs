use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while resolving settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// An explicitly requested config file does not exist.
    #[error("Can't find config file `{}`", .path.display())]
    ConfigNotFound { path: PathBuf },
    #[error("failed to read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("unknown role `{0}`")]
    UnknownRole(String),
    #[error("unknown setting `{0}`")]
    UnknownKey(String),
}

pub type Result<T, E = SettingsError> = std::result::Result<T, E>;
