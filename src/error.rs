use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced to the orchestrator by the authenticator and installer.
///
/// Self-verification failures are not represented here: `perform` reports
/// them per challenge as `None` and keeps going.
#[derive(Error, Debug)]
pub enum PluginError {
    #[error("plugin configuration invalid: {0}")]
    Config(String),
    #[error("storage authentication failed: {0}")]
    Authentication(String),
    #[error("storage request failed: {0}")]
    Transport(String),
    #[error("storage rejected request ({status}): {body}")]
    Storage { status: u16, body: String },
    #[error("{0}")]
    Deployment(String),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("certificate error: {0}")]
    Certificate(String),
}

impl From<StorageError> for PluginError {
    fn from(value: StorageError) -> Self {
        match value {
            StorageError::Authentication(reason) => PluginError::Authentication(reason),
            StorageError::MissingHeader(header) => PluginError::Authentication(format!(
                "auth response is missing the {header} header"
            )),
            StorageError::Transport(reason) => PluginError::Transport(reason),
            StorageError::Status { status, body } => PluginError::Storage { status, body },
        }
    }
}

impl PluginError {
    /// True when storage rejected the credentials or the session token,
    /// whether at login or on a later object request.
    pub fn is_authentication(&self) -> bool {
        matches!(self, PluginError::Authentication(_))
    }
}
