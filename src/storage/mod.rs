use thiserror::Error;

pub(crate) mod http;
mod swift;
mod upload;

pub use swift::{SwiftSession, SwiftStore};
pub use upload::{HttpUploadTransport, UploadResponse, UploadTransport, join_upload_url};

/// Errors produced by object storage backends.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage authentication failed: {0}")]
    Authentication(String),
    #[error("storage auth response missing {0} header")]
    MissingHeader(&'static str),
    #[error("storage transport error: {0}")]
    Transport(String),
    #[error("storage returned {status}: {body}")]
    Status { status: u16, body: String },
}

/// Opens authenticated sessions against an object storage account.
///
/// Every call authenticates anew; sessions are never pooled.
pub trait ObjectStore: Send + Sync {
    fn open_session(&self) -> Result<Box<dyn StorageSession>, StorageError>;
}

/// A short-lived authenticated handle to object storage.
pub trait StorageSession {
    /// Base URL of the account's storage endpoint.
    fn storage_url(&self) -> &str;

    /// Token to send as `X-Auth-Token`.
    fn auth_token(&self) -> &str;

    /// Writes `contents` at `container/name`, replacing any existing object.
    fn put_object(
        &self,
        container: &str,
        name: &str,
        contents: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError>;

    /// Removes `container/name`. A missing object is reported as the
    /// backend reports it.
    fn delete_object(&self, container: &str, name: &str) -> Result<(), StorageError>;
}
