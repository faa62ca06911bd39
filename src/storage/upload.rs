use log::debug;
use reqwest::Url;

use super::StorageError;
use super::http;

/// Status and body of a certificate upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadResponse {
    pub status: u16,
    pub body: String,
}

impl UploadResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Raw requests against the certificate upload endpoint.
pub trait UploadTransport: Send + Sync {
    /// Issues a DELETE and returns its status code.
    fn delete(&self, url: &str, token: &str) -> Result<u16, StorageError>;

    /// Issues a PUT with `body` and returns status and response text.
    fn put(&self, url: &str, token: &str, body: Vec<u8>) -> Result<UploadResponse, StorageError>;
}

pub struct HttpUploadTransport;

impl UploadTransport for HttpUploadTransport {
    fn delete(&self, url: &str, token: &str) -> Result<u16, StorageError> {
        debug!("[upload] DELETE {}", url);
        let response = http::client()
            .delete(url)
            .header("X-Auth-Token", token)
            .send()
            .map_err(|err| http::transport_error("certificate delete", err))?;
        Ok(response.status().as_u16())
    }

    fn put(&self, url: &str, token: &str, body: Vec<u8>) -> Result<UploadResponse, StorageError> {
        debug!("[upload] PUT {} ({} bytes)", url, body.len());
        let response = http::client()
            .put(url)
            .header("X-Auth-Token", token)
            .body(body)
            .send()
            .map_err(|err| http::transport_error("certificate upload", err))?;
        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Ok(UploadResponse { status, body })
    }
}

/// Resolves `name` against `base` the way a browser resolves a relative
/// link: a base ending in `/` gets the name appended, otherwise its last
/// segment is replaced.
pub fn join_upload_url(base: &str, name: &str) -> Result<String, StorageError> {
    let base = Url::parse(base)
        .map_err(|err| StorageError::Transport(format!("invalid upload url {base}: {err}")))?;
    // "./" keeps names containing ':' from parsing as a scheme.
    let joined = base
        .join(&format!("./{name}"))
        .map_err(|err| StorageError::Transport(format!("invalid object name {name}: {err}")))?;
    Ok(joined.to_string())
}
