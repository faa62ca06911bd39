use log::{debug, info};
use reqwest::Url;
use reqwest::header::CONTENT_TYPE;

use super::http;
use super::{ObjectStore, StorageError, StorageSession};

const AUTH_USER_HEADER: &str = "X-Auth-User";
const AUTH_KEY_HEADER: &str = "X-Auth-Key";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";
const STORAGE_URL_HEADER: &str = "X-Storage-Url";

/// OpenStack Swift account reached through v1.0 token auth.
pub struct SwiftStore {
    auth_url: String,
    user: String,
    key: String,
}

impl SwiftStore {
    pub fn new(auth_url: String, user: String, key: String) -> Self {
        Self {
            auth_url,
            user,
            key,
        }
    }
}

impl ObjectStore for SwiftStore {
    fn open_session(&self) -> Result<Box<dyn StorageSession>, StorageError> {
        debug!("[swift] authenticating {} against {}", self.user, self.auth_url);
        let response = http::client()
            .get(&self.auth_url)
            .header(AUTH_USER_HEADER, &self.user)
            .header(AUTH_KEY_HEADER, &self.key)
            .send()
            .map_err(|err| StorageError::Authentication(format!("auth request failed: {err}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(StorageError::Authentication(format!(
                "auth endpoint returned {status}: {}",
                body.trim()
            )));
        }

        let header = |name: &'static str| {
            response
                .headers()
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .ok_or(StorageError::MissingHeader(name))
        };
        let storage_url = header(STORAGE_URL_HEADER)?;
        let token = header(AUTH_TOKEN_HEADER)?;

        info!("[swift] session opened for {} at {}", self.user, storage_url);
        Ok(Box::new(SwiftSession::new(storage_url, token)))
    }
}

pub struct SwiftSession {
    storage_url: String,
    token: String,
}

impl SwiftSession {
    pub fn new(storage_url: String, token: String) -> Self {
        Self { storage_url, token }
    }

    /// `{storage_url}/{container}/{name}` with each segment percent-encoded.
    /// The name is split on `/` verbatim, so a leading slash leaves an empty
    /// segment behind the container.
    pub fn object_url(&self, container: &str, name: &str) -> Result<Url, StorageError> {
        let mut url = Url::parse(&self.storage_url).map_err(|err| {
            StorageError::Transport(format!("invalid storage url {}: {err}", self.storage_url))
        })?;
        {
            let mut segments = url.path_segments_mut().map_err(|_| {
                StorageError::Transport(format!(
                    "storage url {} cannot carry object paths",
                    self.storage_url
                ))
            })?;
            segments.pop_if_empty().push(container).extend(name.split('/'));
        }
        Ok(url)
    }
}

impl StorageSession for SwiftSession {
    fn storage_url(&self) -> &str {
        &self.storage_url
    }

    fn auth_token(&self) -> &str {
        &self.token
    }

    fn put_object(
        &self,
        container: &str,
        name: &str,
        contents: &[u8],
        content_type: Option<&str>,
    ) -> Result<(), StorageError> {
        let url = self.object_url(container, name)?;
        debug!("[swift] PUT {} ({} bytes)", url, contents.len());
        let mut request = http::client()
            .put(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .body(contents.to_vec());
        if let Some(content_type) = content_type {
            request = request.header(CONTENT_TYPE, content_type);
        }
        let response = request
            .send()
            .map_err(|err| http::transport_error("object upload", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(http::status_error("object upload", status, Some(body)));
        }
        Ok(())
    }

    fn delete_object(&self, container: &str, name: &str) -> Result<(), StorageError> {
        let url = self.object_url(container, name)?;
        debug!("[swift] DELETE {}", url);
        let response = http::client()
            .delete(url)
            .header(AUTH_TOKEN_HEADER, &self.token)
            .send()
            .map_err(|err| http::transport_error("object delete", err))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().unwrap_or_default();
            return Err(http::status_error("object delete", status, Some(body)));
        }
        Ok(())
    }
}
