use std::sync::OnceLock;
use std::time::Duration;

use log::warn;
use reqwest::StatusCode;
use reqwest::blocking::Client;

use super::StorageError;

pub const TIMEOUT_ENV: &str = "STORAGE_WEBROOT_HTTP_TIMEOUT_SECS";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Process-wide blocking client for storage and upload requests.
pub(crate) fn client() -> &'static Client {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(resolve_timeout())
            .user_agent(USER_AGENT)
            .build()
            .unwrap_or_else(|err| {
                warn!("[storage-http] client builder failed ({err}); falling back to defaults");
                Client::new()
            })
    })
}

/// Request timeout taken from [`TIMEOUT_ENV`].
pub(crate) fn resolve_timeout() -> Duration {
    timeout_from(std::env::var(TIMEOUT_ENV).ok().as_deref())
}

/// Whole seconds; anything unset, unparsable or zero yields the default.
fn timeout_from(raw: Option<&str>) -> Duration {
    let Some(raw) = raw else {
        return DEFAULT_TIMEOUT;
    };
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Duration::from_secs(secs),
        _ => {
            warn!("[storage-http] ignoring {TIMEOUT_ENV}={raw:?}; using {DEFAULT_TIMEOUT:?}");
            DEFAULT_TIMEOUT
        }
    }
}

pub fn status_error(operation: &str, status: StatusCode, body: Option<String>) -> StorageError {
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return StorageError::Authentication(format!("{operation} was not authorized ({status})"));
    }
    StorageError::Status {
        status: status.as_u16(),
        body: body
            .filter(|body| !body.trim().is_empty())
            .unwrap_or_else(|| format!("{operation} failed: {status}")),
    }
}

pub fn transport_error(operation: &str, err: reqwest::Error) -> StorageError {
    StorageError::Transport(format!("{operation}: {err}"))
}
