use anyhow::{Context, Result, anyhow};
use std::env;

use storage_webroot::storage::{ObjectStore, StorageError, SwiftStore};

struct SwiftTestConfig {
    auth_url: String,
    user: String,
    key: String,
    container: String,
}

fn load_swift_config() -> Result<SwiftTestConfig> {
    Ok(SwiftTestConfig {
        auth_url: env::var("SWIFT_TEST_AUTH_URL")
            .unwrap_or_else(|_| storage_webroot::config::DEFAULT_AUTH_URL.to_string()),
        user: env::var("SWIFT_TEST_USER").context("SWIFT_TEST_USER not set")?,
        key: env::var("SWIFT_TEST_KEY").context("SWIFT_TEST_KEY not set")?,
        container: env::var("SWIFT_TEST_CONTAINER").context("SWIFT_TEST_CONTAINER not set")?,
    })
}

// Needs SWIFT_TEST_USER, SWIFT_TEST_KEY and SWIFT_TEST_CONTAINER for a live account.
#[test]
fn swift_put_and_delete_challenge_object() -> Result<()> {
    let config = load_swift_config()?;
    let store = SwiftStore::new(config.auth_url, config.user, config.key);

    let session = store.open_session()?;
    if session.auth_token().is_empty() {
        return Err(anyhow!("expected a non-empty auth token"));
    }
    let name = "/.well-known/acme-challenge/integration-test";
    session.put_object(&config.container, name, b"integration-test", Some("text/plain"))?;
    session.delete_object(&config.container, name)?;

    // Deleting again hits a missing object; the backend decides what that means.
    match session.delete_object(&config.container, name) {
        Ok(()) | Err(StorageError::Status { status: 404, .. }) => Ok(()),
        Err(err) => Err(anyhow!("unexpected error deleting twice: {err}")),
    }
}

#[test]
fn swift_rejects_bad_credentials() -> Result<()> {
    let auth_url = env::var("SWIFT_TEST_AUTH_URL")
        .unwrap_or_else(|_| storage_webroot::config::DEFAULT_AUTH_URL.to_string());
    let store = SwiftStore::new(auth_url, "nobody".to_string(), "wrong".to_string());
    match store.open_session() {
        Err(StorageError::Authentication(_)) => Ok(()),
        Err(err) => Err(anyhow!("expected authentication error, got {err}")),
        Ok(_) => Err(anyhow!("bad credentials were accepted")),
    }
}
