use anyhow::{Result, anyhow};

use storage_webroot::acme::ChallengeType;
use storage_webroot::{Authenticator, PluginConfig, PluginError, StorageAuthenticator};

use super::support::{RecordingStore, StorageCall, StubVerifier, challenge};

fn config() -> PluginConfig {
    PluginConfig::new("acct1", "secret").with_container("webroot")
}

fn authenticator(store: &RecordingStore, verifier: StubVerifier) -> StorageAuthenticator {
    StorageAuthenticator::new(config(), Box::new(store.clone()), Box::new(verifier))
}

#[test]
fn single_challenge_is_uploaded_verified_and_cleaned_up() -> Result<()> {
    let store = RecordingStore::new();
    let auth = authenticator(&store, StubVerifier::always(true));
    let c1 = challenge("a.example", "tokenA");

    let responses = auth.perform(std::slice::from_ref(&c1))?;
    let (expected_response, validation) = c1.response_and_validation();
    assert_eq!(responses, vec![Some(expected_response)]);
    assert_eq!(
        store.calls(),
        vec![
            StorageCall::OpenSession,
            StorageCall::Put {
                container: "webroot".to_string(),
                name: "/.well-known/acme-challenge/tokenA".to_string(),
                contents: validation,
                content_type: Some("text/plain".to_string()),
            },
        ]
    );

    auth.cleanup(&[c1])?;
    assert_eq!(
        store.deletes(),
        vec![StorageCall::Delete {
            container: "webroot".to_string(),
            name: "/.well-known/acme-challenge/tokenA".to_string(),
        }]
    );
    Ok(())
}

#[test]
fn perform_keeps_order_and_reports_failed_verification_as_none() -> Result<()> {
    let store = RecordingStore::new();
    let auth = authenticator(&store, StubVerifier::new(|token| token != "tokenB"));
    let challenges = vec![
        challenge("a.example", "tokenA"),
        challenge("b.example", "tokenB"),
        challenge("c.example", "tokenC"),
        challenge("a.example", "tokenA"),
    ];

    let responses = auth.perform(&challenges)?;
    assert_eq!(responses.len(), challenges.len());
    for (response, achall) in responses.iter().zip(&challenges) {
        let expected = achall.response_and_validation().0;
        if achall.challenge.token() == "tokenB" {
            assert!(response.is_none());
        } else {
            assert_eq!(response.as_ref(), Some(&expected));
        }
    }

    // Duplicates are not collapsed: every challenge gets its own session and upload.
    assert_eq!(store.sessions_opened(), 4);
    let uploaded: Vec<(String, Vec<u8>)> = store
        .puts()
        .into_iter()
        .map(|call| match call {
            StorageCall::Put { name, contents, .. } => (name, contents),
            other => panic!("unexpected call {other:?}"),
        })
        .collect();
    let expected: Vec<(String, Vec<u8>)> = challenges
        .iter()
        .map(|achall| (achall.path(), achall.response_and_validation().1))
        .collect();
    assert_eq!(uploaded, expected);
    Ok(())
}

#[test]
fn verification_uses_configured_port_and_domain() -> Result<()> {
    let store = RecordingStore::new();
    let verifier = StubVerifier::always(true);
    let seen = verifier.seen();
    let auth = StorageAuthenticator::new(
        config().with_http01_port(8080),
        Box::new(store.clone()),
        Box::new(verifier),
    );

    auth.perform(&[challenge("a.example", "tokenA"), challenge("b.example", "tokenB")])?;
    let seen = seen.lock().map_err(|_| anyhow!("verifier log poisoned"))?;
    assert_eq!(
        *seen,
        vec![
            ("a.example".to_string(), "tokenA".to_string(), 8080),
            ("b.example".to_string(), "tokenB".to_string(), 8080),
        ]
    );
    Ok(())
}

#[test]
fn authentication_failure_aborts_the_batch() {
    let store = RecordingStore::rejecting_auth();
    let verifier = StubVerifier::always(true);
    let seen = verifier.seen();
    let auth = authenticator(&store, verifier);

    let err = auth
        .perform(&[challenge("a.example", "tokenA"), challenge("b.example", "tokenB")])
        .unwrap_err();
    assert!(err.is_authentication(), "unexpected error: {err}");
    assert_eq!(store.calls(), vec![StorageCall::OpenSession]);
    assert!(seen.lock().unwrap().is_empty());
}

#[test]
fn upload_failure_aborts_the_batch_after_earlier_successes() {
    let store = RecordingStore::rejecting_put_of("tokenB");
    let verifier = StubVerifier::always(true);
    let seen = verifier.seen();
    let auth = authenticator(&store, verifier);

    let err = auth
        .perform(&[
            challenge("a.example", "tokenA"),
            challenge("b.example", "tokenB"),
            challenge("c.example", "tokenC"),
        ])
        .unwrap_err();
    match err {
        PluginError::Storage { status, body } => {
            assert_eq!(status, 507);
            assert_eq!(body, "quota exceeded");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(store.puts().len(), 2);
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[test]
fn cleanup_deletes_every_challenge_with_a_fresh_session() -> Result<()> {
    let store = RecordingStore::new();
    let auth = authenticator(&store, StubVerifier::always(false));
    let challenges = vec![challenge("a.example", "tokenA"), challenge("b.example", "tokenB")];

    // Failed verification does not exempt a challenge from cleanup.
    let responses = auth.perform(&challenges)?;
    assert_eq!(responses, vec![None, None]);

    let before = store.calls().len();
    auth.cleanup(&challenges)?;
    let cleanup_calls = store.calls()[before..].to_vec();
    assert_eq!(
        cleanup_calls,
        vec![
            StorageCall::OpenSession,
            StorageCall::Delete {
                container: "webroot".to_string(),
                name: "/.well-known/acme-challenge/tokenA".to_string(),
            },
            StorageCall::OpenSession,
            StorageCall::Delete {
                container: "webroot".to_string(),
                name: "/.well-known/acme-challenge/tokenB".to_string(),
            },
        ]
    );
    Ok(())
}

#[test]
fn cleanup_propagates_authentication_failure() {
    let store = RecordingStore::rejecting_auth();
    let auth = authenticator(&store, StubVerifier::always(true));
    let err = auth.cleanup(&[challenge("a.example", "tokenA")]).unwrap_err();
    assert!(err.is_authentication());
    assert!(store.deletes().is_empty());
}

#[test]
fn missing_container_is_a_config_error() {
    let store = RecordingStore::new();
    let auth = StorageAuthenticator::new(
        PluginConfig::new("acct1", "secret"),
        Box::new(store.clone()),
        Box::new(StubVerifier::always(true)),
    );
    assert!(matches!(
        auth.perform(&[challenge("a.example", "tokenA")]),
        Err(PluginError::Config(_))
    ));
    assert!(matches!(
        auth.cleanup(&[challenge("a.example", "tokenA")]),
        Err(PluginError::Config(_))
    ));
    assert!(store.calls().is_empty());
}

#[test]
fn empty_batch_needs_no_container() -> Result<()> {
    let store = RecordingStore::new();
    let auth = StorageAuthenticator::new(
        PluginConfig::new("acct1", "secret"),
        Box::new(store.clone()),
        Box::new(StubVerifier::always(true)),
    );
    assert!(auth.perform(&[])?.is_empty());
    auth.cleanup(&[])?;
    assert!(store.calls().is_empty());
    Ok(())
}

#[test]
fn empty_batch_opens_no_session() -> Result<()> {
    let store = RecordingStore::new();
    let auth = authenticator(&store, StubVerifier::always(true));
    assert!(auth.perform(&[])?.is_empty());
    auth.cleanup(&[])?;
    assert!(store.calls().is_empty());
    Ok(())
}

#[test]
fn prefers_http01_only() {
    let store = RecordingStore::new();
    let auth = authenticator(&store, StubVerifier::always(true));
    assert_eq!(auth.get_chall_pref("a.example"), vec![ChallengeType::Http01]);
    assert!(auth.more_info().contains("http-01"));
}
