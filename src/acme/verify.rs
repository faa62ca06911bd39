use std::time::Duration;

use log::{debug, error, warn};

use super::challenge::{AccountKey, Http01Challenge, Http01Response};
use crate::storage::http::resolve_timeout;

const WHITESPACE: &[char] = &[' ', '\t', '\n', '\r'];

/// Checks that a published challenge resource is reachable and correct
/// before the orchestrator asks the ACME server to validate it.
pub trait SelfVerifier: Send + Sync {
    fn simple_verify(
        &self,
        response: &Http01Response,
        challenge: &Http01Challenge,
        domain: &str,
        account_key: &AccountKey,
        port: u16,
    ) -> bool;
}

/// Fetches the challenge URI over plain HTTP and compares the body with the
/// key authorization.
pub struct HttpSelfVerifier {
    timeout: Duration,
}

impl HttpSelfVerifier {
    pub fn new() -> Self {
        Self {
            timeout: resolve_timeout(),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl Default for HttpSelfVerifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SelfVerifier for HttpSelfVerifier {
    fn simple_verify(
        &self,
        response: &Http01Response,
        challenge: &Http01Challenge,
        domain: &str,
        account_key: &AccountKey,
        port: u16,
    ) -> bool {
        if !response.verify_key_authorization(challenge, account_key) {
            warn!(
                "[verify] key authorization does not match challenge {} for {}",
                challenge.token(),
                domain
            );
            return false;
        }

        let uri = challenge.uri(domain, port);
        debug!("[verify] fetching {}", uri);
        let agent = ureq::AgentBuilder::new().timeout(self.timeout).build();
        let body = match agent.get(&uri).call() {
            Ok(resp) => match resp.into_string() {
                Ok(body) => body,
                Err(err) => {
                    error!("[verify] failed to read body from {}: {}", uri, err);
                    return false;
                }
            },
            Err(err) => {
                error!("[verify] unable to reach {}: {}", uri, err);
                return false;
            }
        };

        let served = body.trim_end_matches(WHITESPACE);
        if served == response.key_authorization() {
            debug!("[verify] {} serves the expected key authorization", uri);
            true
        } else {
            warn!(
                "[verify] {} served {:?}, expected {:?}",
                uri,
                served,
                response.key_authorization()
            );
            false
        }
    }
}
