use log::{debug, error, info};

use super::Authenticator;
use crate::{
    acme::{AnnotatedChallenge, ChallengeType, Http01Response, HttpSelfVerifier, SelfVerifier},
    config::PluginConfig,
    error::PluginError,
    storage::{ObjectStore, StorageSession, SwiftStore},
};

/// Fulfils HTTP-01 challenges by publishing the validation resource to a
/// storage container that backs the site's webroot.
pub struct StorageAuthenticator {
    config: PluginConfig,
    store: Box<dyn ObjectStore>,
    verifier: Box<dyn SelfVerifier>,
}

impl StorageAuthenticator {
    pub fn new(
        config: PluginConfig,
        store: Box<dyn ObjectStore>,
        verifier: Box<dyn SelfVerifier>,
    ) -> Self {
        Self {
            config,
            store,
            verifier,
        }
    }

    /// Swift storage with HTTP self-verification.
    pub fn from_config(config: PluginConfig) -> Self {
        let store = SwiftStore::new(
            config.auth_url.clone(),
            config.user.clone(),
            config.key.clone(),
        );
        Self::new(config, Box::new(store), Box::new(HttpSelfVerifier::new()))
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Opens a fresh authenticated session; nothing is reused between calls.
    pub fn get_connection(&self) -> Result<Box<dyn StorageSession>, PluginError> {
        Ok(self.store.open_session()?)
    }

    fn perform_single(
        &self,
        container: &str,
        achall: &AnnotatedChallenge,
    ) -> Result<Option<Http01Response>, PluginError> {
        let (response, validation) = achall.response_and_validation();
        let path = achall.path();
        let session = self.get_connection()?;

        session.put_object(container, &path, &validation, Some("text/plain"))?;
        debug!(
            "[webroot] uploaded {} bytes to {}/{} for {}",
            validation.len(),
            container,
            path,
            achall.domain
        );

        if self.verifier.simple_verify(
            &response,
            &achall.challenge,
            &achall.domain,
            &achall.account_key,
            self.config.http01_port,
        ) {
            info!("[webroot] self-verify of {} succeeded", achall.domain);
            Ok(Some(response))
        } else {
            error!("[webroot] self-verify of challenge for {} failed", achall.domain);
            Ok(None)
        }
    }
}

impl Authenticator for StorageAuthenticator {
    fn description(&self) -> &'static str {
        "Obtain certificates using a webroot on Selectel storage"
    }

    fn more_info(&self) -> String {
        "Authenticator plugin that performs http-01 challenge by saving necessary \
         validation resources to Selectel storage"
            .to_string()
    }

    fn prepare(&self) -> Result<(), PluginError> {
        self.config.require_container().map(|_| ())
    }

    fn get_chall_pref(&self, _domain: &str) -> Vec<ChallengeType> {
        vec![ChallengeType::Http01]
    }

    fn perform(
        &self,
        challenges: &[AnnotatedChallenge],
    ) -> Result<Vec<Option<Http01Response>>, PluginError> {
        if challenges.is_empty() {
            return Ok(Vec::new());
        }
        let container = self.config.require_container()?;
        let mut responses = Vec::with_capacity(challenges.len());
        for achall in challenges {
            responses.push(self.perform_single(container, achall)?);
        }
        Ok(responses)
    }

    fn cleanup(&self, challenges: &[AnnotatedChallenge]) -> Result<(), PluginError> {
        if challenges.is_empty() {
            return Ok(());
        }
        let container = self.config.require_container()?;
        for achall in challenges {
            let session = self.get_connection()?;
            let path = achall.path();
            session.delete_object(container, &path)?;
            debug!("[webroot] removed {}/{} for {}", container, path, achall.domain);
        }
        Ok(())
    }
}
