use std::fs;
use std::path::Path;

use log::{debug, info, warn};

use super::{Installer, Lineage, RenewDeployer};
use crate::{
    config::PluginConfig,
    error::PluginError,
    storage::{HttpUploadTransport, ObjectStore, SwiftStore, UploadTransport, join_upload_url},
};

/// Publishes issued certificates to the storage account's SSL endpoint so
/// the CDN in front of it serves them.
pub struct StorageInstaller {
    config: PluginConfig,
    store: Box<dyn ObjectStore>,
    transport: Box<dyn UploadTransport>,
}

impl StorageInstaller {
    pub fn new(
        config: PluginConfig,
        store: Box<dyn ObjectStore>,
        transport: Box<dyn UploadTransport>,
    ) -> Self {
        Self {
            config,
            store,
            transport,
        }
    }

    pub fn from_config(config: PluginConfig) -> Self {
        let store = SwiftStore::new(
            config.auth_url.clone(),
            config.user.clone(),
            config.key.clone(),
        );
        Self::new(config, Box::new(store), Box::new(HttpUploadTransport))
    }

    /// `{user}_{domain}.pem`; one object per domain, no versioning.
    pub fn object_name(&self, domain: &str) -> String {
        format!("{}_{}.pem", self.config.user, domain)
    }

    pub fn object_url(&self, domain: &str) -> Result<String, PluginError> {
        Ok(join_upload_url(
            &self.config.upload_url,
            &self.object_name(domain),
        )?)
    }

    fn upload(&self, token: &str, url: &str, body: Vec<u8>) -> Result<(), PluginError> {
        // The previous bundle goes first; whatever the delete reports is ignored.
        match self.transport.delete(url, token) {
            Ok(status) => debug!("[deploy] pre-upload delete of {} returned {}", url, status),
            Err(err) => warn!("[deploy] pre-upload delete of {} failed: {}", url, err),
        }

        let response = self.transport.put(url, token, body)?;
        if !response.is_ok() {
            return Err(PluginError::Deployment(response.body));
        }
        Ok(())
    }
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, PluginError> {
    fs::read(path).map_err(|source| PluginError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl Installer for StorageInstaller {
    fn description(&self) -> &'static str {
        "Selectel storage installer"
    }

    fn deploy_cert(
        &self,
        domain: &str,
        _cert_path: &Path,
        key_path: &Path,
        _chain_path: &Path,
        fullchain_path: &Path,
    ) -> Result<(), PluginError> {
        let session = self.store.open_session()?;
        let token = session.auth_token().to_string();
        let url = self.object_url(domain)?;

        let mut body = read_bytes(fullchain_path)?;
        body.extend_from_slice(&read_bytes(key_path)?);

        self.upload(&token, &url, body)?;
        info!("[deploy] published certificate for {} to {}", domain, url);
        Ok(())
    }

    fn as_renew_deployer(&self) -> Option<&dyn RenewDeployer> {
        Some(self)
    }
}

impl RenewDeployer for StorageInstaller {
    fn renew_deploy(&self, lineage: &Lineage) -> Result<(), PluginError> {
        let domain = lineage.primary_name()?;
        info!("[deploy] renewal deploy for {}", domain);
        self.deploy_cert(
            &domain,
            &lineage.cert_path,
            &lineage.key_path,
            &lineage.chain_path,
            &lineage.fullchain_path,
        )
    }
}
