use std::path::{Path, PathBuf};

use crate::{
    acme::{AnnotatedChallenge, ChallengeType, Http01Response},
    config::PluginConfig,
    error::PluginError,
};

mod authenticator;
mod installer;
mod lineage;

pub use authenticator::StorageAuthenticator;
pub use installer::StorageInstaller;
pub use lineage::Lineage;

/// Contract the orchestrator drives to prove control of domains.
pub trait Authenticator {
    fn description(&self) -> &'static str;
    fn more_info(&self) -> String;
    fn prepare(&self) -> Result<(), PluginError>;
    fn get_chall_pref(&self, domain: &str) -> Vec<ChallengeType>;

    /// One entry per challenge, in input order. `None` marks a challenge whose
    /// resource was published but failed self-verification.
    fn perform(
        &self,
        challenges: &[AnnotatedChallenge],
    ) -> Result<Vec<Option<Http01Response>>, PluginError>;

    fn cleanup(&self, challenges: &[AnnotatedChallenge]) -> Result<(), PluginError>;
}

/// Contract the orchestrator drives to install an issued certificate.
///
/// Only `deploy_cert` does work here; the hooks for host configuration
/// management default to no-ops.
pub trait Installer {
    fn description(&self) -> &'static str;

    fn more_info(&self) -> String {
        String::new()
    }

    fn prepare(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn get_all_names(&self) -> Vec<String> {
        Vec::new()
    }

    fn deploy_cert(
        &self,
        domain: &str,
        cert_path: &Path,
        key_path: &Path,
        chain_path: &Path,
        fullchain_path: &Path,
    ) -> Result<(), PluginError>;

    fn enhance(
        &self,
        _domain: &str,
        _enhancement: &str,
        _options: Option<&[String]>,
    ) -> Result<(), PluginError> {
        Ok(())
    }

    fn supported_enhancements(&self) -> Vec<String> {
        Vec::new()
    }

    /// `(cert, key, config file)` triples managed by the installer.
    fn get_all_certs_keys(&self) -> Vec<(PathBuf, PathBuf, PathBuf)> {
        Vec::new()
    }

    fn save(&self, _title: Option<&str>, _temporary: bool) -> Result<(), PluginError> {
        Ok(())
    }

    fn rollback_checkpoints(&self, _rollback: usize) -> Result<(), PluginError> {
        Ok(())
    }

    fn recovery_routine(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn view_config_changes(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn config_test(&self) -> Result<(), PluginError> {
        Ok(())
    }

    fn restart(&self) -> Result<(), PluginError> {
        Ok(())
    }

    /// Installers that also redeploy on `renew` return themselves here.
    fn as_renew_deployer(&self) -> Option<&dyn RenewDeployer> {
        None
    }
}

/// Invoked by the orchestrator after a lineage has been renewed.
pub trait RenewDeployer {
    fn renew_deploy(&self, lineage: &Lineage) -> Result<(), PluginError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PluginKind {
    Authenticator,
    Installer,
}

/// A command line option the orchestrator registers on the plugin's behalf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginOption {
    pub name: &'static str,
    pub help: &'static str,
}

#[derive(Debug)]
pub struct PluginEntry {
    pub name: &'static str,
    pub kind: PluginKind,
    pub description: &'static str,
    pub options: &'static [PluginOption],
    pub renew_deployer: bool,
}

const AUTH_URL_OPTION: PluginOption = PluginOption {
    name: "auth-url",
    help: "Storage auth URL (default: https://api.selcdn.ru/auth/v1.0)",
};
const USER_OPTION: PluginOption = PluginOption {
    name: "user",
    help: "User name",
};
const KEY_OPTION: PluginOption = PluginOption {
    name: "key",
    help: "Password",
};

pub static PLUGINS: &[PluginEntry] = &[
    PluginEntry {
        name: "auth",
        kind: PluginKind::Authenticator,
        description: "Obtain certificates using a webroot on Selectel storage",
        options: &[
            AUTH_URL_OPTION,
            USER_OPTION,
            KEY_OPTION,
            PluginOption {
                name: "container",
                help: "Container Name",
            },
            PluginOption {
                name: "http01-port",
                help: "Port used for the http-01 self-check (default: 80)",
            },
        ],
        renew_deployer: false,
    },
    PluginEntry {
        name: "installer",
        kind: PluginKind::Installer,
        description: "Selectel storage installer",
        options: &[
            AUTH_URL_OPTION,
            USER_OPTION,
            KEY_OPTION,
            PluginOption {
                name: "upload-url",
                help: "Certificate upload URL (default: https://api.selcdn.ru/v1/ssl/)",
            },
        ],
        renew_deployer: true,
    },
];

pub fn find_plugin(name: &str) -> Option<&'static PluginEntry> {
    PLUGINS.iter().find(|entry| entry.name == name)
}

pub fn authenticator_for(
    name: &str,
    config: PluginConfig,
) -> Result<Box<dyn Authenticator>, PluginError> {
    match find_plugin(name) {
        Some(entry) if entry.kind == PluginKind::Authenticator => {
            Ok(Box::new(StorageAuthenticator::from_config(config)))
        }
        Some(_) => Err(PluginError::Config(format!(
            "plugin '{name}' is not an authenticator"
        ))),
        None => Err(PluginError::Config(format!("unknown plugin '{name}'"))),
    }
}

pub fn installer_for(name: &str, config: PluginConfig) -> Result<Box<dyn Installer>, PluginError> {
    match find_plugin(name) {
        Some(entry) if entry.kind == PluginKind::Installer => {
            Ok(Box::new(StorageInstaller::from_config(config)))
        }
        Some(_) => Err(PluginError::Config(format!(
            "plugin '{name}' is not an installer"
        ))),
        None => Err(PluginError::Config(format!("unknown plugin '{name}'"))),
    }
}
