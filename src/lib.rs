//! Selectel (OpenStack Swift) storage plugin for ACME clients.
//!
//! The authenticator answers HTTP-01 challenges by writing the validation
//! resource into a storage container that serves as the site's webroot. The
//! installer publishes the issued full chain and key to the storage SSL
//! endpoint.

pub mod acme;
pub mod config;
pub mod error;
pub mod plugin;
pub mod storage;


pub use config::PluginConfig;
pub use error::PluginError;
pub use plugin::{
    Authenticator, Installer, Lineage, PLUGINS, RenewDeployer, StorageAuthenticator,
    StorageInstaller, authenticator_for, find_plugin, installer_for,
};

/// Installs `env_logger` honouring `RUST_LOG`, defaulting to `info`.
/// Safe to call more than once.
pub fn init_logging() {
    let env = env_logger::Env::default().default_filter_or("info");
    if env_logger::Builder::from_env(env).try_init().is_ok() {
        log::debug!("[logging] env_logger initialized");
    }
}
