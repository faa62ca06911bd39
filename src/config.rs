use std::collections::BTreeMap;

use log::debug;
use serde::Deserialize;

use crate::error::PluginError;

pub const DEFAULT_AUTH_URL: &str = "https://api.selcdn.ru/auth/v1.0";
pub const DEFAULT_UPLOAD_URL: &str = "https://api.selcdn.ru/v1/ssl/";
pub const DEFAULT_HTTP01_PORT: u16 = 80;

const ENV_PREFIX: &str = "SELECTEL_STORAGE_";

/// Settings shared by the authenticator and the installer.
///
/// Built once before any operation and never mutated afterwards.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct PluginConfig {
    #[serde(default = "default_auth_url")]
    pub auth_url: String,
    pub user: String,
    pub key: String,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default = "default_upload_url")]
    pub upload_url: String,
    #[serde(default = "default_http01_port")]
    pub http01_port: u16,
}

fn default_auth_url() -> String {
    DEFAULT_AUTH_URL.to_string()
}

fn default_upload_url() -> String {
    DEFAULT_UPLOAD_URL.to_string()
}

fn default_http01_port() -> u16 {
    DEFAULT_HTTP01_PORT
}

impl PluginConfig {
    pub fn new(user: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            auth_url: default_auth_url(),
            user: user.into(),
            key: key.into(),
            container: None,
            upload_url: default_upload_url(),
            http01_port: DEFAULT_HTTP01_PORT,
        }
    }

    pub fn with_container(mut self, container: impl Into<String>) -> Self {
        self.container = Some(container.into());
        self
    }

    pub fn with_auth_url(mut self, auth_url: impl Into<String>) -> Self {
        self.auth_url = auth_url.into();
        self
    }

    pub fn with_upload_url(mut self, upload_url: impl Into<String>) -> Self {
        self.upload_url = upload_url.into();
        self
    }

    pub fn with_http01_port(mut self, port: u16) -> Self {
        self.http01_port = port;
        self
    }

    /// Builds a config from plugin option values keyed by option name
    /// (`auth-url`, `user`, `key`, `container`, `upload-url`, `http01-port`).
    pub fn from_options(options: &BTreeMap<String, String>) -> Result<Self, PluginError> {
        Self::from_lookup(|name| options.get(name).cloned())
    }

    /// Builds a config from `SELECTEL_STORAGE_*` environment variables.
    pub fn from_env() -> Result<Self, PluginError> {
        Self::from_lookup(|name| {
            let var = format!("{ENV_PREFIX}{}", name.replace('-', "_").to_uppercase());
            std::env::var(var).ok()
        })
    }

    pub fn from_json_str(raw: &str) -> Result<Self, PluginError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|err| PluginError::Config(format!("invalid plugin config: {err}")))?;
        config.validate()?;
        Ok(config)
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, PluginError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let value = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let user = value("user")
            .ok_or_else(|| PluginError::Config("storage user is required".to_string()))?;
        let key = value("key")
            .ok_or_else(|| PluginError::Config("storage key is required".to_string()))?;

        let http01_port = match value("http01-port") {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                PluginError::Config(format!("invalid http01 port: {raw}"))
            })?,
            None => DEFAULT_HTTP01_PORT,
        };

        let config = Self {
            auth_url: value("auth-url").unwrap_or_else(default_auth_url),
            user,
            key,
            container: value("container"),
            upload_url: value("upload-url").unwrap_or_else(default_upload_url),
            http01_port,
        };
        config.validate()?;
        debug!(
            "[config] loaded storage config for user {} (auth {})",
            config.user, config.auth_url
        );
        Ok(config)
    }

    fn validate(&self) -> Result<(), PluginError> {
        if self.user.trim().is_empty() {
            return Err(PluginError::Config("storage user is required".to_string()));
        }
        if self.key.trim().is_empty() {
            return Err(PluginError::Config("storage key is required".to_string()));
        }
        if self.http01_port == 0 {
            return Err(PluginError::Config("http01 port must be non-zero".to_string()));
        }
        for (name, url) in [("auth-url", &self.auth_url), ("upload-url", &self.upload_url)] {
            if !(url.starts_with("https://") || url.starts_with("http://")) {
                return Err(PluginError::Config(format!(
                    "{name} must be an http(s) URL, got {url}"
                )));
            }
        }
        Ok(())
    }

    /// The target container; only the authenticator needs one.
    pub fn require_container(&self) -> Result<&str, PluginError> {
        self.container
            .as_deref()
            .filter(|container| !container.trim().is_empty())
            .ok_or_else(|| PluginError::Config("storage container is required".to_string()))
    }
}
