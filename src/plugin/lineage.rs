use std::fs;
use std::path::{Path, PathBuf};

use pem::Pem;
use x509_parser::extensions::GeneralName;
use x509_parser::prelude::parse_x509_certificate;

use crate::error::PluginError;

const CERT_FILENAME: &str = "cert.pem";
const CHAIN_FILENAME: &str = "chain.pem";
const FULLCHAIN_FILENAME: &str = "fullchain.pem";
const PRIVKEY_FILENAME: &str = "privkey.pem";

/// The current files of a certificate lineage, as handed over on renewal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
    pub chain_path: PathBuf,
    pub fullchain_path: PathBuf,
}

impl Lineage {
    pub fn new(
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
        chain_path: impl Into<PathBuf>,
        fullchain_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            cert_path: cert_path.into(),
            key_path: key_path.into(),
            chain_path: chain_path.into(),
            fullchain_path: fullchain_path.into(),
        }
    }

    /// Paths under `{config_dir}/live/{name}/`.
    pub fn from_live_dir(config_dir: &Path, name: &str) -> Self {
        let live = config_dir.join("live").join(name);
        Self::new(
            live.join(CERT_FILENAME),
            live.join(PRIVKEY_FILENAME),
            live.join(CHAIN_FILENAME),
            live.join(FULLCHAIN_FILENAME),
        )
    }

    /// Reads the `cert`, `privkey`, `chain` and `fullchain` entries from the
    /// top section of a renewal configuration file.
    pub fn from_renewal_conf(path: &Path) -> Result<Self, PluginError> {
        let raw = fs::read_to_string(path).map_err(|source| PluginError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let (mut cert, mut key, mut chain, mut fullchain) = (None, None, None, None);
        for line in raw.lines() {
            let line = line.trim();
            if line.starts_with('[') {
                break;
            }
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((name, value)) = line.split_once('=') else {
                continue;
            };
            let value = PathBuf::from(value.trim());
            match name.trim() {
                "cert" => cert = Some(value),
                "privkey" => key = Some(value),
                "chain" => chain = Some(value),
                "fullchain" => fullchain = Some(value),
                _ => {}
            }
        }

        let missing = |name: &str| {
            PluginError::Config(format!(
                "renewal config {} has no '{name}' entry",
                path.display()
            ))
        };
        Ok(Self::new(
            cert.ok_or_else(|| missing("cert"))?,
            key.ok_or_else(|| missing("privkey"))?,
            chain.ok_or_else(|| missing("chain"))?,
            fullchain.ok_or_else(|| missing("fullchain"))?,
        ))
    }

    /// Subject names of the certificate: common name first, then DNS
    /// subject alternative names, without duplicates.
    pub fn names(&self) -> Result<Vec<String>, PluginError> {
        let raw = fs::read(&self.cert_path).map_err(|source| PluginError::Io {
            path: self.cert_path.clone(),
            source,
        })?;
        let blocks = pem::parse_many(&raw)
            .map_err(|err| PluginError::Certificate(format!("failed to parse PEM: {err}")))?;
        let block: Pem = blocks
            .into_iter()
            .find(|block| block.tag() == "CERTIFICATE")
            .ok_or_else(|| {
                PluginError::Certificate(format!(
                    "no certificate found in {}",
                    self.cert_path.display()
                ))
            })?;
        let (_, cert) = parse_x509_certificate(block.contents())
            .map_err(|err| PluginError::Certificate(format!("invalid certificate: {err}")))?;

        let mut names: Vec<String> = Vec::new();
        let mut add = |name: &str| {
            if !names.iter().any(|existing| existing == name) {
                names.push(name.to_string());
            }
        };

        if let Some(cn) = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
        {
            add(cn);
        }
        let san = cert
            .subject_alternative_name()
            .map_err(|err| PluginError::Certificate(format!("invalid SAN extension: {err}")))?;
        if let Some(san) = san {
            for general_name in &san.value.general_names {
                if let GeneralName::DNSName(name) = general_name {
                    add(*name);
                }
            }
        }
        Ok(names)
    }

    pub fn primary_name(&self) -> Result<String, PluginError> {
        self.names()?.into_iter().next().ok_or_else(|| {
            PluginError::Certificate(format!(
                "certificate {} has no subject names",
                self.cert_path.display()
            ))
        })
    }
}
