//! API credentials
//!
//! Each field is resolved on its own, highest priority first: environment
//! variables, the manifest `provider` block, then
//! `~/.config/ipamflow/credentials.yaml`.

use crate::error::{ConfigError, Result};
use crate::config_dir;
use ipamflow_core::ProviderSettings;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

pub const URL_ENV: &str = "IPAMFLOW_URL";
pub const USER_ENV: &str = "IPAMFLOW_USER";
pub const PASSWORD_ENV: &str = "IPAMFLOW_PASSWORD";

/// Resolved connection settings
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Base URL of the Micetro server, e.g. `https://micetro.example.net`
    pub url: String,
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(url: impl Into<String>, user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            user: user.into(),
            password: password.into(),
        }
    }

    /// Resolve credentials for a manifest with the given `provider` block
    pub fn resolve(provider: Option<&ProviderSettings>) -> Result<Self> {
        let file = match credentials_file() {
            Some(path) => PartialCredentials::from_file(&path)?,
            None => PartialCredentials::default(),
        };

        PartialCredentials::from_env()
            .or(provider.map(PartialCredentials::from).unwrap_or_default())
            .or(file)
            .complete()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &"********")
            .finish()
    }
}

/// One source of credentials; any field may be missing
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PartialCredentials {
    pub url: Option<String>,
    #[serde(alias = "username")]
    pub user: Option<String>,
    pub password: Option<String>,
}

impl PartialCredentials {
    pub fn from_env() -> Self {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.is_empty());
        Self {
            url: var(URL_ENV),
            user: var(USER_ENV),
            password: var(PASSWORD_ENV),
        }
    }

    /// Read a YAML credentials file; a missing file yields no values
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&content).map_err(|source| ConfigError::InvalidCredentialsFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Fill fields missing here from `lower`
    pub fn or(self, lower: PartialCredentials) -> Self {
        Self {
            url: self.url.or(lower.url),
            user: self.user.or(lower.user),
            password: self.password.or(lower.password),
        }
    }

    pub fn complete(self) -> Result<Credentials> {
        Ok(Credentials {
            url: self.url.ok_or(ConfigError::MissingCredential("url"))?,
            user: self.user.ok_or(ConfigError::MissingCredential("user"))?,
            password: self.password.ok_or(ConfigError::MissingCredential("password"))?,
        })
    }
}

impl From<&ProviderSettings> for PartialCredentials {
    fn from(provider: &ProviderSettings) -> Self {
        Self {
            url: provider.url.clone(),
            user: provider.user.clone(),
            password: provider.password.clone(),
        }
    }
}

impl fmt::Debug for PartialCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PartialCredentials")
            .field("url", &self.url)
            .field("user", &self.user)
            .field("password", &self.password.as_ref().map(|_| "********"))
            .finish()
    }
}

/// `~/.config/ipamflow/credentials.yaml`
pub fn credentials_file() -> Option<PathBuf> {
    config_dir().map(|dir| dir.join("credentials.yaml"))
}
