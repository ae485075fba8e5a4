//! Service configuration.

use std::{path::PathBuf, time::Duration};

use frd_savedata::{raw::NascEnvironment, read::FriendListRevision};
use serde::Deserialize;

/// Configuration for the friend services.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// Root of the emulated NAND
    #[serde(default = "defaults::nand_dir")]
    pub nand_dir: PathBuf,

    #[serde(default)]
    pub nasc: NascHosts,

    #[serde(default = "defaults::https_timeout_secs")]
    pub https_timeout_secs: u64,

    #[serde(default)]
    pub friend_list_schema: FriendListSchema,

    /// Friend services version reported to the authentication server
    #[serde(default = "defaults::fpd_version")]
    pub fpd_version: u16,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            nand_dir: defaults::nand_dir(),
            nasc: NascHosts::default(),
            https_timeout_secs: defaults::https_timeout_secs(),
            friend_list_schema: FriendListSchema::default(),
            fpd_version: defaults::fpd_version(),
        }
    }
}

impl ServiceConfig {
    /// Reads a TOML configuration file.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let text = fs_err::read_to_string(path.into()).map_err(ConfigError::Read)?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(ConfigError::Parse)
    }

    pub fn https_timeout(&self) -> Duration {
        Duration::from_secs(self.https_timeout_secs)
    }

    pub fn friend_list_revision(&self) -> FriendListRevision {
        match self.friend_list_schema {
            FriendListSchema::Legacy => FriendListRevision::Legacy,
            FriendListSchema::Current => FriendListRevision::Current,
        }
    }
}

/// Authentication server per account environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NascHosts {
    #[serde(default = "defaults::nasc_prod")]
    pub prod: String,

    #[serde(default = "defaults::nasc_test")]
    pub test: String,

    #[serde(default = "defaults::nasc_dev")]
    pub dev: String,
}

impl Default for NascHosts {
    fn default() -> Self {
        Self {
            prod: defaults::nasc_prod(),
            test: defaults::nasc_test(),
            dev: defaults::nasc_dev(),
        }
    }
}

impl NascHosts {
    pub fn host(&self, environment: NascEnvironment) -> &str {
        match environment {
            NascEnvironment::Prod => &self.prod,
            NascEnvironment::Test => &self.test,
            NascEnvironment::Dev => &self.dev,
        }
    }
}

/// Friend-list file layout used by the save data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FriendListSchema {
    Legacy,
    #[default]
    Current,
}

/// Error loading the configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file")]
    Read(#[source] std::io::Error),

    #[error("invalid configuration")]
    Parse(#[source] toml::de::Error),
}

mod defaults {
    use std::path::PathBuf;

    pub fn nand_dir() -> PathBuf {
        PathBuf::from("nand")
    }

    pub fn https_timeout_secs() -> u64 {
        15
    }

    pub fn fpd_version() -> u16 {
        16
    }

    pub fn nasc_prod() -> String {
        "nasc.nintendowifi.net".into()
    }

    pub fn nasc_test() -> String {
        "nasc.pretendo.cc".into()
    }

    pub fn nasc_dev() -> String {
        "127.0.0.1".into()
    }
}
