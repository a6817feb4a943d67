// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Configuration layout.
//!
//! Specify the layout of dotkeep's configuration file to simplify the process
//! of serialization and deserialization. Every field has a default, so a
//! missing configuration file is never an error.
//!
//! # General Layout
//!
//! The configuration file is composed of two sections: server and files.
//! The server section defines how the HTTP service listens and who may talk
//! to it. The files section defines how catalog entries are located and
//! matched during archive import.

use crate::archive::matcher::MatchStrategy;

use serde::{Deserialize, Serialize};
use std::{
    fmt::{Display, Error as FmtError, Formatter, Result as FmtResult},
    fs::read_to_string,
    net::{IpAddr, Ipv4Addr},
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

/// Dotkeep configuration layout.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Settings for the HTTP service.
    #[serde(default)]
    pub server: ServerSettings,

    /// Settings for managed file handling.
    #[serde(default)]
    pub files: FileSettings,
}

impl Config {
    /// Load configuration from target path.
    ///
    /// Returns the default configuration if target path does not exist.
    ///
    /// # Errors
    ///
    /// - Return [`ConfigError::Read`] if configuration file cannot be read.
    /// - Return [`ConfigError::Deserialize`] if configuration is malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!("no configuration at {:?}, using defaults", path.display());
            return Ok(Self::default());
        }

        read_to_string(path)
            .map_err(|err| ConfigError::Read {
                source: err,
                path: path.to_path_buf(),
            })?
            .parse()
    }
}

impl FromStr for Config {
    type Err = ConfigError;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        let mut config: Config = toml::from_str(data).map_err(ConfigError::Deserialize)?;

        // INVARIANT: Perform shell expansion on home directory override.
        if let Some(home_dir) = config.files.home_dir.take() {
            config.files.home_dir = Some(PathBuf::from(
                shellexpand::full(home_dir.to_string_lossy().as_ref())
                    .map_err(ConfigError::ShellExpansion)?
                    .into_owned(),
            ));
        }

        Ok(config)
    }
}

impl Display for Config {
    fn fmt(&self, fmt: &mut Formatter<'_>) -> FmtResult {
        fmt.write_str(
            toml::to_string_pretty(self)
                .map_err(ConfigError::Serialize)?
                .as_str(),
        )
    }
}

/// HTTP service settings.
#[derive(Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Address to bind to.
    pub address: IpAddr,

    /// Port to listen on.
    pub port: u16,

    /// Origins allowed to make cross-origin requests.
    pub allowed_origins: Vec<String>,

    /// Largest accepted archive upload in mebibytes.
    pub upload_limit_mib: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            address: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            allowed_origins: vec![
                "http://localhost:5173".into(),
                "http://localhost:3000".into(),
                "http://localhost:8080".into(),
            ],
            upload_limit_mib: 32,
        }
    }
}

/// Managed file settings.
#[derive(Default, Debug, PartialEq, Eq, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FileSettings {
    /// Home directory to resolve path templates against instead of the
    /// current user's.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_dir: Option<PathBuf>,

    /// Strategy to match archive members to catalog entries on import.
    pub matching: MatchStrategy,
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("failed to read configuration file {}", path.display())]
    Read {
        #[source]
        source: std::io::Error,
        path: PathBuf,
    },

    /// Failed to deserialize configuration.
    #[error(transparent)]
    Deserialize(#[from] toml::de::Error),

    /// Failed to serialize configuration.
    #[error(transparent)]
    Serialize(#[from] toml::ser::Error),

    /// Failed to perform shell expansion on configuration.
    #[error(transparent)]
    ShellExpansion(#[from] shellexpand::LookupError<std::env::VarError>),
}

impl From<ConfigError> for FmtError {
    fn from(_: ConfigError) -> Self {
        FmtError
    }
}

/// Friendly result alias :3
type Result<T, E = ConfigError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use sealed_test::prelude::*;

    #[sealed_test(env = [("BLAH", "/home/blah")])]
    fn deserialize_config() -> anyhow::Result<()> {
        let result: Config = r#"
            [server]
            address = "0.0.0.0"
            port = 7784
            allowed_origins = ["http://localhost:5173"]
            upload_limit_mib = 8

            [files]
            home_dir = "$BLAH"
            matching = "exact"
        "#
        .parse()?;

        let expect = Config {
            server: ServerSettings {
                address: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
                port: 7784,
                allowed_origins: vec!["http://localhost:5173".into()],
                upload_limit_mib: 8,
            },
            files: FileSettings {
                home_dir: Some(PathBuf::from("/home/blah")),
                matching: MatchStrategy::Exact,
            },
        };

        assert_eq!(result, expect);

        Ok(())
    }

    #[test]
    fn deserialize_partial_config() -> anyhow::Result<()> {
        let result: Config = r#"
            [server]
            port = 9090
        "#
        .parse()?;

        let mut expect = Config::default();
        expect.server.port = 9090;

        assert_eq!(result, expect);
        assert_eq!(result.files.matching, MatchStrategy::Containment);

        Ok(())
    }

    #[test]
    fn serialize_config() {
        let result = Config {
            server: ServerSettings {
                address: IpAddr::V4(Ipv4Addr::LOCALHOST),
                port: 8080,
                allowed_origins: vec![
                    "http://localhost:5173".into(),
                    "http://localhost:3000".into(),
                ],
                upload_limit_mib: 32,
            },
            files: FileSettings {
                home_dir: Some(PathBuf::from("/home/blah")),
                matching: MatchStrategy::Containment,
            },
        }
        .to_string();

        let expect = indoc! {r#"
            [server]
            address = "127.0.0.1"
            port = 8080
            allowed_origins = [
                "http://localhost:5173",
                "http://localhost:3000",
            ]
            upload_limit_mib = 32

            [files]
            home_dir = "/home/blah"
            matching = "containment"
        "#};

        assert_eq!(result, expect);
    }

    #[test]
    fn load_missing_config_is_default() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let result = Config::load(dir.path().join("config.toml"))?;
        assert_eq!(result, Config::default());

        Ok(())
    }

    #[test]
    fn load_malformed_config() -> anyhow::Result<()> {
        let dir = tempfile::TempDir::new()?;
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ")?;

        let result = Config::load(&path);
        assert!(matches!(result, Err(ConfigError::Deserialize(_))));

        Ok(())
    }
}
