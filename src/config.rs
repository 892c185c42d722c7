//! Engine settings.
//!
//! [`EngineConfig::default`] carries the built-in values. With the
//! `with-serde` feature a TOML file can override any of them:
//!
//! ```toml
//! [sender]
//! from_address = "verify@example.com"
//!
//! [smtp]
//! command_timeout_secs = 5
//! catch_all_local_part = "test"
//!
//! [roles]
//! local_parts = ["admin", "sales"]
//!
//! [batch]
//! row_cap = 500
//! delimiter = ","
//! ```

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::mx::{MxError, SystemMxResolver};
use crate::pipeline::{DEFAULT_ROLE_BASED_LOCAL_PARTS, EmailVerificationPipeline, RoleBasedLocalParts};
use crate::smtp::{CatchAllDetector, CatchAllOptions, SmtpProbeOptions, TcpSmtpProbe};
use crate::validator::{RfcSyntax, ValidationMode};
use crate::whois::{TcpWhoisClient, WhoisOptions};

pub const DEFAULT_FROM_ADDRESS: &str = "verify@localhost";
pub const DEFAULT_BATCH_ROW_CAP: usize = 2000;
pub const DEFAULT_CSV_DELIMITER: u8 = b';';

/// Pipeline wired to the system resolver, plain TCP SMTP and WHOIS.
pub type SystemPipeline = EmailVerificationPipeline<
    RfcSyntax,
    SystemMxResolver,
    TcpSmtpProbe<SystemMxResolver>,
    TcpWhoisClient,
>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[cfg(feature = "with-serde")]
    #[error("invalid config {origin}: {source}")]
    Parse {
        origin: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Envelope sender used for every SMTP probe.
    pub from_address: String,
    pub validation_mode: ValidationMode,
    pub role_based_local_parts: Vec<String>,
    pub smtp: SmtpProbeOptions,
    pub catch_all: CatchAllOptions,
    pub whois: WhoisOptions,
    pub batch_row_cap: usize,
    pub csv_delimiter: u8,
    pub csv_has_headers: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            from_address: DEFAULT_FROM_ADDRESS.to_string(),
            validation_mode: ValidationMode::Strict,
            role_based_local_parts: DEFAULT_ROLE_BASED_LOCAL_PARTS
                .iter()
                .map(|part| part.to_string())
                .collect(),
            smtp: SmtpProbeOptions::default(),
            catch_all: CatchAllOptions::default(),
            whois: WhoisOptions::default(),
            batch_row_cap: DEFAULT_BATCH_ROW_CAP,
            csv_delimiter: DEFAULT_CSV_DELIMITER,
            csv_has_headers: false,
        }
    }
}

impl EngineConfig {
    pub fn role_parts(&self) -> RoleBasedLocalParts {
        RoleBasedLocalParts::new(&self.role_based_local_parts)
    }

    pub fn set_from_address(&mut self, from: &str) -> Result<(), ConfigError> {
        let from = from.trim();
        if from.is_empty() || !from.contains('@') {
            return Err(ConfigError::invalid(
                "from_address",
                format!("`{from}` is not an email address"),
            ));
        }
        self.from_address = from.to_string();
        Ok(())
    }

    #[cfg(feature = "with-csv")]
    pub fn batch_options(&self) -> crate::batch::BatchOptions {
        crate::batch::BatchOptions {
            row_cap: self.batch_row_cap,
            delimiter: self.csv_delimiter,
            has_headers: self.csv_has_headers,
        }
    }

    /// Builds the network-backed pipeline. Fails when the system resolver
    /// configuration cannot be read.
    pub fn build_pipeline(&self) -> Result<SystemPipeline, MxError> {
        let probe = TcpSmtpProbe::new(SystemMxResolver::from_system_conf()?, self.smtp.clone());
        let pipeline = EmailVerificationPipeline::new(
            RfcSyntax::new(self.validation_mode),
            SystemMxResolver::from_system_conf()?,
            probe,
            TcpWhoisClient::new(self.whois.clone()),
        )
        .with_catch_all(CatchAllDetector::new(self.catch_all.clone()));
        Ok(pipeline)
    }
}

/// Parses a CSV delimiter given as a single ASCII character.
pub fn parse_delimiter(value: &str) -> Result<u8, ConfigError> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() && *byte != b'"' && *byte != b'\n' => Ok(*byte),
        _ => Err(ConfigError::invalid(
            "delimiter",
            format!("`{value}` is not a single ASCII character"),
        )),
    }
}

#[cfg(feature = "with-serde")]
pub use file::ConfigFile;

#[cfg(feature = "with-serde")]
mod file {
    use std::path::Path;

    use serde::Deserialize;

    use super::*;

    /// Layout of the TOML configuration file. Every key is optional.
    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    pub struct ConfigFile {
        #[serde(default)]
        sender: SenderConfig,
        #[serde(default)]
        validation: ValidationConfig,
        #[serde(default)]
        smtp: SmtpConfig,
        #[serde(default)]
        whois: WhoisConfig,
        #[serde(default)]
        roles: RolesConfig,
        #[serde(default)]
        batch: BatchConfig,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct SenderConfig {
        from_address: Option<String>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct ValidationConfig {
        mode: Option<ValidationMode>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct SmtpConfig {
        port: Option<u16>,
        helo_domain: Option<String>,
        connect_timeout_secs: Option<u64>,
        command_timeout_secs: Option<u64>,
        catch_all_local_part: Option<String>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct WhoisConfig {
        server: Option<String>,
        port: Option<u16>,
        connect_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
        read_deadline_secs: Option<u64>,
        max_response_bytes: Option<usize>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct RolesConfig {
        local_parts: Option<Vec<String>>,
    }

    #[derive(Deserialize, Debug, Default, Clone)]
    #[serde(deny_unknown_fields)]
    struct BatchConfig {
        row_cap: Option<usize>,
        delimiter: Option<String>,
        has_headers: Option<bool>,
    }

    impl ConfigFile {
        pub fn parse(text: &str, origin: &str) -> Result<Self, ConfigError> {
            toml::from_str(text).map_err(|source| ConfigError::Parse {
                origin: origin.to_string(),
                source,
            })
        }
    }

    impl EngineConfig {
        /// Defaults overridden by the file at `path`.
        pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
            let path = path.as_ref();
            let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            let file = ConfigFile::parse(&text, &path.display().to_string())?;
            let mut config = Self::default();
            config.apply(file)?;
            tracing::debug!(path = %path.display(), "configuration loaded");
            Ok(config)
        }

        pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
            let mut config = Self::default();
            config.apply(ConfigFile::parse(text, "<inline>")?)?;
            Ok(config)
        }

        /// Overrides every value present in `file`.
        pub fn apply(&mut self, file: ConfigFile) -> Result<(), ConfigError> {
            if let Some(from) = file.sender.from_address.as_deref() {
                self.set_from_address(from)?;
            }
            if let Some(mode) = file.validation.mode {
                self.validation_mode = mode;
            }

            let smtp = file.smtp;
            if let Some(port) = smtp.port {
                self.smtp.port = port;
            }
            if smtp.helo_domain.is_some() {
                self.smtp.helo_domain = smtp.helo_domain;
            }
            if let Some(secs) = smtp.connect_timeout_secs {
                self.smtp.connect_timeout = seconds("smtp.connect_timeout_secs", secs)?;
            }
            if let Some(secs) = smtp.command_timeout_secs {
                self.smtp.command_timeout = seconds("smtp.command_timeout_secs", secs)?;
            }
            if let Some(local) = smtp.catch_all_local_part {
                if local.trim().is_empty() || local.contains('@') {
                    return Err(ConfigError::invalid(
                        "smtp.catch_all_local_part",
                        "must be a non-empty local part",
                    ));
                }
                self.catch_all.fixed_local_part = local.trim().to_string();
            }

            let whois = file.whois;
            if let Some(server) = whois.server {
                self.whois.server = server;
            }
            if let Some(port) = whois.port {
                self.whois.port = port;
            }
            if let Some(secs) = whois.connect_timeout_secs {
                self.whois.connect_timeout = seconds("whois.connect_timeout_secs", secs)?;
            }
            if let Some(secs) = whois.idle_timeout_secs {
                self.whois.idle_timeout = seconds("whois.idle_timeout_secs", secs)?;
            }
            if let Some(secs) = whois.read_deadline_secs {
                self.whois.read_deadline = seconds("whois.read_deadline_secs", secs)?;
            }
            if let Some(max) = whois.max_response_bytes {
                self.whois.max_response_bytes = max;
            }

            if let Some(parts) = file.roles.local_parts {
                self.role_based_local_parts = parts;
            }

            let batch = file.batch;
            if let Some(cap) = batch.row_cap {
                self.batch_row_cap = cap;
            }
            if let Some(delimiter) = batch.delimiter.as_deref() {
                self.csv_delimiter = parse_delimiter(delimiter)?;
            }
            if let Some(has_headers) = batch.has_headers {
                self.csv_has_headers = has_headers;
            }
            Ok(())
        }
    }

    fn seconds(field: &'static str, secs: u64) -> Result<Duration, ConfigError> {
        if secs == 0 {
            return Err(ConfigError::invalid(field, "timeouts must be at least one second"));
        }
        Ok(Duration::from_secs(secs))
    }
}
