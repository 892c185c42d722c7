use std::borrow::Cow;
use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Configuration knobs for [`TcpSmtpProbe`](crate::smtp::TcpSmtpProbe).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpProbeOptions {
    pub port: u16,
    /// Name announced in `HELO`. The target domain is used when unset.
    pub helo_domain: Option<String>,
    pub connect_timeout: Duration,
    /// Read/write deadline applied to every command of the dialogue.
    pub command_timeout: Duration,
}

impl Default for SmtpProbeOptions {
    fn default() -> Self {
        Self {
            port: 25,
            helo_domain: None,
            connect_timeout: Duration::from_secs(10),
            command_timeout: Duration::from_secs(10),
        }
    }
}

impl SmtpProbeOptions {
    pub fn helo_name<'a>(&'a self, domain: &'a str) -> Cow<'a, str> {
        self.helo_domain
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(Cow::Borrowed)
            .unwrap_or(Cow::Borrowed(domain))
    }
}

/// Tunables of [`CatchAllDetector`](crate::smtp::CatchAllDetector).
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatchAllOptions {
    /// Local part assumed not to exist at the probed domain.
    pub fixed_local_part: String,
    /// Prefix of the generated, unique local part.
    pub random_prefix: String,
}

impl Default for CatchAllOptions {
    fn default() -> Self {
        Self {
            fixed_local_part: "test".to_string(),
            random_prefix: "invalid_test_".to_string(),
        }
    }
}
