use thiserror::Error;

/// Failures of a single SMTP dialogue. They never reach the pipeline: the
/// probe logs them and reports the mailbox as not accepted.
#[derive(Debug, Error)]
pub enum SmtpProbeError {
    #[error("no MX host published for {domain}")]
    NoMailServer { domain: String },
    #[error("could not resolve socket address of {host}: {source}")]
    AddressResolution {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to {host} failed: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("protocol error: {0}")]
    Protocol(String),
}

impl SmtpProbeError {
    pub(crate) fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol(message.into())
    }
}
