use std::time::Duration;

#[cfg(feature = "with-serde")]
use serde::{Deserialize, Serialize};

/// Endpoint and deadlines of [`TcpWhoisClient`](crate::whois::TcpWhoisClient).
///
/// A single registry is queried for every domain; domains registered
/// elsewhere usually come back without a creation date.
#[cfg_attr(feature = "with-serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WhoisOptions {
    pub server: String,
    pub port: u16,
    pub connect_timeout: Duration,
    /// Longest silence tolerated between two reads.
    pub idle_timeout: Duration,
    /// Upper bound on the whole exchange, however chatty the server is.
    pub read_deadline: Duration,
    pub max_response_bytes: usize,
}

impl Default for WhoisOptions {
    fn default() -> Self {
        Self {
            server: "whois.verisign-grs.com".to_string(),
            port: 43,
            connect_timeout: Duration::from_secs(10),
            idle_timeout: Duration::from_secs(10),
            read_deadline: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}
