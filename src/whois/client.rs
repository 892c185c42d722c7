use std::io::{self, Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::{Duration, Instant};

use chrono::NaiveDate;

use super::error::WhoisError;
use super::options::WhoisOptions;
use super::parse::creation_date;

const MIN_WAIT: Duration = Duration::from_millis(1);

/// Looks up the registration date of a domain.
pub trait WhoisClient {
    /// `None` when the registry has no date for the domain or could not be
    /// reached.
    fn lookup_creation_date(&self, domain: &str) -> Option<NaiveDate>;
}

impl<T: WhoisClient + ?Sized> WhoisClient for &T {
    fn lookup_creation_date(&self, domain: &str) -> Option<NaiveDate> {
        (**self).lookup_creation_date(domain)
    }
}

/// RFC 3912 client: one line query, raw text answer, end of data signalled
/// by the server closing the connection (or by the configured deadlines).
#[derive(Debug, Clone, Default)]
pub struct TcpWhoisClient {
    options: WhoisOptions,
}

impl TcpWhoisClient {
    pub fn new(options: WhoisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &WhoisOptions {
        &self.options
    }

    /// Sends `domain` and returns the raw response text.
    ///
    /// When the idle timeout or the overall deadline fires after some data
    /// arrived, the partial response is returned.
    pub fn query(&self, domain: &str) -> Result<String, WhoisError> {
        let mut stream = self.connect()?;
        stream.write_all(format!("{domain}\r\n").as_bytes())?;
        stream.flush()?;

        let started = Instant::now();
        let mut response = Vec::new();
        let mut chunk = [0u8; 4096];
        let mut timed_out = false;
        loop {
            let Some(remaining) = self.options.read_deadline.checked_sub(started.elapsed()) else {
                timed_out = true;
                break;
            };
            let wait = remaining.min(self.options.idle_timeout).max(MIN_WAIT);
            stream.set_read_timeout(Some(wait))?;

            match stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(read) => {
                    response.extend_from_slice(&chunk[..read]);
                    if response.len() >= self.options.max_response_bytes {
                        response.truncate(self.options.max_response_bytes);
                        tracing::debug!(server = %self.options.server, domain, "WHOIS response truncated");
                        break;
                    }
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                Err(err) if is_timeout(&err) => {
                    timed_out = true;
                    break;
                }
                Err(err) => return Err(err.into()),
            }
        }

        if timed_out {
            tracing::debug!(
                server = %self.options.server,
                domain,
                bytes = response.len(),
                "WHOIS server stopped sending before closing"
            );
            if response.is_empty() {
                return Err(WhoisError::Timeout {
                    server: self.options.server.clone(),
                });
            }
        }
        Ok(String::from_utf8_lossy(&response).into_owned())
    }

    fn connect(&self) -> Result<TcpStream, WhoisError> {
        let server = &self.options.server;
        let addrs = (server.as_str(), self.options.port)
            .to_socket_addrs()
            .map_err(|source| WhoisError::Resolve {
                server: server.clone(),
                source,
            })?;

        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, self.options.connect_timeout) {
                Ok(stream) => {
                    stream.set_write_timeout(Some(self.options.idle_timeout))?;
                    return Ok(stream);
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(WhoisError::Connect {
            server: server.clone(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(io::ErrorKind::AddrNotAvailable, "no socket address available")
            }),
        })
    }
}

impl WhoisClient for TcpWhoisClient {
    fn lookup_creation_date(&self, domain: &str) -> Option<NaiveDate> {
        match self.query(domain) {
            Ok(response) => {
                let date = creation_date(&response);
                if date.is_none() {
                    tracing::debug!(domain, bytes = response.len(), "no creation date in WHOIS response");
                }
                date
            }
            Err(err) => {
                tracing::debug!(domain, error = %err, "WHOIS lookup failed");
                None
            }
        }
    }
}

fn is_timeout(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
