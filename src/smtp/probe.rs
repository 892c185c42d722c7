use crate::mx::MxResolver;

use super::error::SmtpProbeError;
use super::options::SmtpProbeOptions;
use super::session::SmtpSession;
use super::types::{ReplyClass, SmtpReply};
use super::util::resolve_socket_addrs;

/// Single best-effort `RCPT TO` check of one mailbox.
///
/// Returns `true` only when the mail exchanger answered `RCPT TO` with `250`
/// or `251`. Every other reply and every failure along the way is `false`.
pub trait SmtpProbe {
    fn probe(&self, from: &str, target: &str, domain: &str) -> bool;
}

impl<T: SmtpProbe + ?Sized> SmtpProbe for &T {
    fn probe(&self, from: &str, target: &str, domain: &str) -> bool {
        (**self).probe(from, target, domain)
    }
}

/// [`SmtpProbe`] speaking plain SMTP to the preferred MX host over TCP.
///
/// One connection per call: greeting, `HELO`, `MAIL FROM`, `RCPT TO`,
/// `QUIT`. No retry and no fallback to secondary exchangers.
#[derive(Debug, Clone)]
pub struct TcpSmtpProbe<R> {
    resolver: R,
    options: SmtpProbeOptions,
}

impl<R: MxResolver> TcpSmtpProbe<R> {
    pub fn new(resolver: R, options: SmtpProbeOptions) -> Self {
        Self { resolver, options }
    }

    pub fn options(&self) -> &SmtpProbeOptions {
        &self.options
    }

    /// Runs the dialogue and returns the server's answer to `RCPT TO`.
    pub fn rcpt_reply(
        &self,
        from: &str,
        target: &str,
        domain: &str,
    ) -> Result<SmtpReply, SmtpProbeError> {
        let hosts = self.resolver.resolve_mx(domain);
        let host = hosts.first().ok_or_else(|| SmtpProbeError::NoMailServer {
            domain: domain.to_string(),
        })?;
        self.dialogue(host, from, target, domain)
    }

    fn dialogue(
        &self,
        host: &str,
        from: &str,
        target: &str,
        domain: &str,
    ) -> Result<SmtpReply, SmtpProbeError> {
        let addrs = resolve_socket_addrs(host, self.options.port).map_err(|source| {
            SmtpProbeError::AddressResolution {
                host: host.to_string(),
                source,
            }
        })?;
        let mut session = SmtpSession::connect(
            host,
            &addrs,
            self.options.connect_timeout,
            self.options.command_timeout,
        )?;

        session.read_reply()?;
        session.command(&format!("HELO {}", self.options.helo_name(domain)))?;
        session.command(&format!("MAIL FROM:<{from}>"))?;
        let rcpt = session.command(&format!("RCPT TO:<{target}>"))?;
        session.quit();
        Ok(rcpt)
    }
}

impl<R: MxResolver> SmtpProbe for TcpSmtpProbe<R> {
    fn probe(&self, from: &str, target: &str, domain: &str) -> bool {
        match self.rcpt_reply(from, target, domain) {
            Ok(reply) => {
                let class = reply.class();
                match class {
                    ReplyClass::Deferred => tracing::info!(
                        target_address = target,
                        code = reply.code,
                        message = %reply.message,
                        "RCPT TO deferred, counted as not accepted"
                    ),
                    _ => tracing::debug!(
                        target_address = target,
                        code = reply.code,
                        ?class,
                        "RCPT TO answered"
                    ),
                }
                class == ReplyClass::Accepted
            }
            Err(err) => {
                tracing::debug!(target_address = target, error = %err, "SMTP probe failed");
                false
            }
        }
    }
}
