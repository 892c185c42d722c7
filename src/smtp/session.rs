use std::io::{self, BufRead, BufReader, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use super::error::SmtpProbeError;
use super::types::SmtpReply;

pub(crate) struct SmtpSession {
    host: String,
    stream: TcpStream,
    reader: BufReader<TcpStream>,
}

impl SmtpSession {
    pub(crate) fn connect(
        host: &str,
        addrs: &[SocketAddr],
        connect_timeout: Duration,
        command_timeout: Duration,
    ) -> Result<Self, SmtpProbeError> {
        let mut last_err = None;
        for addr in addrs {
            match TcpStream::connect_timeout(addr, connect_timeout) {
                Ok(stream) => {
                    stream.set_read_timeout(Some(command_timeout))?;
                    stream.set_write_timeout(Some(command_timeout))?;
                    let reader = BufReader::new(stream.try_clone()?);
                    return Ok(Self {
                        host: host.to_string(),
                        stream,
                        reader,
                    });
                }
                Err(err) => last_err = Some(err),
            }
        }
        Err(SmtpProbeError::Connect {
            host: host.to_string(),
            source: last_err.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    "no socket address available",
                )
            }),
        })
    }

    pub(crate) fn read_reply(&mut self) -> Result<SmtpReply, SmtpProbeError> {
        let reply = read_reply(&mut self.reader)?;
        tracing::trace!(host = %self.host, code = reply.code, message = %reply.message, "S");
        Ok(reply)
    }

    /// Sends `command` and waits for its reply.
    pub(crate) fn command(&mut self, command: &str) -> Result<SmtpReply, SmtpProbeError> {
        self.send(command)?;
        self.read_reply()
    }

    /// Sends `QUIT` without waiting for the server's goodbye.
    pub(crate) fn quit(mut self) {
        if let Err(err) = self.send("QUIT") {
            tracing::trace!(host = %self.host, error = %err, "QUIT not delivered");
        }
    }

    fn send(&mut self, command: &str) -> Result<(), SmtpProbeError> {
        tracing::trace!(host = %self.host, command, "C");
        let mut line = command.as_bytes().to_vec();
        line.extend_from_slice(b"\r\n");
        self.stream.write_all(&line)?;
        self.stream.flush()?;
        Ok(())
    }
}

/// Reads one (possibly multi-line) SMTP reply. Continuation lines carry a `-`
/// after the status code; every line must repeat the same code.
///
/// Reply text is decoded lossily: servers announcing themselves in Latin-1
/// still yield a usable code.
pub(crate) fn read_reply<R: BufRead>(reader: &mut R) -> Result<SmtpReply, SmtpProbeError> {
    let mut code = None;
    let mut message_lines = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        let bytes = reader.read_until(b'\n', &mut line)?;
        if bytes == 0 {
            return Err(SmtpProbeError::Io {
                source: io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "connection closed while reading reply",
                ),
            });
        }
        let raw = String::from_utf8_lossy(&line);
        let raw = raw.trim_end_matches('\n').trim_end_matches('\r');

        let code_part = raw
            .get(..3)
            .ok_or_else(|| SmtpProbeError::protocol(format!("invalid SMTP reply: '{raw}'")))?;
        let parsed_code = code_part
            .parse::<u16>()
            .ok()
            .filter(|code| (100..600).contains(code))
            .ok_or_else(|| {
                SmtpProbeError::protocol(format!("invalid SMTP status code: '{code_part}'"))
            })?;
        match code {
            Some(existing) if existing != parsed_code => {
                return Err(SmtpProbeError::protocol(format!(
                    "inconsistent SMTP reply codes: {existing} vs {parsed_code}"
                )));
            }
            Some(_) => {}
            None => code = Some(parsed_code),
        }
        let continuation = raw.as_bytes().get(3).copied() == Some(b'-');
        message_lines.push(raw.get(4..).unwrap_or_default().to_string());
        if !continuation {
            break;
        }
    }
    Ok(SmtpReply {
        code: code.unwrap_or_default(),
        message: message_lines.join("\n"),
    })
}
