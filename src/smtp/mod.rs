//! SMTP mailbox probing and catch-all detection.
//!
//! [`TcpSmtpProbe`] executes a minimal plain-text dialogue against the
//! preferred MX host of a domain and reports whether `RCPT TO` was accepted.
//! [`CatchAllDetector`] builds on any [`SmtpProbe`] to classify domains that
//! accept every recipient.

mod catch_all;
mod error;
mod options;
mod probe;
mod session;
mod types;
mod util;

pub use catch_all::CatchAllDetector;
pub use error::SmtpProbeError;
pub use options::{CatchAllOptions, SmtpProbeOptions};
pub use probe::{SmtpProbe, TcpSmtpProbe};
pub use types::{ReplyClass, SmtpReply};

#[cfg(test)]
mod tests;
