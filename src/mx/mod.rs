//! DNS MX resolution.
//!
//! [`MxResolver`] is the seam used by the SMTP probe and the verification
//! pipeline; [`SystemMxResolver`] implements it on top of the system
//! resolver. Null MX records (RFC 7505) count as no exchanger.

mod error;
mod resolver;
mod types;

pub use error::MxError;
pub use resolver::{MxResolver, SystemMxResolver};
pub(crate) use types::{MxRecord, MxStatus};
