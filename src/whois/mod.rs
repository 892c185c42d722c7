//! WHOIS (RFC 3912) creation-date lookup.

mod client;
mod error;
mod options;
mod parse;

pub use client::{TcpWhoisClient, WhoisClient};
pub use error::WhoisError;
pub use options::WhoisOptions;
pub use parse::{age_in_days, creation_date};
