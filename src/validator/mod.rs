//! Address syntax validation (RFC 5321/5322 subset).
//!
//! [`validate_email`] returns every [`SyntaxIssue`] found in an address;
//! [`SyntaxValidator`] is the boolean capability consumed by the verification
//! pipeline, implemented here by [`RfcSyntax`].

mod domain;
mod local;
mod types;

pub use types::{SyntaxIssue, ValidationMode, ValidationReport};

use domain::{ascii_domain, domain_issues};
use local::local_part_ok;

pub(crate) use local::local_key;

const MAX_ADDRESS_LEN: usize = 254;
const MAX_LOCAL_LEN: usize = 64;

/// Boolean syntax check used as the first pipeline stage.
pub trait SyntaxValidator {
    fn is_valid(&self, address: &str) -> bool;
}

/// Grammar-based validator backed by [`validate_email`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RfcSyntax {
    pub mode: ValidationMode,
}

impl RfcSyntax {
    pub fn new(mode: ValidationMode) -> Self {
        Self { mode }
    }
}

impl SyntaxValidator for RfcSyntax {
    fn is_valid(&self, address: &str) -> bool {
        validate_email(address, self.mode).is_ok()
    }
}

pub fn validate_email(email: &str, mode: ValidationMode) -> ValidationReport {
    let input = email.trim();
    let mut issues = Vec::new();

    if input.len() > MAX_ADDRESS_LEN {
        issues.push(SyntaxIssue::TooLong { len: input.len() });
    }

    let found = input.matches('@').count();
    let Some((local, domain)) = input.split_once('@').filter(|_| found == 1) else {
        issues.push(SyntaxIssue::AtSignCount { found });
        return ValidationReport { issues };
    };

    if local.is_empty() || local.len() > MAX_LOCAL_LEN {
        issues.push(SyntaxIssue::LocalLength { len: local.len() });
    } else if !local_part_ok(local, mode) {
        issues.push(SyntaxIssue::LocalCharacters);
    }
    domain_issues(domain, &mut issues);

    ValidationReport { issues }
}

/// Splits `email` at its last `@` into the local part and the lower-cased
/// ASCII domain. `None` when either side is empty.
pub fn split_address(email: &str) -> Option<(&str, String)> {
    let (local, domain) = email.trim().rsplit_once('@')?;
    if local.is_empty() || domain.trim().is_empty() {
        return None;
    }
    Some((local, ascii_domain(domain)))
}
