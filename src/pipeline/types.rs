use std::collections::HashSet;

use chrono::NaiveDate;

use crate::cache::DomainFacts;
use crate::validator::local_key;

/// Local parts treated as functions or teams rather than people.
pub const DEFAULT_ROLE_BASED_LOCAL_PARTS: &[&str] = &[
    "admin",
    "administrator",
    "postmaster",
    "hostmaster",
    "webmaster",
    "info",
    "help",
    "billing",
    "contact",
    "sales",
    "support",
    "suporte",
    "op",
];

/// Outcome of verifying one address.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationVerdict {
    pub email: String,
    pub syntax_valid: bool,
    pub dns_mx_valid: bool,
    pub smtp_accepted: bool,
    pub role_based: bool,
    pub catch_all: bool,
    pub domain_creation_date: Option<NaiveDate>,
    pub domain_age_days: Option<i64>,
}

impl VerificationVerdict {
    /// Verdict of an address rejected by the syntax check.
    pub fn invalid_syntax(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            syntax_valid: false,
            dns_mx_valid: false,
            smtp_accepted: false,
            role_based: false,
            catch_all: false,
            domain_creation_date: None,
            domain_age_days: None,
        }
    }

    pub(crate) fn from_facts(email: impl Into<String>, facts: DomainFacts, role_based: bool) -> Self {
        Self {
            email: email.into(),
            syntax_valid: true,
            dns_mx_valid: facts.dns_mx_valid,
            smtp_accepted: facts.smtp_accepted,
            role_based,
            catch_all: facts.catch_all,
            domain_creation_date: facts.domain_creation_date,
            domain_age_days: facts.domain_age_days,
        }
    }

    /// Gating decision used when storing records: syntax, MX and SMTP must
    /// all pass. Catch-all and role-based flags are advisory.
    pub fn is_valid(&self) -> bool {
        self.syntax_valid && self.dns_mx_valid && self.smtp_accepted
    }
}

/// Case-insensitive set of role-based local parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleBasedLocalParts {
    parts: HashSet<String>,
}

impl RoleBasedLocalParts {
    pub fn new<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|part| local_key(part.as_ref()))
                .filter(|part| !part.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, local_part: &str) -> bool {
        self.parts.contains(&local_key(local_part))
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

impl Default for RoleBasedLocalParts {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_BASED_LOCAL_PARTS)
    }
}

impl<S: AsRef<str>> FromIterator<S> for RoleBasedLocalParts {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}
