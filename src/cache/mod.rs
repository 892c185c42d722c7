//! Run-scoped, write-once store of per-domain verification facts.

use std::collections::HashMap;

use chrono::NaiveDate;

/// Network-derived facts about one domain, shared by every address at that
/// domain within a run.
///
/// `smtp_accepted` is the `RCPT TO` outcome of the *first* address verified
/// at the domain and is reused for every later address there, whatever its
/// local part.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DomainFacts {
    pub dns_mx_valid: bool,
    pub smtp_accepted: bool,
    pub catch_all: bool,
    pub domain_creation_date: Option<NaiveDate>,
    pub domain_age_days: Option<i64>,
}

impl DomainFacts {
    /// Facts of a domain without mail exchangers.
    pub fn no_mail_exchanger() -> Self {
        Self::default()
    }
}

/// Storage seam for [`DomainFacts`]. Domains are compared case-insensitively.
pub trait DomainCache {
    fn get(&self, domain: &str) -> Option<DomainFacts>;
    /// Stores facts for a domain seen for the first time. Facts already
    /// stored for the domain are kept.
    fn put(&mut self, domain: &str, facts: DomainFacts);
}

/// In-memory [`DomainCache`] living as long as one verification run.
///
/// Entries are never updated, evicted or persisted.
#[derive(Debug, Default, Clone)]
pub struct DomainVerificationCache {
    entries: HashMap<String, DomainFacts>,
}

impl DomainVerificationCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl DomainCache for DomainVerificationCache {
    fn get(&self, domain: &str) -> Option<DomainFacts> {
        self.entries.get(&cache_key(domain)).cloned()
    }

    fn put(&mut self, domain: &str, facts: DomainFacts) {
        let key = cache_key(domain);
        if self.entries.contains_key(&key) {
            tracing::warn!(domain = %key, "domain facts already cached, keeping first entry");
            return;
        }
        self.entries.insert(key, facts);
    }
}

fn cache_key(domain: &str) -> String {
    domain.trim().to_lowercase()
}
