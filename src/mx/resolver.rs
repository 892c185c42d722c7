use trust_dns_resolver::{
    Resolver,
    error::{ResolveError, ResolveErrorKind},
};

use super::{MxError, MxRecord, MxStatus};

/// Resolves the mail exchangers of a domain.
///
/// Implementations never fail: a domain without MX records and a resolver
/// error both yield an empty list, which callers treat as "not valid for
/// mail". Hosts are ordered by ascending preference.
pub trait MxResolver {
    fn resolve_mx(&self, domain: &str) -> Vec<String>;
}

impl<T: MxResolver + ?Sized> MxResolver for &T {
    fn resolve_mx(&self, domain: &str) -> Vec<String> {
        (**self).resolve_mx(domain)
    }
}

/// [`MxResolver`] backed by the system resolver configuration.
pub struct SystemMxResolver {
    resolver: Resolver,
}

impl SystemMxResolver {
    pub fn from_system_conf() -> Result<Self, MxError> {
        let resolver =
            Resolver::from_system_conf().map_err(|source| MxError::ResolverConfig { source })?;
        Ok(Self { resolver })
    }
}

impl std::fmt::Debug for SystemMxResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemMxResolver").finish_non_exhaustive()
    }
}

impl MxResolver for SystemMxResolver {
    fn resolve_mx(&self, domain: &str) -> Vec<String> {
        hosts_or_empty(&self.resolver, domain)
    }
}

pub(crate) fn hosts_or_empty<R: LookupMx>(resolver: &R, domain: &str) -> Vec<String> {
    match lookup_status(resolver, domain) {
        Ok(status) => {
            if matches!(status, MxStatus::NullMx) {
                tracing::debug!(domain, "domain publishes a null MX");
            }
            let hosts = status.hosts();
            tracing::debug!(domain, count = hosts.len(), "MX lookup finished");
            hosts
        }
        Err(err) => {
            tracing::debug!(domain, error = %err, "MX lookup failed, treating as no records");
            Vec::new()
        }
    }
}

pub(crate) fn lookup_status<R: LookupMx>(resolver: &R, domain: &str) -> Result<MxStatus, MxError> {
    let ascii = ascii_domain(domain)?;
    match resolver.lookup_mx(&ascii) {
        Ok(records) => Ok(MxStatus::from_records(records)),
        Err(err) if matches!(err.kind(), ResolveErrorKind::NoRecordsFound { .. }) => {
            Ok(MxStatus::NoRecords)
        }
        Err(source) => Err(MxError::Query {
            domain: ascii,
            source,
        }),
    }
}

fn ascii_domain(domain: &str) -> Result<String, MxError> {
    let trimmed = domain.trim().trim_end_matches('.');
    if trimmed.is_empty() {
        return Err(MxError::EmptyDomain);
    }
    idna::domain_to_ascii(trimmed).map_err(|source| MxError::Idna {
        domain: trimmed.to_string(),
        source,
    })
}

/// Exchange name as compared and dialled: no trailing dot, lower case.
pub(crate) fn normalize_exchange(exchange: &str) -> String {
    exchange.trim_end_matches('.').to_ascii_lowercase()
}

pub(crate) trait LookupMx {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError>;
}

impl LookupMx for Resolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        let lookup = self.mx_lookup(domain)?;
        Ok(lookup
            .iter()
            .map(|mx| MxRecord::new(mx.preference(), normalize_exchange(&mx.exchange().to_utf8())))
            .collect())
    }
}

#[cfg(test)]
impl LookupMx for crate::mx::tests::StubResolver {
    fn lookup_mx(&self, domain: &str) -> Result<Vec<MxRecord>, ResolveError> {
        (self.on_lookup)(domain)
    }
}
