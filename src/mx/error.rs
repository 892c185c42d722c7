use thiserror::Error;
use trust_dns_resolver::error::ResolveError;

#[derive(Debug, Error)]
pub enum MxError {
    #[error("no domain to look up")]
    EmptyDomain,
    #[error("`{domain}` has no ASCII form: {source}")]
    Idna {
        domain: String,
        #[source]
        source: idna::Errors,
    },
    #[error("cannot load system resolver configuration: {source}")]
    ResolverConfig {
        #[source]
        source: std::io::Error,
    },
    #[error("MX query for {domain} failed: {source}")]
    Query {
        domain: String,
        #[source]
        source: ResolveError,
    },
}
