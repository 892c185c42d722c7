use thiserror::Error;

#[derive(Debug, Error)]
pub enum WhoisError {
    #[error("could not resolve WHOIS server {server}: {source}")]
    Resolve {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("connection to WHOIS server {server} failed: {source}")]
    Connect {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
    #[error("WHOIS server {server} sent nothing before the read deadline")]
    Timeout { server: String },
}
