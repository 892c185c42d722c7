use std::fmt;

/// Stages of [`EmailVerificationPipeline`](super::EmailVerificationPipeline),
/// in execution order.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    SyntaxCheck,
    CacheLookup,
    DnsCheck,
    SmtpCheck,
    CatchAllCheck,
    WhoisCheck,
    CacheStore,
    RoleCheck,
}

/// What a stage hands over to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Next(Stage),
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SyntaxCheck => "syntax",
            Self::CacheLookup => "cache-lookup",
            Self::DnsCheck => "dns",
            Self::SmtpCheck => "smtp",
            Self::CatchAllCheck => "catch-all",
            Self::WhoisCheck => "whois",
            Self::CacheStore => "cache-store",
            Self::RoleCheck => "role",
        })
    }
}
