//! Per-address verification pipeline.
//!
//! [`EmailVerificationPipeline`] drives one address through the stages of
//! [`Stage`]: syntax, domain cache, MX lookup, SMTP probe, catch-all
//! detection, WHOIS age, cache store and role classification. Network facts
//! are computed at most once per domain within a run and reused from the
//! [`DomainCache`] afterwards.

mod stage;
mod types;

pub use stage::{Stage, Transition};
pub use types::{DEFAULT_ROLE_BASED_LOCAL_PARTS, RoleBasedLocalParts, VerificationVerdict};

use chrono::{DateTime, Utc};

use crate::cache::{DomainCache, DomainFacts, DomainVerificationCache};
use crate::mx::MxResolver;
use crate::smtp::{CatchAllDetector, SmtpProbe};
use crate::validator::{SyntaxValidator, split_address};
use crate::whois::{WhoisClient, age_in_days};

/// Anything able to turn an address into a verdict.
pub trait Verifier {
    fn verify(&mut self, email: &str) -> VerificationVerdict;
}

/// Orchestrates the verification stages over injected capabilities.
///
/// The pipeline itself holds no per-run state: the domain cache, sender
/// address and role list are passed to [`verify`](Self::verify), or bundled
/// once in a [`VerificationRun`].
#[derive(Debug, Clone)]
pub struct EmailVerificationPipeline<V, R, P, W> {
    syntax: V,
    resolver: R,
    probe: P,
    whois: W,
    catch_all: CatchAllDetector,
    clock: fn() -> DateTime<Utc>,
}

/// Address being verified and the facts gathered so far.
struct Progress<'a> {
    email: &'a str,
    local: &'a str,
    domain: String,
    syntax_valid: bool,
    role_based: bool,
    facts: DomainFacts,
}

impl<'a> Progress<'a> {
    fn new(email: &'a str) -> Self {
        Self {
            email,
            local: "",
            domain: String::new(),
            syntax_valid: false,
            role_based: false,
            facts: DomainFacts::default(),
        }
    }

    fn into_verdict(self) -> VerificationVerdict {
        if self.syntax_valid {
            VerificationVerdict::from_facts(self.email, self.facts, self.role_based)
        } else {
            VerificationVerdict::invalid_syntax(self.email)
        }
    }
}

impl<V, R, P, W> EmailVerificationPipeline<V, R, P, W>
where
    V: SyntaxValidator,
    R: MxResolver,
    P: SmtpProbe,
    W: WhoisClient,
{
    pub fn new(syntax: V, resolver: R, probe: P, whois: W) -> Self {
        Self {
            syntax,
            resolver,
            probe,
            whois,
            catch_all: CatchAllDetector::default(),
            clock: Utc::now,
        }
    }

    pub fn with_catch_all(mut self, detector: CatchAllDetector) -> Self {
        self.catch_all = detector;
        self
    }

    /// Replaces the clock used to compute domain ages.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Starts a run with a fresh [`DomainVerificationCache`].
    pub fn run(
        &self,
        from: impl Into<String>,
        roles: RoleBasedLocalParts,
    ) -> VerificationRun<'_, V, R, P, W> {
        VerificationRun::new(self, from, roles, DomainVerificationCache::new())
    }

    pub fn verify<C>(
        &self,
        email: &str,
        from: &str,
        roles: &RoleBasedLocalParts,
        cache: &mut C,
    ) -> VerificationVerdict
    where
        C: DomainCache + ?Sized,
    {
        self.verify_traced(email, from, roles, cache).0
    }

    /// Same as [`verify`](Self::verify), also returning the stages visited.
    pub fn verify_traced<C>(
        &self,
        email: &str,
        from: &str,
        roles: &RoleBasedLocalParts,
        cache: &mut C,
    ) -> (VerificationVerdict, Vec<Stage>)
    where
        C: DomainCache + ?Sized,
    {
        let email = email.trim();
        let mut progress = Progress::new(email);
        let mut trace = Vec::new();
        let mut stage = Stage::SyntaxCheck;

        loop {
            trace.push(stage);
            tracing::trace!(email, %stage, "entering stage");
            match self.step(stage, &mut progress, from, roles, cache) {
                Transition::Next(next) => stage = next,
                Transition::Done => break,
            }
        }

        let verdict = progress.into_verdict();
        tracing::debug!(
            email,
            syntax_valid = verdict.syntax_valid,
            dns_mx_valid = verdict.dns_mx_valid,
            smtp_accepted = verdict.smtp_accepted,
            catch_all = verdict.catch_all,
            role_based = verdict.role_based,
            "verification finished"
        );
        (verdict, trace)
    }

    fn step<C>(
        &self,
        stage: Stage,
        progress: &mut Progress<'_>,
        from: &str,
        roles: &RoleBasedLocalParts,
        cache: &mut C,
    ) -> Transition
    where
        C: DomainCache + ?Sized,
    {
        match stage {
            Stage::SyntaxCheck => {
                if !self.syntax.is_valid(progress.email) {
                    return Transition::Done;
                }
                let Some((local, domain)) = split_address(progress.email) else {
                    return Transition::Done;
                };
                progress.local = local;
                progress.domain = domain;
                progress.syntax_valid = true;
                Transition::Next(Stage::CacheLookup)
            }
            Stage::CacheLookup => match cache.get(&progress.domain) {
                Some(facts) => {
                    tracing::debug!(domain = %progress.domain, "domain facts served from cache");
                    progress.facts = facts;
                    Transition::Next(Stage::RoleCheck)
                }
                None => Transition::Next(Stage::DnsCheck),
            },
            Stage::DnsCheck => {
                if self.resolver.resolve_mx(&progress.domain).is_empty() {
                    progress.facts = DomainFacts::no_mail_exchanger();
                    Transition::Next(Stage::CacheStore)
                } else {
                    progress.facts.dns_mx_valid = true;
                    Transition::Next(Stage::SmtpCheck)
                }
            }
            Stage::SmtpCheck => {
                progress.facts.smtp_accepted =
                    self.probe.probe(from, progress.email, &progress.domain);
                Transition::Next(Stage::CatchAllCheck)
            }
            Stage::CatchAllCheck => {
                progress.facts.catch_all = self.catch_all.detect(&self.probe, &progress.domain, from);
                Transition::Next(Stage::WhoisCheck)
            }
            Stage::WhoisCheck => {
                let created = self.whois.lookup_creation_date(&progress.domain);
                progress.facts.domain_creation_date = created;
                progress.facts.domain_age_days = created.map(|date| age_in_days(date, (self.clock)()));
                Transition::Next(Stage::CacheStore)
            }
            Stage::CacheStore => {
                cache.put(&progress.domain, progress.facts.clone());
                Transition::Next(Stage::RoleCheck)
            }
            Stage::RoleCheck => {
                progress.role_based = roles.contains(progress.local);
                Transition::Done
            }
        }
    }
}

/// One verification run: a pipeline plus the sender address, role list and
/// domain cache shared by every address verified through it.
pub struct VerificationRun<'p, V, R, P, W, C = DomainVerificationCache> {
    pipeline: &'p EmailVerificationPipeline<V, R, P, W>,
    from: String,
    roles: RoleBasedLocalParts,
    cache: C,
}

impl<'p, V, R, P, W, C> VerificationRun<'p, V, R, P, W, C>
where
    V: SyntaxValidator,
    R: MxResolver,
    P: SmtpProbe,
    W: WhoisClient,
    C: DomainCache,
{
    pub fn new(
        pipeline: &'p EmailVerificationPipeline<V, R, P, W>,
        from: impl Into<String>,
        roles: RoleBasedLocalParts,
        cache: C,
    ) -> Self {
        Self {
            pipeline,
            from: from.into(),
            roles,
            cache,
        }
    }

    pub fn from_address(&self) -> &str {
        &self.from
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn into_cache(self) -> C {
        self.cache
    }
}

impl<V, R, P, W, C> Verifier for VerificationRun<'_, V, R, P, W, C>
where
    V: SyntaxValidator,
    R: MxResolver,
    P: SmtpProbe,
    W: WhoisClient,
    C: DomainCache,
{
    fn verify(&mut self, email: &str) -> VerificationVerdict {
        self.pipeline
            .verify(email, &self.from, &self.roles, &mut self.cache)
    }
}

impl<T: Verifier + ?Sized> Verifier for &mut T {
    fn verify(&mut self, email: &str) -> VerificationVerdict {
        (**self).verify(email)
    }
}

#[cfg(test)]
mod tests;
