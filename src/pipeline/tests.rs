use std::cell::RefCell;
use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;

use super::*;
use crate::validator::RfcSyntax;

#[derive(Default)]
struct CountingResolver {
    hosts: HashMap<String, Vec<String>>,
    calls: RefCell<Vec<String>>,
}

impl CountingResolver {
    fn with_mx(domain: &str, host: &str) -> Self {
        let mut hosts = HashMap::new();
        hosts.insert(domain.to_string(), vec![host.to_string()]);
        Self {
            hosts,
            calls: RefCell::default(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl MxResolver for CountingResolver {
    fn resolve_mx(&self, domain: &str) -> Vec<String> {
        self.calls.borrow_mut().push(domain.to_string());
        self.hosts.get(domain).cloned().unwrap_or_default()
    }
}

/// Accepts every recipient whose local part is not listed in `rejected`.
#[derive(Default)]
struct CountingProbe {
    rejected: Vec<&'static str>,
    accept_nothing: bool,
    targets: RefCell<Vec<String>>,
}

impl CountingProbe {
    fn accepting_all() -> Self {
        Self::default()
    }

    fn rejecting(rejected: Vec<&'static str>) -> Self {
        Self {
            rejected,
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.targets.borrow().len()
    }
}

impl SmtpProbe for CountingProbe {
    fn probe(&self, _from: &str, target: &str, _domain: &str) -> bool {
        self.targets.borrow_mut().push(target.to_string());
        let local = target.rsplit_once('@').map_or(target, |(local, _)| local);
        !self.accept_nothing && !self.rejected.contains(&local)
    }
}

#[derive(Default)]
struct CountingWhois {
    created: Option<NaiveDate>,
    calls: RefCell<Vec<String>>,
}

impl CountingWhois {
    fn created(date: NaiveDate) -> Self {
        Self {
            created: Some(date),
            calls: RefCell::default(),
        }
    }

    fn calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl WhoisClient for CountingWhois {
    fn lookup_creation_date(&self, domain: &str) -> Option<NaiveDate> {
        self.calls.borrow_mut().push(domain.to_string());
        self.created
    }
}

fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 11, 0, 0, 0).unwrap()
}

fn jan_first() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

const FROM: &str = "verify@sender.test";

#[test]
fn malformed_address_makes_no_network_call() {
    let resolver = CountingResolver::default();
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let mut cache = DomainVerificationCache::new();

    let (verdict, trace) =
        pipeline.verify_traced("not-an-email", FROM, &RoleBasedLocalParts::default(), &mut cache);

    assert_eq!(verdict, VerificationVerdict::invalid_syntax("not-an-email"));
    assert_eq!(trace, vec![Stage::SyntaxCheck]);
    assert_eq!(resolver.calls(), 0);
    assert_eq!(probe.calls(), 0);
    assert_eq!(whois.calls(), 0);
    assert!(cache.is_empty());
}

#[test]
fn domain_without_mx_is_cached_negative_and_still_role_classified() {
    let resolver = CountingResolver::default();
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let mut cache = DomainVerificationCache::new();

    let (verdict, trace) = pipeline.verify_traced(
        "admin@nomx.test",
        FROM,
        &RoleBasedLocalParts::default(),
        &mut cache,
    );

    assert!(verdict.syntax_valid);
    assert!(!verdict.dns_mx_valid);
    assert!(!verdict.smtp_accepted);
    assert!(!verdict.catch_all);
    assert!(verdict.role_based);
    assert_eq!(verdict.domain_creation_date, None);
    assert_eq!(verdict.domain_age_days, None);
    assert_eq!(
        trace,
        vec![
            Stage::SyntaxCheck,
            Stage::CacheLookup,
            Stage::DnsCheck,
            Stage::CacheStore,
            Stage::RoleCheck
        ]
    );
    assert_eq!(probe.calls(), 0);
    assert_eq!(whois.calls(), 0);
    assert_eq!(cache.get("nomx.test"), Some(DomainFacts::no_mail_exchanger()));

    pipeline.verify("info@nomx.test", FROM, &RoleBasedLocalParts::default(), &mut cache);
    assert_eq!(resolver.calls(), 1);
}

#[test]
fn second_address_at_same_domain_reuses_facts() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::created(jan_first());
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois)
        .with_clock(fixed_now);
    let roles = RoleBasedLocalParts::default();
    let mut cache = DomainVerificationCache::new();

    let (first, first_trace) = pipeline.verify_traced("sales@acme.test", FROM, &roles, &mut cache);
    assert_eq!(
        first,
        VerificationVerdict {
            email: "sales@acme.test".into(),
            syntax_valid: true,
            dns_mx_valid: true,
            smtp_accepted: true,
            role_based: true,
            catch_all: true,
            domain_creation_date: Some(jan_first()),
            domain_age_days: Some(10),
        }
    );
    assert_eq!(
        first_trace,
        vec![
            Stage::SyntaxCheck,
            Stage::CacheLookup,
            Stage::DnsCheck,
            Stage::SmtpCheck,
            Stage::CatchAllCheck,
            Stage::WhoisCheck,
            Stage::CacheStore,
            Stage::RoleCheck
        ]
    );
    assert_eq!(probe.calls(), 3);

    let (second, second_trace) = pipeline.verify_traced("jane@acme.test", FROM, &roles, &mut cache);
    assert_eq!(
        second_trace,
        vec![Stage::SyntaxCheck, Stage::CacheLookup, Stage::RoleCheck]
    );
    assert!(!second.role_based);
    assert_eq!(second.dns_mx_valid, first.dns_mx_valid);
    assert_eq!(second.smtp_accepted, first.smtp_accepted);
    assert_eq!(second.catch_all, first.catch_all);
    assert_eq!(second.domain_creation_date, first.domain_creation_date);
    assert_eq!(second.domain_age_days, first.domain_age_days);

    assert_eq!(resolver.calls(), 1);
    assert_eq!(probe.calls(), 3);
    assert_eq!(whois.calls(), 1);
}

#[test]
fn smtp_result_of_first_address_is_shared_by_the_domain() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::rejecting(vec!["ghost"]);
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let roles = RoleBasedLocalParts::default();
    let mut cache = DomainVerificationCache::new();

    let ghost = pipeline.verify("ghost@acme.test", FROM, &roles, &mut cache);
    let jane = pipeline.verify("jane@acme.test", FROM, &roles, &mut cache);

    assert!(!ghost.smtp_accepted);
    assert!(!jane.smtp_accepted);
    assert!(ghost.catch_all);
}

#[test]
fn catch_all_requires_both_probe_addresses() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::rejecting(vec!["test"]);
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let mut cache = DomainVerificationCache::new();

    let verdict = pipeline.verify("jane@acme.test", FROM, &RoleBasedLocalParts::default(), &mut cache);

    assert!(verdict.smtp_accepted);
    assert!(!verdict.catch_all);
    assert!(verdict.is_valid());
    let targets = probe.targets.borrow();
    assert_eq!(targets[0], "jane@acme.test");
    assert_eq!(targets[1], "test@acme.test");
    assert!(targets[2].starts_with("invalid_test_"));
}

#[test]
fn missing_whois_date_leaves_age_unknown() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let mut cache = DomainVerificationCache::new();

    let verdict = pipeline.verify("jane@acme.test", FROM, &RoleBasedLocalParts::default(), &mut cache);

    assert!(verdict.dns_mx_valid);
    assert_eq!(verdict.domain_creation_date, None);
    assert_eq!(verdict.domain_age_days, None);
}

#[test]
fn domain_is_matched_case_insensitively() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let mut run = pipeline.run(FROM, RoleBasedLocalParts::default());

    let upper = run.verify("Jane@ACME.Test");
    let lower = run.verify("john@acme.test");

    assert!(upper.dns_mx_valid);
    assert!(lower.dns_mx_valid);
    assert_eq!(resolver.calls.borrow().as_slice(), ["acme.test"]);
    assert_eq!(run.cache().len(), 1);
}

#[test]
fn repeated_verification_in_a_run_is_idempotent() {
    let resolver = CountingResolver::with_mx("acme.test", "mx.acme.test");
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::created(jan_first());
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois)
        .with_clock(fixed_now);
    let mut run = pipeline.run(FROM, RoleBasedLocalParts::default());

    let first = run.verify("jane@acme.test");
    let second = run.verify("jane@acme.test");

    assert_eq!(first, second);
    assert_eq!(probe.calls(), 3);
    assert_eq!(run.from_address(), FROM);
}

#[test]
fn custom_role_list_replaces_the_default() {
    let resolver = CountingResolver::default();
    let probe = CountingProbe::accepting_all();
    let whois = CountingWhois::default();
    let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
    let roles: RoleBasedLocalParts = ["Recruiting"].into_iter().collect();
    let mut cache = DomainVerificationCache::new();

    assert!(pipeline.verify("recruiting@acme.test", FROM, &roles, &mut cache).role_based);
    assert!(!pipeline.verify("admin@acme.test", FROM, &roles, &mut cache).role_based);
}

#[test]
fn default_role_list_is_case_insensitive() {
    let roles = RoleBasedLocalParts::default();
    assert_eq!(roles.len(), DEFAULT_ROLE_BASED_LOCAL_PARTS.len());
    assert!(roles.contains("PostMaster"));
    assert!(roles.contains("suporte"));
    assert!(!roles.contains("jane"));
}

proptest! {
    #[test]
    fn addresses_without_single_at_never_touch_the_network(
        input in prop_oneof![
            "[a-z0-9.]{0,24}",
            "[a-z]{1,8}@[a-z]{1,8}@[a-z]{1,8}\\.test",
            "@[a-z]{1,8}\\.test",
            "[a-z]{1,8}@",
        ]
    ) {
        let resolver = CountingResolver::default();
        let probe = CountingProbe::accepting_all();
        let whois = CountingWhois::default();
        let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
        let mut cache = DomainVerificationCache::new();

        let verdict = pipeline.verify(&input, FROM, &RoleBasedLocalParts::default(), &mut cache);

        prop_assert!(!verdict.syntax_valid);
        prop_assert!(!verdict.role_based);
        prop_assert_eq!(resolver.calls(), 0);
        prop_assert_eq!(probe.calls(), 0);
        prop_assert_eq!(whois.calls(), 0);
    }

    #[test]
    fn role_classification_ignores_network_outcome(
        role in prop::sample::select(DEFAULT_ROLE_BASED_LOCAL_PARTS.to_vec()),
        domain in "[a-z]{1,10}\\.test",
        has_mx in any::<bool>(),
        upper in any::<bool>(),
    ) {
        let resolver = if has_mx {
            CountingResolver::with_mx(&domain, "mx.example.test")
        } else {
            CountingResolver::default()
        };
        let probe = CountingProbe { accept_nothing: true, ..CountingProbe::default() };
        let whois = CountingWhois::default();
        let pipeline = EmailVerificationPipeline::new(RfcSyntax::default(), &resolver, &probe, &whois);
        let mut cache = DomainVerificationCache::new();
        let local = if upper { role.to_uppercase() } else { role.to_string() };

        let verdict = pipeline.verify(
            &format!("{local}@{domain}"),
            FROM,
            &RoleBasedLocalParts::default(),
            &mut cache,
        );

        prop_assert!(verdict.role_based);
        prop_assert_eq!(verdict.dns_mx_valid, has_mx);
        prop_assert!(!verdict.smtp_accepted);
    }
}
