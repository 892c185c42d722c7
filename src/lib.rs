#![forbid(unsafe_code)]
//! mailverify_lib — email and domain verification engine.
//!
//! An address goes through syntax validation, MX lookup, an SMTP `RCPT TO`
//! probe, catch-all detection, a WHOIS creation-date lookup and role-based
//! classification ([`EmailVerificationPipeline`]). Network facts are shared
//! per domain within a run through a [`DomainCache`].
//!
//! With the `with-csv` feature, [`batch`] imports CSV files of addresses into
//! a [`RecordStore`].

pub mod cache;
pub mod config;
pub mod mx;
pub mod pipeline;
pub mod smtp;
pub mod validator;
pub mod whois;

#[cfg(feature = "with-csv")]
pub mod batch;

pub use cache::{DomainCache, DomainFacts, DomainVerificationCache};
pub use config::{ConfigError, EngineConfig, SystemPipeline};
pub use mx::{MxError, MxResolver, SystemMxResolver};
pub use pipeline::{
    EmailVerificationPipeline, RoleBasedLocalParts, Stage, VerificationRun, VerificationVerdict,
    Verifier,
};
pub use smtp::{CatchAllDetector, SmtpProbe, SmtpProbeError, SmtpProbeOptions, TcpSmtpProbe};
pub use validator::{
    RfcSyntax, SyntaxIssue, SyntaxValidator, ValidationMode, ValidationReport, split_address,
    validate_email,
};
pub use whois::{TcpWhoisClient, WhoisClient, WhoisError, WhoisOptions};

#[cfg(feature = "with-csv")]
pub use batch::{
    BatchError, BatchOptions, BatchReport, EmailRecord, MemoryStore, RecordQuery, RecordStore,
    SingleOutcome, StoreError, import_csv, import_single, normalize_tax_id,
};
