use super::options::CatchAllOptions;
use super::probe::SmtpProbe;
use super::util::unique_local_part;

/// Infers whether a domain accepts mail for any local part.
///
/// Two probes are always sent: one to the fixed local part (`test` by
/// default) and one to a freshly generated unique local part. The domain is
/// catch-all only when both are accepted.
///
/// Heuristic with a known false positive: the fixed local part may be a
/// real mailbox at the domain.
#[derive(Debug, Clone, Default)]
pub struct CatchAllDetector {
    options: CatchAllOptions,
}

impl CatchAllDetector {
    pub fn new(options: CatchAllOptions) -> Self {
        Self { options }
    }

    pub fn detect<P: SmtpProbe + ?Sized>(&self, probe: &P, domain: &str, from: &str) -> bool {
        let fixed = format!("{}@{domain}", self.options.fixed_local_part);
        let random = format!(
            "{}@{domain}",
            unique_local_part(&self.options.random_prefix)
        );

        let fixed_accepted = probe.probe(from, &fixed, domain);
        let random_accepted = probe.probe(from, &random, domain);
        let catch_all = fixed_accepted && random_accepted;

        tracing::debug!(
            domain,
            fixed_accepted,
            random_accepted,
            catch_all,
            "catch-all detection finished"
        );
        catch_all
    }
}
