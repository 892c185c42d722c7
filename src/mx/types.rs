/// One mail exchanger as published in DNS. Ordering is by preference first,
/// so a sorted list puts the preferred host at index 0.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct MxRecord {
    pub(crate) preference: u16,
    pub(crate) exchange: String,
}

impl MxRecord {
    pub(crate) fn new(preference: u16, exchange: impl Into<String>) -> Self {
        Self {
            preference,
            exchange: exchange.into(),
        }
    }

    /// RFC 7505 "no service" record, published as an exchange of `.`.
    pub(crate) fn is_null(&self) -> bool {
        self.exchange.is_empty()
    }
}

/// Outcome of an MX lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MxStatus {
    /// Usable exchangers, ascending preference, without duplicates.
    Hosts(Vec<MxRecord>),
    NoRecords,
    /// The domain declares that it accepts no mail.
    NullMx,
}

impl MxStatus {
    /// Classifies raw answer records. Null records are dropped when real
    /// exchangers are published next to them.
    pub(crate) fn from_records(mut records: Vec<MxRecord>) -> Self {
        let had_null = records.iter().any(MxRecord::is_null);
        records.retain(|record| !record.is_null());
        records.sort();
        records.dedup();

        match (records.is_empty(), had_null) {
            (false, _) => Self::Hosts(records),
            (true, true) => Self::NullMx,
            (true, false) => Self::NoRecords,
        }
    }

    pub(crate) fn records(&self) -> &[MxRecord] {
        match self {
            Self::Hosts(records) => records,
            Self::NoRecords | Self::NullMx => &[],
        }
    }

    pub(crate) fn hosts(&self) -> Vec<String> {
        self.records()
            .iter()
            .map(|record| record.exchange.clone())
            .collect()
    }
}
