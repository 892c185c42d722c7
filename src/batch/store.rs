use std::collections::HashSet;
use std::fs;
use std::io::{self, Write};
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::error::StoreError;
use crate::pipeline::VerificationVerdict;

/// One stored address with the verification outcome it was imported with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailRecord {
    pub id: u64,
    pub tax_id: String,
    pub email: String,
    pub is_valid: bool,
    pub role_based: bool,
    pub catch_all: bool,
    pub domain_creation_date: Option<NaiveDate>,
    pub domain_age_days: Option<i64>,
}

impl EmailRecord {
    /// Builds an unsaved record (id `0`) from a verdict.
    pub fn from_verdict(tax_id: impl Into<String>, verdict: &VerificationVerdict) -> Self {
        Self {
            id: 0,
            tax_id: tax_id.into(),
            email: verdict.email.clone(),
            is_valid: verdict.is_valid(),
            role_based: verdict.role_based,
            catch_all: verdict.catch_all,
            domain_creation_date: verdict.domain_creation_date,
            domain_age_days: verdict.domain_age_days,
        }
    }
}

/// Persistence seam of the batch importer.
pub trait RecordStore {
    fn contains_email(&self, email: &str) -> bool;
    /// Stores `record` and returns the id assigned to it.
    fn insert(&mut self, record: EmailRecord) -> Result<u64, StoreError>;
}

impl<T: RecordStore + ?Sized> RecordStore for &mut T {
    fn contains_email(&self, email: &str) -> bool {
        (**self).contains_email(email)
    }

    fn insert(&mut self, record: EmailRecord) -> Result<u64, StoreError> {
        (**self).insert(record)
    }
}

/// Selection applied by [`MemoryStore::query`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordQuery {
    All,
    Valid,
    Invalid,
    /// Case-insensitive substring of the email or tax id.
    Search(String),
}

impl RecordQuery {
    fn matches(&self, record: &EmailRecord) -> bool {
        match self {
            Self::All => true,
            Self::Valid => record.is_valid,
            Self::Invalid => !record.is_valid,
            Self::Search(needle) => {
                let needle = needle.to_lowercase();
                record.email.to_lowercase().contains(&needle)
                    || record.tax_id.to_lowercase().contains(&needle)
            }
        }
    }
}

/// In-memory [`RecordStore`] with CSV persistence.
///
/// Emails are unique, compared trimmed and case-insensitively. Ids are
/// assigned sequentially on insert.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<EmailRecord>,
    emails: HashSet<String>,
    next_id: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            ..Self::default()
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[EmailRecord] {
        &self.records
    }

    pub fn query(&self, query: &RecordQuery) -> Vec<&EmailRecord> {
        self.records
            .iter()
            .filter(|record| query.matches(record))
            .collect()
    }

    /// Reads records written by [`save_csv`](Self::save_csv).
    pub fn load_csv<R: io::Read>(reader: R) -> Result<Self, StoreError> {
        let mut store = Self::new();
        let mut rdr = csv::Reader::from_reader(reader);
        for row in rdr.deserialize::<EmailRecord>() {
            let record = row?;
            let key = email_key(&record.email);
            if !store.emails.insert(key) {
                tracing::warn!(email = %record.email, "duplicate email in record file, keeping first");
                continue;
            }
            store.next_id = store.next_id.max(record.id.saturating_add(1));
            store.records.push(record);
        }
        Ok(store)
    }

    pub fn save_csv<W: io::Write>(&self, writer: W) -> Result<(), StoreError> {
        let mut wtr = csv::Writer::from_writer(writer);
        for record in &self.records {
            wtr.serialize(record)?;
        }
        wtr.flush().map_err(csv::Error::from)?;
        Ok(())
    }

    /// Loads the store kept at `path`; a missing file is an empty store.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        match fs::File::open(path) {
            Ok(file) => Self::load_csv(file),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(Self::new()),
            Err(err) => Err(StoreError::io(path, err)),
        }
    }

    /// Writes the store to `path` through a temporary file and a rename.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let mut buf = Vec::new();
        self.save_csv(&mut buf)?;

        let tmp = path.with_extension("csv.tmp");
        {
            let mut file = fs::File::create(&tmp).map_err(|err| StoreError::io(&tmp, err))?;
            file.write_all(&buf)
                .and_then(|()| file.sync_all())
                .map_err(|err| StoreError::io(&tmp, err))?;
        }
        fs::rename(&tmp, path).map_err(|err| StoreError::io(path, err))
    }
}

impl RecordStore for MemoryStore {
    fn contains_email(&self, email: &str) -> bool {
        self.emails.contains(&email_key(email))
    }

    fn insert(&mut self, mut record: EmailRecord) -> Result<u64, StoreError> {
        if !self.emails.insert(email_key(&record.email)) {
            return Err(StoreError::DuplicateEmail {
                email: record.email,
            });
        }
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        record.id = id;
        self.records.push(record);
        Ok(id)
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}
