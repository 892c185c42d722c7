//! CSV batch import of `[tax id, email]` rows into a [`RecordStore`].

mod error;
mod store;
mod tax_id;

pub use error::{BatchError, StoreError};
pub use store::{EmailRecord, MemoryStore, RecordQuery, RecordStore};
pub use tax_id::normalize_tax_id;

use std::borrow::Cow;
use std::io;

use crate::pipeline::Verifier;

pub const DEFAULT_ROW_CAP: usize = 2000;
pub const DEFAULT_DELIMITER: u8 = b';';

/// Input format and limits of [`import_csv`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum rows handled per batch. Duplicates are not counted.
    pub row_cap: usize,
    pub delimiter: u8,
    pub has_headers: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            row_cap: DEFAULT_ROW_CAP,
            delimiter: DEFAULT_DELIMITER,
            has_headers: false,
        }
    }
}

/// Counters of one [`import_csv`] call.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize))]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Rows counted towards the cap.
    pub rows_processed: usize,
    pub imported: usize,
    /// Imported rows whose verdict passed syntax, MX and SMTP.
    pub valid: usize,
    pub duplicates: usize,
    pub incomplete: usize,
    pub cap: usize,
    pub cap_reached: bool,
}

impl BatchReport {
    pub fn summary(&self) -> String {
        let mut summary = format!("{} records imported in this batch", self.imported);
        if self.cap_reached {
            summary.push_str(&format!(
                "\nrow limit of {} reached; run again to continue",
                self.cap
            ));
        }
        summary
    }
}

/// Result of [`import_single`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleOutcome {
    Inserted { valid: bool },
    Duplicate,
    MissingFields,
}

/// Verifies and stores every new address of a `;`-separated CSV.
///
/// The first column is the tax id, the second the email; extra columns are
/// ignored and never decoded. The two used columns are decoded lossily, so
/// Latin-1 input does not stop the batch. Rows missing either value count
/// towards the cap without being imported. Addresses already in `store` are
/// skipped and not counted. A row that fails to insert is logged and counted.
///
/// On a read error the rows handled so far stay in `store`.
pub fn import_csv<R, V, S>(
    reader: R,
    verifier: &mut V,
    store: &mut S,
    options: &BatchOptions,
) -> Result<BatchReport, BatchError>
where
    R: io::Read,
    V: Verifier + ?Sized,
    S: RecordStore + ?Sized,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_headers)
        .flexible(true)
        .from_reader(reader);

    let mut report = BatchReport {
        cap: options.row_cap,
        ..BatchReport::default()
    };
    let first_line = if options.has_headers { 2 } else { 1 };

    for (index, row) in rdr.byte_records().enumerate() {
        if report.rows_processed >= options.row_cap {
            report.cap_reached = true;
            tracing::info!(cap = options.row_cap, "row limit reached, stopping batch");
            break;
        }

        let row = row.map_err(|source| BatchError::Read {
            line: source
                .position()
                .map_or(index as u64 + first_line, |pos| pos.line()),
            source,
        })?;
        let raw_tax_id = field(&row, 0);
        let email = field(&row, 1);
        let (raw_tax_id, email) = (raw_tax_id.trim(), email.trim());

        if raw_tax_id.is_empty() || email.is_empty() {
            report.incomplete += 1;
            report.rows_processed += 1;
            continue;
        }

        if store.contains_email(email) {
            tracing::debug!(email, "already stored, skipping");
            report.duplicates += 1;
            continue;
        }

        let verdict = verifier.verify(email);
        let record = EmailRecord::from_verdict(normalize_tax_id(raw_tax_id), &verdict);
        let valid = record.is_valid;
        match store.insert(record) {
            Ok(id) => {
                report.imported += 1;
                if valid {
                    report.valid += 1;
                }
                tracing::debug!(id, email, valid, "record imported");
            }
            Err(err) => tracing::warn!(email, error = %err, "failed to store record"),
        }
        report.rows_processed += 1;
    }

    tracing::info!(
        imported = report.imported,
        duplicates = report.duplicates,
        incomplete = report.incomplete,
        cap_reached = report.cap_reached,
        "batch finished"
    );
    Ok(report)
}

fn field(row: &csv::ByteRecord, index: usize) -> Cow<'_, str> {
    String::from_utf8_lossy(row.get(index).unwrap_or_default())
}

/// Verifies and stores one manually entered address.
pub fn import_single<V, S>(
    tax_id: &str,
    email: &str,
    verifier: &mut V,
    store: &mut S,
) -> Result<SingleOutcome, StoreError>
where
    V: Verifier + ?Sized,
    S: RecordStore + ?Sized,
{
    let (tax_id, email) = (tax_id.trim(), email.trim());
    if tax_id.is_empty() || email.is_empty() {
        return Ok(SingleOutcome::MissingFields);
    }
    if store.contains_email(email) {
        return Ok(SingleOutcome::Duplicate);
    }

    let verdict = verifier.verify(email);
    let record = EmailRecord::from_verdict(normalize_tax_id(tax_id), &verdict);
    let valid = record.is_valid;
    store.insert(record)?;
    Ok(SingleOutcome::Inserted { valid })
}
