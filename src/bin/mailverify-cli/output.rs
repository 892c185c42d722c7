use anyhow::{Result, bail};
use mailverify_lib::{EmailRecord, VerificationVerdict};

pub fn write_verdicts(verdicts: &[VerificationVerdict], format: &str) -> Result<()> {
    match format {
        "human" => {
            for verdict in verdicts {
                println!("{}", human_verdict(verdict));
            }
        }
        "json" => println!("{}", serde_json::to_string_pretty(verdicts)?),
        "ndjson" => {
            for verdict in verdicts {
                println!("{}", serde_json::to_string(verdict)?);
            }
        }
        other => bail!("unknown --format '{other}', use: human|json|ndjson"),
    }
    Ok(())
}

pub fn write_records(records: &[&EmailRecord], format: &str) -> Result<()> {
    match format {
        "human" => {
            for record in records {
                println!("{}", human_record(record));
            }
            println!("{} record(s)", records.len());
        }
        "csv" => {
            let mut wtr = csv::Writer::from_writer(std::io::stdout());
            for record in records {
                wtr.serialize(record)?;
            }
            wtr.flush()?;
        }
        other => bail!("unknown --format '{other}', use: human|csv"),
    }
    Ok(())
}

fn human_verdict(verdict: &VerificationVerdict) -> String {
    if !verdict.syntax_valid {
        return format!("[INVALID] {} :: syntax", verdict.email);
    }
    let tag = if verdict.is_valid() { "[OK]     " } else { "[INVALID]" };
    let mut line = format!(
        "{tag} {}\n          mx={} smtp={} catch_all={} role={}",
        verdict.email,
        verdict.dns_mx_valid,
        verdict.smtp_accepted,
        verdict.catch_all,
        verdict.role_based
    );
    if let (Some(created), Some(age)) = (verdict.domain_creation_date, verdict.domain_age_days) {
        line.push_str(&format!(" created={created} age={age}d"));
    }
    line
}

fn human_record(record: &EmailRecord) -> String {
    let mut flags = Vec::new();
    if record.role_based {
        flags.push("role");
    }
    if record.catch_all {
        flags.push("catch-all");
    }
    format!(
        "#{:<5} {:<16} {:<40} {}{}",
        record.id,
        record.tax_id,
        record.email,
        if record.is_valid { "valid" } else { "invalid" },
        if flags.is_empty() {
            String::new()
        } else {
            format!(" ({})", flags.join(", "))
        }
    )
}
