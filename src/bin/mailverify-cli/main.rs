mod args;
mod output;

use std::fs::File;
use std::io::{self, BufRead};
use std::path::Path;

use anyhow::{Context, Result, bail};
use mailverify_lib::config::parse_delimiter;
use mailverify_lib::{
    EngineConfig, MemoryStore, RecordQuery, SingleOutcome, VerificationVerdict, Verifier,
    import_csv, import_single,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use args::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let config = cli.engine_config()?;

    // exit codes: 0 OK, 2 invalid addresses, 1 fatal
    let all_valid = match cli.cmd {
        Commands::Verify {
            emails,
            stdin,
            format,
        } => verify(&config, emails, stdin, &format)?,
        Commands::Import {
            file,
            store,
            cap,
            delimiter,
            has_headers,
        } => {
            let mut options = config.batch_options();
            if let Some(cap) = cap {
                options.row_cap = cap;
            }
            if let Some(delimiter) = delimiter.as_deref() {
                options.delimiter = parse_delimiter(delimiter).context("--delimiter")?;
            }
            options.has_headers |= has_headers;

            let mut records = open_store(&store)?;
            let input = File::open(&file).with_context(|| format!("open {}", file.display()))?;
            let pipeline = config.build_pipeline().context("initialise DNS resolver")?;
            let mut run = pipeline.run(config.from_address.clone(), config.role_parts());
            let imported = import_csv(input, &mut run, &mut records, &options);
            // rows verified before a read error are kept
            records
                .save(&store)
                .with_context(|| format!("save {}", store.display()))?;
            let report = imported.with_context(|| format!("import {}", file.display()))?;
            println!("{}", report.summary());
            true
        }
        Commands::Add { id, email, store } => {
            let mut records = open_store(&store)?;
            let pipeline = config.build_pipeline().context("initialise DNS resolver")?;
            let mut run = pipeline.run(config.from_address.clone(), config.role_parts());
            match import_single(&id, &email, &mut run, &mut records)? {
                SingleOutcome::Inserted { valid } => {
                    records
                        .save(&store)
                        .with_context(|| format!("save {}", store.display()))?;
                    println!("record stored ({})", if valid { "valid" } else { "invalid" });
                    valid
                }
                SingleOutcome::Duplicate => {
                    println!("{email} is already stored, not inserted again");
                    true
                }
                SingleOutcome::MissingFields => bail!("both --id and --email must be non-empty"),
            }
        }
        Commands::Query {
            store,
            valid,
            invalid,
            search,
            format,
        } => {
            let records = open_store(&store)?;
            let query = match (valid, invalid, search) {
                (true, _, _) => RecordQuery::Valid,
                (_, true, _) => RecordQuery::Invalid,
                (_, _, Some(needle)) => RecordQuery::Search(needle),
                _ => RecordQuery::All,
            };
            output::write_records(&records.query(&query), &format)?;
            true
        }
    };

    if !all_valid {
        std::process::exit(2);
    }
    Ok(())
}

fn verify(config: &EngineConfig, mut emails: Vec<String>, stdin: bool, format: &str) -> Result<bool> {
    if stdin {
        for line in io::stdin().lock().lines() {
            let line = line.context("read stdin")?;
            if !line.trim().is_empty() {
                emails.push(line);
            }
        }
    }
    if emails.is_empty() {
        bail!("no address given; pass addresses or --stdin");
    }

    let pipeline = config.build_pipeline().context("initialise DNS resolver")?;
    let mut run = pipeline.run(config.from_address.clone(), config.role_parts());
    let verdicts: Vec<VerificationVerdict> = emails.iter().map(|email| run.verify(email)).collect();
    output::write_verdicts(&verdicts, format)?;
    Ok(verdicts.iter().all(VerificationVerdict::is_valid))
}

fn open_store(path: &Path) -> Result<MemoryStore> {
    MemoryStore::open(path).with_context(|| format!("open record file {}", path.display()))
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}
