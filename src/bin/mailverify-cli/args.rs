use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mailverify_lib::EngineConfig;

#[derive(Parser)]
#[command(name = "mailverify-cli", version, about = "Email and domain verification")]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Commands,

    /// TOML configuration file layered over the built-in defaults
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// envelope sender used for SMTP probes (overrides the config file)
    #[arg(long, global = true)]
    pub from: Option<String>,

    /// debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// verify addresses; one run, domain facts shared between them
    Verify {
        emails: Vec<String>,
        /// read addresses from stdin (one per line)
        #[arg(long)]
        stdin: bool,
        /// format: human|json|ndjson
        #[arg(long, default_value = "human")]
        format: String,
    },
    /// import a `tax id;email` CSV file into a record file
    Import {
        file: PathBuf,
        #[arg(long)]
        store: PathBuf,
        /// maximum rows handled in this batch
        #[arg(long)]
        cap: Option<usize>,
        /// single-character field delimiter
        #[arg(long)]
        delimiter: Option<String>,
        /// skip the first row
        #[arg(long)]
        has_headers: bool,
    },
    /// verify and store a single address
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        store: PathBuf,
    },
    /// list stored records
    Query {
        #[arg(long)]
        store: PathBuf,
        #[arg(long, conflicts_with_all = ["invalid", "search"])]
        valid: bool,
        #[arg(long, conflicts_with = "search")]
        invalid: bool,
        /// case-insensitive substring of the email or tax id
        #[arg(long)]
        search: Option<String>,
        /// format: human|csv
        #[arg(long, default_value = "human")]
        format: String,
    },
}

impl Cli {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Defaults, then the config file, then command-line overrides.
    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => EngineConfig::load(path)
                .with_context(|| format!("load config {}", path.display()))?,
            None => EngineConfig::default(),
        };
        if let Some(from) = &self.from {
            config.set_from_address(from).context("--from")?;
        }
        Ok(config)
    }
}
