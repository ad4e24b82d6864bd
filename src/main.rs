//! apiperms: API permission tables in markdown reference documentation.
//!
//! Three commands:
//!
//! - **extract**: read one documentation root and report every documented
//!   request with its delegated and application permissions
//! - **reconcile**: read the v1 and beta roots, mark which beta APIs also
//!   exist in v1, report them and print summary ratios
//! - **update**: merge permission lists from a CSV source into the
//!   permission tables of the matching documents (dry run unless `--write`)

mod config;
mod corpus;
mod error;
mod extract;
mod markdown;
mod model;
mod ownership;
mod permissions;
mod reconcile;
mod report;
mod rewrite;
mod updates;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use config::{Config, DocVersion};
use corpus::CorpusOptions;
use extract::ExtractOptions;
use ownership::OwnershipRules;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "apiperms",
    about = "Extract, reconcile and update API permission tables in markdown docs"
)]
struct Cli {
    /// TOML configuration file (built-in defaults when omitted)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// More logging: -v for progress, -vv for every document. RUST_LOG overrides.
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Report the APIs documented in one documentation root
    Extract {
        /// Directory of .md pages (defaults to the configured root)
        #[arg(long)]
        root: Option<PathBuf>,

        /// Version whose URL suffix and configured root apply
        #[arg(long, value_enum, default_value = "beta")]
        version: DocVersion,

        /// Report file (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Compare beta against v1, report beta APIs and print summary ratios
    Reconcile {
        /// v1 documentation root
        #[arg(long)]
        v1: Option<PathBuf>,

        /// beta documentation root
        #[arg(long)]
        beta: Option<PathBuf>,

        /// Report file (stdout when omitted)
        #[arg(short = 'o', long)]
        output: Option<PathBuf>,
    },

    /// Merge permissions from a CSV source into the documents' tables
    Update {
        /// Directory of .md pages (defaults to the configured root)
        #[arg(long)]
        root: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "beta")]
        version: DocVersion,

        /// Headerless CSV: verb, resource, delegated, application
        #[arg(short = 'u', long)]
        updates: PathBuf,

        /// Write changes back to disk (otherwise only report them)
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    let rules = config.ownership_rules()?;

    match &cli.command {
        Command::Extract {
            root,
            version,
            output,
        } => extract_cmd(&config, &rules, *version, root.as_deref(), output.as_deref()),
        Command::Reconcile { v1, beta, output } => {
            reconcile_cmd(&config, &rules, v1.as_deref(), beta.as_deref(), output.as_deref())
        }
        Command::Update {
            root,
            version,
            updates,
            write,
        } => update_cmd(&config, &rules, *version, root.as_deref(), updates, *write),
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn corpus_options<'a>(
    config: &'a Config,
    rules: &'a OwnershipRules,
    version: DocVersion,
) -> CorpusOptions<'a> {
    CorpusOptions {
        extract: ExtractOptions {
            required_keywords: &config.required_keywords,
            base_urls: &config.base_urls,
        },
        rules,
        docs_base_url: &config.docs_base_url,
        url_suffix: config.url_suffix(version),
    }
}

fn read_version(
    config: &Config,
    rules: &OwnershipRules,
    version: DocVersion,
    root: Option<&Path>,
) -> Result<Vec<model::ApiRecord>> {
    let root = config.root(version, root)?;
    corpus::read_corpus(&root, &corpus_options(config, rules, version))
}

fn extract_cmd(
    config: &Config,
    rules: &OwnershipRules,
    version: DocVersion,
    root: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let records = read_version(config, rules, version, root)?;
    report::write_report(report::open_output(output)?, &records)
}

fn reconcile_cmd(
    config: &Config,
    rules: &OwnershipRules,
    v1_root: Option<&Path>,
    beta_root: Option<&Path>,
    output: Option<&Path>,
) -> Result<()> {
    let v1 = read_version(config, rules, DocVersion::V1, v1_root)?;
    let mut beta = read_version(config, rules, DocVersion::Beta, beta_root)?;

    let found = reconcile::mark_in_v1(&mut beta, &v1);
    info!(beta = beta.len(), v1 = v1.len(), in_v1 = found, "reconciled");

    let summary = reconcile::summarize(&beta, &config.excluded_owners)?;
    report::write_report(report::open_output(output)?, &beta)?;
    eprintln!("{summary}");
    Ok(())
}

fn update_cmd(
    config: &Config,
    rules: &OwnershipRules,
    version: DocVersion,
    root: Option<&Path>,
    updates_path: &Path,
    write: bool,
) -> Result<()> {
    let records = read_version(config, rules, version, root)?;
    let table = updates::UpdateTable::load(updates_path, &config.base_urls)?;
    if table.is_empty() {
        warn!(path = %updates_path.display(), "update source has no rows");
    } else {
        info!(path = %updates_path.display(), rows = table.len(), "loaded update source");
    }

    let write = write || config.rewrite.write;
    let outcome = updates::apply_updates(&records, &table, &config.rewrite.options(), write)?;

    let mode = if write {
        ""
    } else {
        " (dry run, pass --write to apply)"
    };
    eprintln!(
        "{} changed, {} already up to date, {} without update{}",
        outcome.changed, outcome.unchanged, outcome.skipped, mode
    );
    Ok(())
}
