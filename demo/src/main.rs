//! partlog demo CLI
//!
//! Runs a scripted inventory session against the hash-chained in-memory
//! store and prints the resulting log through the entry formatter.  Exports
//! can be written to disk and later verified or listed again.
//!
//! Usage:
//!   cargo run -p partlog-demo -- run
//!   cargo run -p partlog-demo -- --markup html run --export log.json
//!   cargo run -p partlog-demo -- verify log.json
//!   cargo run -p partlog-demo -- show log.json --element part:2

mod scenario;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use partlog_contracts::{ElementRef, LogEntry, LogError, LogResult};
use partlog_core::{traits::LogStore, LoggerConfig};
use partlog_format::{
    strip_console_tags, CatalogTranslator, LogEntryExtraFormatter, TranslatedTypeNames,
};
use partlog_store::InMemoryLogStore;

// ── CLI definition ────────────────────────────────────────────────────────────

/// partlog: audit log for a parts inventory.
#[derive(Parser)]
#[command(
    name = "partlog-demo",
    about = "partlog audit log demo",
    long_about = "Runs a scripted parts-inventory session, prints the audit log it produced,\n\
                  and exports, verifies, or lists hash-chained log snapshots."
)]
struct Cli {
    /// Logger configuration (TOML).  Defaults apply when omitted.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Extra message catalog (TOML) layered over the built-in English one.
    #[arg(long, global = true)]
    translations: Option<PathBuf>,

    /// How formatted entries are marked up.
    #[arg(long, value_enum, default_value_t = Markup::Plain, global = true)]
    markup: Markup,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the scripted session and print its log.
    Run {
        /// Also write the log as JSON to this file.
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Check an exported log's schema and hash chain.
    Verify {
        /// The exported JSON file.
        input: PathBuf,
    },
    /// Print the entries of an exported log.
    Show {
        /// The exported JSON file.
        input: PathBuf,

        /// Only entries concerning this element, as `<type>:<id>`.
        #[arg(long, value_parser = parse_element)]
        element: Option<ElementRef>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Markup {
    /// Console markup with the tags removed.
    Plain,
    /// Console markup with `<info>` tags.
    Console,
    /// Rich HTML markup.
    Html,
}

fn parse_element(s: &str) -> Result<ElementRef, String> {
    let (element_type, id) = s
        .split_once(':')
        .ok_or_else(|| format!("expected <type>:<id>, got '{}'", s))?;
    let id = id
        .parse::<u64>()
        .map_err(|e| format!("invalid element id '{}': {}", id, e))?;
    Ok(ElementRef::new(element_type, id))
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    // Set RUST_LOG=debug to see every append and filter decision.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Command::Run { export } => run(&cli, export.as_deref()),
        Command::Verify { input } => verify(input),
        Command::Show { input, element } => show(&cli, input, element.as_ref()),
    };

    if let Err(e) = result {
        eprintln!("partlog error: {}", e);
        std::process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

fn run(cli: &Cli, export: Option<&Path>) -> LogResult<()> {
    let config = match &cli.config {
        Some(path) => LoggerConfig::from_file(path)?,
        None => LoggerConfig::default(),
    };

    let store = scenario::run_session(config)?;

    print_entries(cli, &store.entries()?)?;

    if let Some(path) = export {
        write_file(path, &store.to_json()?)?;
        println!();
        println!("Exported {} entries to {}", store.len(), path.display());
    }
    Ok(())
}

fn verify(input: &Path) -> LogResult<()> {
    let store = load(input)?;
    let terminal_hash = store.export_log().terminal_hash;
    println!(
        "{}: {} entries, hash chain intact (terminal hash {})",
        input.display(),
        store.len(),
        if terminal_hash.is_empty() { "-" } else { terminal_hash.as_str() }
    );
    Ok(())
}

fn show(cli: &Cli, input: &Path, element: Option<&ElementRef>) -> LogResult<()> {
    let store = load(input)?;
    let entries = match element {
        Some(target) => store.list_by_target(target)?,
        None => store.entries()?,
    };
    print_entries(cli, &entries)
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn load(input: &Path) -> LogResult<InMemoryLogStore> {
    let json = std::fs::read_to_string(input).map_err(|e| LogError::StoreFailure {
        reason: format!("failed to read '{}': {}", input.display(), e),
    })?;
    InMemoryLogStore::import_json(&json)
}

fn write_file(path: &Path, contents: &str) -> LogResult<()> {
    std::fs::write(path, contents).map_err(|e| LogError::StoreFailure {
        reason: format!("failed to write '{}': {}", path.display(), e),
    })
}

fn catalog(cli: &Cli) -> LogResult<CatalogTranslator> {
    let catalog = CatalogTranslator::default();
    match &cli.translations {
        Some(path) => Ok(catalog.merged_with(CatalogTranslator::from_file(path)?)),
        None => Ok(catalog),
    }
}

fn print_entries(cli: &Cli, entries: &[LogEntry]) -> LogResult<()> {
    let catalog = catalog(cli)?;
    let type_names = TranslatedTypeNames::new(&catalog);
    let formatter = LogEntryExtraFormatter::new(&catalog, &type_names);

    for entry in entries {
        let details = match cli.markup {
            Markup::Plain => strip_console_tags(&formatter.format_console(entry)),
            Markup::Console => formatter.format_console(entry),
            Markup::Html => formatter.format(entry),
        };
        let id = entry.id().map(|id| id.to_string()).unwrap_or_default();
        let target = entry
            .target()
            .map(|t| format!("{}:{}", t.element_type, t.id))
            .unwrap_or_else(|| "-".to_string());

        println!(
            "#{:<3} {} {:<9} {:<27} {:<10} {}",
            id,
            entry.timestamp().format("%H:%M:%S"),
            entry.level().as_str(),
            entry.type_tag(),
            target,
            details
        );
    }
    Ok(())
}
