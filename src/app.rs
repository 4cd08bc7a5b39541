// Declare modules
pub mod cli;
pub mod config;
pub mod error;
pub mod formatter;
pub mod matcher;
pub mod models;
pub mod scanner;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

use self::cli::{Cli, Command, IgnoreAction};
use self::config::{resolve_config, resolved_args, DefaultsStore};
use self::error::SearchResult;
use self::formatter::{ExportEnvelope, OutputGenerator, TIME_FORMAT};
use self::models::{MatchRecord, OutputFormat, RawSearchArgs, SearchConfig};
use self::scanner::Scanner;

/// What a search hands back, depending on the requested output.
#[derive(Debug)]
pub enum SearchOutcome {
    /// Table printed to stdout.
    Printed(usize),
    /// Results written to a file.
    Exported { path: PathBuf, count: usize },
    Records(Vec<MatchRecord>),
}

impl SearchOutcome {
    pub fn count(&self) -> usize {
        match self {
            SearchOutcome::Printed(count) | SearchOutcome::Exported { count, .. } => *count,
            SearchOutcome::Records(records) => records.len(),
        }
    }
}

/// Runs one search over an already built config.
pub fn search(config: &SearchConfig) -> SearchResult<Vec<MatchRecord>> {
    Scanner::new(config)?.scan()
}

/// Validates `args` against the persisted defaults, searches and renders.
pub fn go_search(args: &RawSearchArgs, store: &DefaultsStore) -> SearchResult<SearchOutcome> {
    let start = Local::now();
    let timer = Instant::now();
    log::info!("Searching for: {:?}, please wait...", args);

    let defaults = store.load()?;
    let default_filename = start.format("%Y%m%d_%H_%M_%S").to_string();
    let (config, target) = resolve_config(args, &defaults, &default_filename)?;

    let scanner = Scanner::new(&config)?;
    log::debug!("Walking {}", scanner.root().display());
    let records = scanner.scan()?;

    let end = Local::now();
    let elapsed = timer.elapsed().as_secs_f64();
    log::info!(
        "{} coincidences found in {:.2} second(s)",
        records.len(),
        elapsed
    );

    match target.format {
        OutputFormat::Console => {
            print!("{}", OutputGenerator::generate_table(&records));
            Ok(SearchOutcome::Printed(records.len()))
        }
        OutputFormat::List => Ok(SearchOutcome::Records(records)),
        OutputFormat::Txt | OutputFormat::Csv | OutputFormat::Json => {
            let search_args = resolved_args(args, &config, &target);
            let envelope = ExportEnvelope {
                search_args: &search_args,
                start: start.format(TIME_FORMAT).to_string(),
                end: end.format(TIME_FORMAT).to_string(),
                total_time_seconds: elapsed,
                results: &records,
            };
            let path = OutputGenerator::export(&envelope, &target)?;
            log::info!("Exported {}", path.display());
            Ok(SearchOutcome::Exported {
                path,
                count: records.len(),
            })
        }
    }
}

/// Initializes components and orchestrates data flow.
pub fn run() -> Result<()> {
    // 1. Parse Args
    let args = Cli::parse();

    // 2. Locate persisted defaults
    let store = match &args.config {
        Some(path) => DefaultsStore::new(path),
        None => DefaultsStore::user()?,
    };

    // 3. Maintenance commands never search
    if let Some(Command::Ignore { action }) = &args.command {
        return manage_defaults(&store, action);
    }

    // 4. Search and render
    let outcome = go_search(&args.search_args(), &store).context("Search failed")?;

    if let SearchOutcome::Records(records) = &outcome {
        for record in records {
            println!("{:?}", record.cells());
        }
    }

    if outcome.count() == 0 {
        log::warn!("No matches for the specified criteria.");
    }

    Ok(())
}

fn manage_defaults(store: &DefaultsStore, action: &IgnoreAction) -> Result<()> {
    let defaults = match action {
        IgnoreAction::Folders { names } => store
            .set_ignore_folders(Some(names.clone()))
            .context("Failed to update ignored folders")?,
        IgnoreAction::Extensions { extensions } => store
            .set_ignore_extensions(Some(extensions.clone()))
            .context("Failed to update ignored extensions")?,
        IgnoreAction::Show => store.load().context("Failed to read defaults")?,
    };

    println!("# {}", store.path().display());
    println!("ignore_folders = {:?}", defaults.ignore_folders);
    println!("ignore_extensions = {:?}", defaults.ignore_extensions);
    Ok(())
}
