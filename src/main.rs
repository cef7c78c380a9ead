//! Dyntable driver entry
//!
//! Runs a JSON-lines script of requests against the engine and prints one
//! JSON result per line.

// Use jemalloc as global allocator
#[global_allocator]
static GLOBAL: jemallocator::Jemalloc = jemallocator::Jemalloc;

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use clap::Parser;
use serde_json::json;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dyntable::command::Request;
use dyntable::config::{CatalogBackend, DyntableConfig};
use dyntable::{EngineError, SchemaEngine};

/// Runtime schema-mutation engine driver.
#[derive(Parser, Debug)]
#[command(name = "dyntable", version, about)]
struct Args {
    /// Configuration file (JSON).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Data directory, overrides the config file.
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Keep the catalog and tables in memory.
    #[arg(long)]
    memory: bool,

    /// Script of JSON requests, one per line; stdin when absent.
    script: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => match DyntableConfig::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                std::process::exit(2);
            }
        },
        None => DyntableConfig::default(),
    };
    if let Some(data_dir) = args.data_dir {
        config.data_dir = data_dir;
    }
    if args.memory {
        config.catalog = CatalogBackend::Memory;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_directive()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    info!(data_dir = %config.data_dir.display(), catalog = ?config.catalog, "starting dyntable");

    let catalog = match config.open_catalog() {
        Ok(catalog) => catalog,
        Err(e) => {
            error!(error = %e, "failed to open catalog");
            std::process::exit(1);
        }
    };
    let store = match config.open_store() {
        Ok(store) => store,
        Err(e) => {
            error!(error = %e, "failed to open table store");
            std::process::exit(1);
        }
    };
    let engine = SchemaEngine::new(catalog, store);

    match engine.verify_catalog() {
        Ok(found) => {
            for entry in &found {
                error!(table = %entry.table, cause = %entry.cause, "catalog table out of sync with store");
            }
        }
        Err(e) => {
            error!(error = %e, "failed to verify catalog");
            std::process::exit(1);
        }
    }

    let input: Box<dyn BufRead> = match &args.script {
        Some(path) => match File::open(path) {
            Ok(file) => Box::new(BufReader::new(file)),
            Err(e) => {
                error!(path = %path.display(), error = %e, "cannot open script");
                std::process::exit(1);
            }
        },
        None => Box::new(BufReader::new(io::stdin())),
    };

    if let Err(e) = run(&engine, input, io::stdout().lock()) {
        error!(error = %e, "script aborted");
        std::process::exit(1);
    }

    let pending = engine.pending_reconciliation();
    if !pending.is_empty() {
        for entry in &pending {
            warn!(
                table = %entry.table,
                operation = %entry.operation,
                cause = %entry.cause,
                "catalog out of sync"
            );
        }
        std::process::exit(3);
    }
}

fn run(engine: &SchemaEngine, input: impl BufRead, mut out: impl Write) -> io::Result<()> {
    for line in input.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let result = Request::from_json(line)
            .map_err(EngineError::from)
            .and_then(|request| engine.execute(request));

        let reply = match result {
            Ok(outcome) => json!({ "ok": outcome }),
            Err(e) => json!({ "code": e.code(), "detail": e.detail() }),
        };
        writeln!(out, "{reply}")?;
    }
    out.flush()
}
