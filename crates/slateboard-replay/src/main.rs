//! Headless replay of a scripted canvas session.
//!
//! Usage:
//!
//! ```text
//! slateboard-replay <script.json> [--input <doc.json>] [--config <config.json>]
//!                   [--out-dir <dir>] [--name <document-id>]
//! ```
//!
//! Loads an optional exported document, drives the canvas engine through the
//! script's pointer and key steps, and saves the result as an exported
//! document with [`FileStorage`]. Set `RUST_LOG=debug` to watch the state
//! machine.

mod script;

use clap::Parser;
use script::{Replayer, Script};
use slateboard_core::{
    Canvas, CanvasDocument, ConfigError, EngineConfig, FileStorage, ImportError, Storage, StorageError,
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
enum ReplayError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid script: {0}")]
    Script(#[from] serde_json::Error),
    #[error(transparent)]
    Import(#[from] ImportError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Replay a scripted session against the canvas engine and save the result
#[derive(Debug, Parser)]
#[command(name = "slateboard-replay", version, about)]
struct Args {
    /// Script of pointer, key and edit steps (JSON)
    script: PathBuf,

    /// Exported document to load before replaying
    #[arg(long, value_name = "DOC")]
    input: Option<PathBuf>,

    /// Engine configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory to save into (defaults to the user data directory)
    #[arg(long, value_name = "DIR")]
    out_dir: Option<PathBuf>,

    /// Document id to save under (defaults to the document's own id)
    #[arg(long, value_name = "ID")]
    name: Option<String>,
}

fn read(path: &Path) -> Result<String, ReplayError> {
    std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn run(args: Args) -> Result<(), ReplayError> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    let mut canvas = Canvas::with_config(config);
    if let Some(input) = &args.input {
        let document = CanvasDocument::from_json(&read(input)?)?;
        log::info!("Loaded {} object(s) from {}", document.len(), input.display());
        canvas.set_document(document);
    }

    let script: Script = serde_json::from_str(&read(&args.script)?)?;
    let mut replayer = Replayer::new(&mut canvas);
    replayer.run(&script);
    let stats = replayer.stats.clone();
    log::info!(
        "Replayed {} step(s): {} created, {} connected, {} refused",
        stats.steps,
        stats.created,
        stats.connected,
        stats.refused
    );

    let storage = match args.out_dir {
        Some(dir) => FileStorage::new(dir)?,
        None => FileStorage::default_location()?,
    };
    let name = args.name.unwrap_or_else(|| canvas.document.id.clone());
    pollster::block_on(storage.save(&name, &canvas.export()))?;
    println!(
        "{} object(s), {} connection(s) saved as '{name}' in {}",
        canvas.document.len(),
        canvas.document.connections.len(),
        storage.base_path().display()
    );
    Ok(())
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    if let Err(e) = run(args) {
        log::error!("{e}");
        eprintln!("{e}");
        std::process::exit(1);
    }
}
