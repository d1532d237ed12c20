//! Main entry point for the terminal game.
//!
//! Builds the level catalog from the command line, then plays it on the
//! terminal surface until the catalog is exhausted, the player dies or quits.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;

use gridrun::game::level::LevelCatalog;
use gridrun::session::control::{SharedSurface, TerminalSurface};
use gridrun::session::progression::Progression;

#[derive(Parser)]
#[command(name = "gridrun")]
#[command(version)]
#[command(about = "Grid chase with checkpoints (w/a/s/d move, g checkpoint, q quit; press enter after keys)")]
struct Cli {
    /// Directory of `.lvl` files, played in name order. The built-in level is played when omitted.
    level_dir: Option<PathBuf>,

    /// Tick interval in milliseconds, overriding every level's TEMPO
    #[arg(long)]
    tempo: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logger from environment variable (default to info level).
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let catalog = match &cli.level_dir {
        Some(dir) => LevelCatalog::scan(dir).with_context(|| format!("cannot read level directory {}", dir.display()))?,
        None => LevelCatalog::builtin(),
    };
    if catalog.is_empty() {
        bail!("no .lvl files found");
    }

    let surface: SharedSurface = Arc::new(Mutex::new(TerminalSurface::spawn()));
    let summary = Progression::new(catalog).with_tempo(cli.tempo).run(surface).await;

    info!(
        "[Main] {:?}: {} level(s) cleared, score {}",
        summary.end, summary.levels_cleared, summary.score
    );
    Ok(())
}
