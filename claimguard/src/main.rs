use anyhow::{Context, Result};
use clap::Parser;
use claimguard_core::{CombatEngine, CombatSettings, UniverseHandle};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

mod host;
mod loader;

/// Replay recorded damage events against a claimed world and print one
/// verdict per event as JSON.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file (worlds, towns, nations, zones and events)
    #[arg(short, long)]
    scenario: PathBuf,

    /// Combat settings file; built-in defaults when omitted
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = std::str::FromStr::from_str(&args.log_level).unwrap_or(log::LevelFilter::Warn);
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .init();

    let scenario = loader::load_scenario(&args.scenario)?;

    let settings = match &args.settings {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings {}", path.display()))?;
            CombatSettings::from_json(&text)
                .with_context(|| format!("Invalid settings {}", path.display()))?
        }
        None => scenario.settings.clone().unwrap_or_default(),
    };

    let handle = UniverseHandle::new(loader::build_universe(&scenario)?);
    let universe = handle.snapshot();

    let logging = Arc::new(host::LoggingHost);
    let permissions = Arc::new(host::TownPermissions::new(
        universe.clone(),
        settings.zone_size,
        &scenario.destroy_grants,
    ));
    let engine = CombatEngine::new(settings, permissions, logging.clone(), logging)
        .context("Invalid combat settings")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut cancelled = 0;
    for event in &scenario.events {
        let verdict = engine.prevent_damage(&universe, event);
        if verdict.cancelled {
            cancelled += 1;
        }
        writeln!(out, "{}", serde_json::to_string(&verdict)?)?;
    }

    log::info!(
        "Replayed {} events, {} cancelled",
        scenario.events.len(),
        cancelled
    );

    Ok(())
}
