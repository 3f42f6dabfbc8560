//! polidoc CLI - runs the eight-gate evaluation pipeline over a single
//! municipal policy document and writes its Manifest audit trail.

use std::path::PathBuf;

use clap::Parser;

use polidoc_pipeline::api::PolidocEngine;
use polidoc_pipeline::io::write_manifest;

/// Evaluate a policy document against a questionnaire through the
/// eight-gate pipeline.
#[derive(Debug, Parser)]
#[command(name = "polidoc", version, about)]
struct Cli {
    /// Path to the pipeline configuration file (YAML/JSON/TOML).
    #[arg(long, env = "POLIDOC_CONFIG")]
    config: PathBuf,

    /// Where to write the resulting manifest as JSON.
    #[arg(long, default_value = "manifest.json")]
    manifest_out: PathBuf,

    /// Enable debug-level tracing.
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_target(false)
        .init();

    let engine = PolidocEngine::new();
    let raw_config = polidoc_pipeline::core::config::load_raw_config(&cli.config)?;
    let (manifest, macro_score) = engine.evaluate_raw(raw_config).await?;

    write_manifest(&manifest, &cli.manifest_out)?;

    match &macro_score {
        Some(score) => {
            tracing::info!(
                score = score.score,
                band = ?score.quality_band,
                "evaluation completed"
            );
        }
        None => {
            tracing::error!(
                terminal_phase = ?manifest.terminal_phase_index(),
                "evaluation aborted"
            );
        }
    }

    std::process::exit(exit_code(&manifest));
}

/// Encodes the manifest's outcome as a process exit code: `0` on success,
/// `10 + phase_index` on an abort at a known phase, `1` if the manifest
/// aborted with no phase index (should not happen in practice).
fn exit_code(manifest: &polidoc_pipeline::core::pipeline::Manifest) -> i32 {
    use polidoc_pipeline::core::pipeline::OverallStatus;
    match manifest.overall_status {
        OverallStatus::Success => 0,
        OverallStatus::Aborted => manifest
            .terminal_phase_index()
            .map(|p| 10 + p as i32)
            .unwrap_or(1),
    }
}

