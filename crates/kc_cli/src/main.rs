//! KillCoach CLI
//!
//! Reads a serialized match record (the replay decoder's JSON output),
//! runs the coaching analysis, and writes the JSON report, coaching
//! prompt, and the append-only TSV stats log.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::debug;

use kc_core::{analyze_replay, AnalysisConfig, AnalyzeOptions, MatchRecord};

mod output;

#[derive(Parser)]
#[command(name = "killcoach")]
#[command(about = "AoE2 replay coaching analyzer", long_about = None)]
struct Cli {
    /// Serialized match record (JSON) produced by the replay decoder
    record: PathBuf,

    /// Directory to write outputs
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Your in-game player name (case-insensitive match)
    #[arg(long)]
    you_name: Option<String>,

    /// Player position (1 or 2) for your POV
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=2))]
    you_player: Option<u8>,

    /// Export level tag for the JSON output
    #[arg(long, default_value = "coach", value_parser = ["coach", "full"])]
    export_level: String,

    /// Write the TSV header row even when appending to an existing file
    #[arg(long, default_value = "row", value_parser = ["row", "header-row"])]
    tsv_mode: String,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.record)
        .with_context(|| format!("reading record {}", cli.record.display()))?;
    let record: MatchRecord =
        serde_json::from_str(&raw).context("parsing serialized match record")?;
    debug!(players = record.players.len(), actions = record.actions.len(), "record loaded");

    let options = AnalyzeOptions {
        you_name: cli.you_name.clone(),
        you_player: cli.you_player.map(usize::from),
        export_level: Some(cli.export_level.clone()),
    };
    let report = analyze_replay(&record, &options, &AnalysisConfig::default())
        .context("analyzing replay record")?;

    let outputs = output::write_outputs(&report, &cli.out_dir, &cli.tsv_mode)
        .context("writing outputs")?;
    println!("Written outputs:");
    println!("- json: {}", outputs.json.display());
    println!("- prompt: {}", outputs.prompt.display());
    println!("- tsv: {}", outputs.tsv.display());
    Ok(())
}
