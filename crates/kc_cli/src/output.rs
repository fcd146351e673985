//! Report writers: pretty JSON, coaching prompt, and the append-only TSV
//! stats log.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};

use kc_core::CoachReport;

/// Paths produced by one `write_outputs` call.
pub struct WrittenOutputs {
    pub json: PathBuf,
    pub prompt: PathBuf,
    pub tsv: PathBuf,
}

/// TSV filename shared across runs; rows append match over match.
const TSV_FILENAME: &str = "aoe2killcoach_stats.tsv";

/// Keep alphanumerics plus `-` and `_`; everything else becomes `_`, with
/// runs of `_` collapsed and trimmed.
pub fn sanitize_filename(value: &str) -> String {
    let safe: String = value
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect();
    safe.split('_').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("_")
}

/// The coaching prompt that accompanies the JSON report.
pub fn build_prompt(report: &CoachReport) -> String {
    let you = &report.players.you;
    let opponent = &report.players.opponent;
    let summary = format!(
        "Map: {}. You ({}) vs {}. Result: {}.",
        report.match_info.map.as_deref().unwrap_or("unknown"),
        you.civilization.as_deref().unwrap_or("unknown"),
        opponent.civilization.as_deref().unwrap_or("unknown"),
        if you.winner { "Win" } else { "Loss" },
    );
    format!(
        "# AoE2 KillCoach Prompt\n\n\
         {summary}\n\n\
         ## Coaching Instructions\n\
         - Focus on high-impact coaching points based on timings, units, eco, and counters.\n\
         - Reference coach_view sections for timings, eco health, unit composition, and counters.\n\
         - Provide actionable, prioritized feedback with timestamps when possible.\n\
         - Avoid repeating raw JSON; summarize insights concisely.\n"
    )
}

/// One flat row per match for the cross-run TSV log.
pub fn build_tsv_row(report: &CoachReport) -> (Vec<&'static str>, Vec<String>) {
    let columns = vec![
        "timestamp",
        "map",
        "you_name",
        "opponent_name",
        "you_civ",
        "opponent_civ",
        "result",
        "duration",
        "you_feudal_click",
        "you_castle_click",
        "you_imp_click",
        "opp_feudal_click",
        "opp_castle_click",
        "opp_imp_click",
        "you_tc_idle_total",
        "opp_tc_idle_total",
    ];
    let you = &report.players.you;
    let opponent = &report.players.opponent;
    let you_ages = &report.coach_view.timings.you.ages;
    let opponent_ages = &report.coach_view.timings.opponent.ages;
    let opt = |value: &Option<String>| value.clone().unwrap_or_default();
    let row = vec![
        report.match_info.timestamp.map(|ts| ts.to_string()).unwrap_or_default(),
        opt(&report.match_info.map),
        opt(&you.name),
        opt(&opponent.name),
        opt(&you.civilization),
        opt(&opponent.civilization),
        if you.winner { "Win" } else { "Loss" }.to_string(),
        report.match_info.duration.to_string(),
        opt(&you_ages.feudal.click_time_str),
        opt(&you_ages.castle.click_time_str),
        opt(&you_ages.imperial.click_time_str),
        opt(&opponent_ages.feudal.click_time_str),
        opt(&opponent_ages.castle.click_time_str),
        opt(&opponent_ages.imperial.click_time_str),
        report.coach_view.eco_health.you.tc_idle_time.total.to_string(),
        report.coach_view.eco_health.opponent.tc_idle_time.total.to_string(),
    ];
    (columns, row)
}

fn friendly_name(report: &CoachReport) -> String {
    let timestamp = report
        .match_info
        .timestamp
        .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0))
        .unwrap_or_else(Utc::now);
    let name = format!(
        "{}_{}_vs_{}_{}",
        report.match_info.map.as_deref().unwrap_or("map"),
        report.players.you.civilization.as_deref().unwrap_or("you"),
        report.players.opponent.civilization.as_deref().unwrap_or("opp"),
        timestamp.format("%Y-%m-%d_%H%M"),
    );
    sanitize_filename(&name)
}

/// Write the JSON report, prompt, and TSV row into `out_dir`.
pub fn write_outputs(
    report: &CoachReport,
    out_dir: &Path,
    tsv_mode: &str,
) -> Result<WrittenOutputs> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("creating output directory {}", out_dir.display()))?;

    let friendly = friendly_name(report);
    let json_path = out_dir.join(format!("{friendly}.llm.json"));
    let prompt_path = out_dir.join(format!("{friendly}.prompt.md"));
    let tsv_path = out_dir.join(TSV_FILENAME);

    let json = serde_json::to_string_pretty(report).context("serializing report")?;
    fs::write(&json_path, json)
        .with_context(|| format!("writing {}", json_path.display()))?;
    fs::write(&prompt_path, build_prompt(report))
        .with_context(|| format!("writing {}", prompt_path.display()))?;

    let (columns, row) = build_tsv_row(report);
    let write_header = tsv_mode == "header-row" || !tsv_path.exists();
    let mut tsv = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&tsv_path)
        .with_context(|| format!("opening {}", tsv_path.display()))?;
    if write_header {
        writeln!(tsv, "{}", columns.join("\t"))?;
    }
    writeln!(tsv, "{}", row.join("\t"))?;

    Ok(WrittenOutputs { json: json_path, prompt: prompt_path, tsv: tsv_path })
}

#[cfg(test)]
mod tests {
    use super::*;
    use kc_core::{analyze_replay, AnalysisConfig, AnalyzeOptions, MatchRecord};
    use serde_json::json;

    fn sample_report() -> CoachReport {
        let record: MatchRecord = serde_json::from_value(json!({
            "map": "Arabia",
            "duration": 900,
            "timestamp": 1700000000,
            "players": [
                {"name": "You", "civilization": "Franks", "winner": true},
                {"name": "Opp", "civilization": "Britons", "winner": false},
            ],
        }))
        .unwrap();
        analyze_replay(&record, &AnalyzeOptions::default(), &AnalysisConfig::default()).unwrap()
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Arabia vs. Arena"), "Arabia_vs_Arena");
        assert_eq!(sanitize_filename("a/b:c"), "a_b_c");
        assert_eq!(sanitize_filename("__x__"), "x");
        assert_eq!(sanitize_filename("black-forest"), "black-forest");
    }

    #[test]
    fn test_prompt_mentions_map_and_result() {
        let prompt = build_prompt(&sample_report());
        assert!(prompt.contains("Arabia"));
        assert!(prompt.contains("Franks"));
        assert!(prompt.contains("Result: Win."));
        assert!(prompt.contains("Coaching Instructions"));
    }

    #[test]
    fn test_tsv_row_alignment() {
        let (columns, row) = build_tsv_row(&sample_report());
        assert_eq!(columns.len(), row.len());
        assert_eq!(columns[0], "timestamp");
        assert_eq!(row[4], "Franks");
        assert_eq!(row[6], "Win");
        assert_eq!(row[7], "900");
    }

    #[test]
    fn test_write_outputs_appends_tsv() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();

        let first = write_outputs(&report, dir.path(), "row").unwrap();
        assert!(first.json.exists());
        assert!(first.prompt.exists());

        write_outputs(&report, dir.path(), "row").unwrap();
        let tsv = fs::read_to_string(&first.tsv).unwrap();
        let lines: Vec<&str> = tsv.lines().collect();
        // Header once, then one row per run.
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("timestamp\tmap"));

        write_outputs(&report, dir.path(), "header-row").unwrap();
        let tsv = fs::read_to_string(&first.tsv).unwrap();
        assert_eq!(tsv.lines().filter(|l| l.starts_with("timestamp\t")).count(), 2);
    }

    #[test]
    fn test_json_output_parses_back() {
        let report = sample_report();
        let dir = tempfile::tempdir().unwrap();
        let outputs = write_outputs(&report, dir.path(), "row").unwrap();
        let raw = fs::read_to_string(&outputs.json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["schema_version"], "0.4.0");
        assert_eq!(value["match"]["map"], "Arabia");
    }
}
