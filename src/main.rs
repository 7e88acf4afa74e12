use anyhow::{Context, Result};

use pitch_stats::config::ReportConfig;
use pitch_stats::{export, loader};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cfg = ReportConfig::from_env_and_args()?;
    let tournament = loader::load_tournament(&cfg.manifest, &cfg.load_options())
        .with_context(|| format!("load tournament {}", cfg.manifest.display()))?;
    let report = export::build_report(&tournament).context("compute tournament statistics")?;

    let summary = export::write_workbook(&cfg.out, &report)?;
    if let Some(json) = cfg.json.as_deref() {
        export::write_json_report(json, &report)?;
    }

    println!("Tournament report complete");
    println!("Manifest: {}", cfg.manifest.display());
    println!("Games: {}", summary.games);
    println!("Players: {}", summary.players);
    println!("Goal/assist pairs: {}", summary.pairs);
    println!("Workbook: {} ({} sheets)", cfg.out.display(), summary.sheets);
    if let Some(json) = &cfg.json {
        println!("JSON: {}", json.display());
    }
    if let Some(top) = report.individual_stats.first() {
        println!(
            "Most points played: {} ({}, team mean {:.1})",
            top.name, top.points_played, report.mean_points_played
        );
    }
    for row in &report.disparity {
        println!(
            " - {}: theoretical {:.2}, actual {}, difference {:+.2}",
            row.code.as_str(),
            row.theoretical,
            row.actual,
            row.difference
        );
    }

    Ok(())
}
