use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rust_xlsxwriter::{Workbook, Worksheet};
use serde::Serialize;

use crate::aggregate::{self, IndividualStats};
use crate::derived::{self, GaRank, OdEfficiency, OdLeanSummary, PointResultShares, RankBy};
use crate::error::StatsResult;
use crate::pairing::{self, DisparityRow, GaFlowLink, GenderStats, GoalAssistPair, PairCodeCount};
use crate::possession::{self, PlayerPossessions};
use crate::records::Tournament;
use crate::timeline::{self, GameTimeline};

#[derive(Debug, Clone, Serialize)]
pub struct TournamentReport {
    pub generated_at: String,
    pub games: Vec<String>,
    pub individual_stats: Vec<IndividualStats>,
    pub mean_points_played: f64,
    pub goal_assist_pairs: Vec<GoalAssistPair>,
    pub ga_flow: Vec<GaFlowLink>,
    pub pair_codes: Vec<PairCodeCount>,
    pub gender_stats: Vec<GenderStats>,
    pub disparity: Vec<DisparityRow>,
    pub possessions: Vec<PlayerPossessions>,
    pub point_shares: Vec<PointResultShares>,
    pub efficiency: Vec<OdEfficiency>,
    pub od_lean: OdLeanSummary,
    pub goal_rank: Vec<GaRank>,
    pub assist_rank: Vec<GaRank>,
    pub timelines: Vec<GameTimeline>,
}

pub struct ExportSummary {
    pub sheets: usize,
    pub players: usize,
    pub pairs: usize,
    pub games: usize,
}

pub fn build_report(tournament: &Tournament) -> StatsResult<TournamentReport> {
    let games = &tournament.games;
    let roster = &tournament.roster;

    let individual_stats = aggregate::compute_individual_stats(games, roster)?;
    let pairs = pairing::goal_assist_pairs(games)?;
    let gender_stats = pairing::compute_gender_stats(games, &pairs, roster);

    Ok(TournamentReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        games: games.iter().map(|g| g.opponent.clone()).collect(),
        mean_points_played: derived::mean_points_played(&individual_stats),
        ga_flow: pairing::ga_flow_links(&pairs, roster),
        pair_codes: pairing::pair_code_counts(&pairs, roster),
        disparity: pairing::disparity(&gender_stats, &pairs, roster),
        possessions: possession::possession_distributions(games, roster)?,
        point_shares: derived::point_result_shares(&individual_stats),
        efficiency: derived::od_efficiency(&individual_stats),
        od_lean: derived::od_lean(&individual_stats),
        goal_rank: derived::ga_rankings(&individual_stats, RankBy::Goals),
        assist_rank: derived::ga_rankings(&individual_stats, RankBy::Assists),
        timelines: games.iter().map(timeline::game_timeline).collect(),
        individual_stats,
        goal_assist_pairs: pairs,
        gender_stats,
    })
}

pub fn write_json_report(path: &Path, report: &TournamentReport) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok();
    }
    let raw = serde_json::to_string_pretty(report).context("serialize report")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

pub fn write_workbook(path: &Path, report: &TournamentReport) -> Result<ExportSummary> {
    let sheets: Vec<(&str, Vec<Vec<String>>)> = vec![
        ("IndividualStats", individual_rows(&report.individual_stats)),
        ("GoalAssistPairs", pair_rows(&report.goal_assist_pairs)),
        ("GAFlow", flow_rows(&report.ga_flow)),
        ("PairCodes", pair_code_rows(&report.pair_codes)),
        ("GenderStats", gender_rows(&report.gender_stats)),
        ("Disparity", disparity_rows(&report.disparity)),
        ("Possessions", possession_rows(&report.possessions)),
        ("PointShares", share_rows(&report.point_shares)),
        ("Efficiency", efficiency_rows(&report.efficiency)),
        ("ODLean", lean_rows(&report.od_lean)),
        ("GoalRank", rank_rows(&report.goal_rank, "Goals")),
        ("AssistRank", rank_rows(&report.assist_rank, "Assists")),
        ("Timeline", timeline_rows(&report.timelines)),
    ];

    let mut workbook = Workbook::new();
    for (name, rows) in &sheets {
        let sheet = workbook.add_worksheet();
        sheet.set_name(*name)?;
        write_rows(sheet, rows).with_context(|| format!("sheet {name}"))?;
    }

    workbook
        .save(path)
        .with_context(|| format!("failed writing workbook to {}", path.display()))?;

    Ok(ExportSummary {
        sheets: sheets.len(),
        players: report.individual_stats.len(),
        pairs: report.goal_assist_pairs.len(),
        games: report.games.len(),
    })
}

fn header(cols: &[&str]) -> Vec<String> {
    cols.iter().map(|c| c.to_string()).collect()
}

fn individual_rows(stats: &[IndividualStats]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Name",
        "Gender",
        "Points Played",
        "Goals",
        "Assists",
        "O Converted",
        "O Conceded",
        "D Converted",
        "D Conceded",
        "O Points",
        "D Points",
        "Conceded",
        "Converted, not GA",
    ])];
    rows.extend(stats.iter().map(|s| {
        vec![
            s.name.clone(),
            s.gender.code().to_string(),
            s.points_played.to_string(),
            s.goals.to_string(),
            s.assists.to_string(),
            s.o_converted.to_string(),
            s.o_conceded.to_string(),
            s.d_converted.to_string(),
            s.d_conceded.to_string(),
            s.o_points().to_string(),
            s.d_points().to_string(),
            s.conceded().to_string(),
            s.converted_not_ga().to_string(),
        ]
    }));
    rows
}

fn pair_rows(pairs: &[GoalAssistPair]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Opponent", "Point", "Assists", "Goals", "Gender ratio"])];
    rows.extend(pairs.iter().map(|p| {
        vec![
            p.opponent.clone(),
            p.point.to_string(),
            p.assister.clone(),
            p.scorer.clone(),
            p.gender_ratio.map(|r| r.code()).unwrap_or_default().to_string(),
        ]
    }));
    rows
}

fn flow_rows(links: &[GaFlowLink]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Assists", "Goals", "Counts", "GA pair"])];
    rows.extend(links.iter().map(|l| {
        vec![
            l.assister.clone(),
            l.scorer.clone(),
            l.count.to_string(),
            l.code.map(|c| c.as_str()).unwrap_or_default().to_string(),
        ]
    }));
    rows
}

fn pair_code_rows(counts: &[PairCodeCount]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Pair Type", "GA pair"])];
    rows.extend(
        counts
            .iter()
            .map(|c| vec![c.code.as_str().to_string(), c.count.to_string()]),
    );
    rows
}

fn gender_rows(stats: &[GenderStats]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Ratio",
        "Gender ratio",
        "Converted",
        "Conceded",
        "F Goals",
        "M Goals",
        "F Assists",
        "M Assists",
    ])];
    rows.extend(stats.iter().map(|s| {
        vec![
            s.ratio.code().to_string(),
            s.points.to_string(),
            s.converted.to_string(),
            s.conceded.to_string(),
            s.f_goals.to_string(),
            s.m_goals.to_string(),
            s.f_assists.to_string(),
            s.m_assists.to_string(),
        ]
    }));
    rows
}

fn disparity_rows(rows_in: &[DisparityRow]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "AG Type",
        "F Point %",
        "M Point %",
        "F Numbers",
        "M Numbers",
        "Theoretical",
        "Actual",
        "Difference",
    ])];
    rows.extend(rows_in.iter().map(|r| {
        vec![
            r.code.as_str().to_string(),
            fmt_f64(r.female_share),
            fmt_f64(r.male_share),
            fmt_f64(r.female_expected),
            fmt_f64(r.male_expected),
            fmt_f64(r.theoretical),
            r.actual.to_string(),
            fmt_f64(r.difference),
        ]
    }));
    rows
}

fn possession_rows(players: &[PlayerPossessions]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Name", "Outcome", "Possessions"])];
    for p in players {
        rows.extend(
            p.converted
                .iter()
                .map(|n| vec![p.name.clone(), "Converted".to_string(), n.to_string()]),
        );
        rows.extend(
            p.conceded
                .iter()
                .map(|n| vec![p.name.clone(), "Conceded".to_string(), n.to_string()]),
        );
    }
    rows
}

fn share_rows(shares: &[PointResultShares]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Name", "Conceded", "Converted", "Assists", "Goals"])];
    rows.extend(shares.iter().map(|s| {
        vec![
            s.name.clone(),
            fmt_f64(s.conceded),
            fmt_f64(s.converted_not_ga),
            fmt_f64(s.assists),
            fmt_f64(s.goals),
        ]
    }));
    rows
}

fn efficiency_rows(eff: &[OdEfficiency]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Name",
        "Converting on O",
        "Conceding on O",
        "Converting on D",
        "Conceding on D",
    ])];
    rows.extend(eff.iter().map(|e| {
        vec![
            e.name.clone(),
            fmt_f64(e.o_converted),
            fmt_f64(e.o_conceded),
            fmt_f64(e.d_converted),
            fmt_f64(e.d_conceded),
        ]
    }));
    rows
}

fn lean_rows(lean: &OdLeanSummary) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Name", "Gender", "O Score", "D Score"])];
    rows.extend(lean.players.iter().map(|p| {
        vec![
            p.name.clone(),
            p.gender.code().to_string(),
            fmt_f64(p.o_score),
            fmt_f64(p.d_score),
        ]
    }));
    rows.push(vec![
        "Band (std)".to_string(),
        String::new(),
        fmt_f64(lean.o_band),
        fmt_f64(lean.d_band),
    ]);
    rows
}

fn rank_rows(ranks: &[GaRank], label: &str) -> Vec<Vec<String>> {
    let mut rows = vec![header(&["Rank", "Name", "Gender", label])];
    rows.extend(ranks.iter().map(|r| {
        vec![
            r.rank.to_string(),
            r.name.clone(),
            r.gender.code().to_string(),
            r.value.to_string(),
        ]
    }));
    rows
}

fn timeline_rows(timelines: &[GameTimeline]) -> Vec<Vec<String>> {
    let mut rows = vec![header(&[
        "Opponent",
        "Point number",
        "Us",
        "Them",
        "Ratio",
        "Did we score",
        "Timeouts",
    ])];
    for t in timelines {
        let first = t.points.first().map(|p| p.point).unwrap_or(0);
        let last = t.points.last().map(|p| p.point).unwrap_or(0);
        for p in &t.points {
            let timeouts = t
                .timeouts
                .iter()
                .filter(|to| timeout_row(to.position, first, last) == p.point)
                .map(|to| format!("{}@{}", to.caller.code(), to.position))
                .collect::<Vec<_>>()
                .join(" ");
            rows.push(vec![
                t.opponent.clone(),
                p.point.to_string(),
                opt_to_string(p.our_score),
                opt_to_string(p.their_score),
                p.label.clone(),
                p.did_we_score
                    .map(|s| if s { "1" } else { "0" }.to_string())
                    .unwrap_or_default(),
                timeouts,
            ]);
        }
    }
    rows
}

// Timeouts before the first point or after the last sit on the nearest point's row.
fn timeout_row(position: f64, first: u32, last: u32) -> u32 {
    (position.floor().max(0.0) as u32).clamp(first, last.max(first))
}

fn fmt_f64(v: f64) -> String {
    if v.is_finite() {
        format!("{v:.3}")
    } else {
        String::new()
    }
}

fn opt_to_string<T: std::fmt::Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet
                .write_string(row_idx as u32, col_idx as u16, value)
                .with_context(|| format!("write cell ({row_idx},{col_idx})"))?;
        }
    }
    Ok(())
}
