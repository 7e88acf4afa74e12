use std::fs;
use std::path::PathBuf;

use pitch_stats::export::{build_report, write_json_report, write_workbook};
use pitch_stats::loader::{LoadOptions, load_tournament};

fn manifest() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("tournament.csv");
    path
}

#[test]
fn report_tables_are_consistent() {
    let t = load_tournament(&manifest(), &LoadOptions::default()).unwrap();
    let report = build_report(&t).unwrap();

    assert_eq!(report.games, vec!["Tigers".to_string(), "Lions".to_string()]);
    assert_eq!(report.individual_stats.len(), 4);
    assert_eq!(report.point_shares.len(), 4);
    assert_eq!(report.efficiency.len(), 4);
    assert_eq!(report.goal_rank.len(), 4);
    assert_eq!(report.disparity.len(), 4);
    assert_eq!(report.timelines.len(), 2);
    assert!((report.mean_points_played - 21.0 / 4.0).abs() < 1e-9);

    let tigers = &report.timelines[0];
    assert_eq!(tigers.points[0].label, "FU");
    assert_eq!(tigers.points[3].our_score, Some(2));
    let positions: Vec<f64> = tigers.timeouts.iter().map(|t| t.position).collect();
    assert_eq!(positions, vec![2.5, 3.0]);
}

#[test]
fn writes_workbook_and_json() {
    let t = load_tournament(&manifest(), &LoadOptions::default()).unwrap();
    let report = build_report(&t).unwrap();
    let dir = tempfile::tempdir().unwrap();

    let xlsx = dir.path().join("report.xlsx");
    let summary = write_workbook(&xlsx, &report).unwrap();
    assert_eq!(summary.sheets, 13);
    assert_eq!(summary.players, 4);
    assert_eq!(summary.pairs, 3);
    assert!(fs::metadata(&xlsx).unwrap().len() > 0);

    let json_path = dir.path().join("out").join("report.json");
    write_json_report(&json_path, &report).unwrap();
    let raw = fs::read_to_string(&json_path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["individual_stats"].as_array().map(|a| a.len()), Some(4));
    assert_eq!(value["goal_assist_pairs"][0]["scorer"], "Alice");
    assert!(value["generated_at"].is_string());
}
