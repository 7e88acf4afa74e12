use std::path::PathBuf;

use anyhow::{Result, anyhow};

use crate::loader::{DEFAULT_TEAM_COLUMN, LoadOptions, RosterSource};

const DEFAULT_MANIFEST: &str = "tournament.csv";
const DEFAULT_OUT: &str = "tournament_report.xlsx";
const VALUE_FLAGS: &[&str] = &["--manifest", "--out", "--json", "--team", "--roster", "--game"];

#[derive(Debug, Clone, PartialEq)]
pub struct ReportConfig {
    pub manifest: PathBuf,
    pub out: PathBuf,
    pub json: Option<PathBuf>,
    pub team_column: String,
    pub roster_source: RosterSource,
}

impl ReportConfig {
    /// `.env.local`, then `.env`, then the process environment, then CLI flags.
    pub fn from_env_and_args() -> Result<Self> {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        let args = std::env::args().skip(1).collect::<Vec<_>>();
        Self::resolve(&args, |key| std::env::var(key).ok())
    }

    pub fn resolve(args: &[String], env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let pick = |flag: &str, key: &str| {
            flag_value(args, flag).or_else(|| env(key).filter(|v| !v.trim().is_empty()))
        };

        let manifest = positional(args)
            .or_else(|| pick("--manifest", "PITCH_STATS_MANIFEST"))
            .unwrap_or_else(|| DEFAULT_MANIFEST.to_string());
        let out = pick("--out", "PITCH_STATS_OUT").unwrap_or_else(|| DEFAULT_OUT.to_string());
        let json = pick("--json", "PITCH_STATS_JSON").map(PathBuf::from);
        let team_column =
            pick("--team", "PITCH_STATS_TEAM").unwrap_or_else(|| DEFAULT_TEAM_COLUMN.to_string());
        let roster_source = match pick("--roster", "PITCH_STATS_ROSTER") {
            Some(raw) => raw.parse::<RosterSource>().map_err(|err| anyhow!(err))?,
            None => RosterSource::default(),
        };

        Ok(Self {
            manifest: PathBuf::from(manifest),
            out: PathBuf::from(out),
            json,
            team_column,
            roster_source,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            team_column: self.team_column.clone(),
            roster_source: self.roster_source,
        }
    }
}

pub fn flag_value(args: &[String], flag: &str) -> Option<String> {
    for (idx, arg) in args.iter().enumerate() {
        if let Some(value) = arg
            .strip_prefix(flag)
            .and_then(|rest| rest.strip_prefix('='))
        {
            let trimmed = value.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if arg == flag {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(next.clone());
            }
        }
    }
    None
}

fn positional(args: &[String]) -> Option<String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg.starts_with("--") {
            skip_next = VALUE_FLAGS.contains(&arg.as_str());
            continue;
        }
        return Some(arg.clone());
    }
    None
}
