use serde::Serialize;

use crate::aggregate::IndividualStats;
use crate::records::Gender;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointResultShares {
    pub name: String,
    pub conceded: f64,
    pub converted_not_ga: f64,
    pub assists: f64,
    pub goals: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdEfficiency {
    pub name: String,
    pub o_converted: f64,
    pub o_conceded: f64,
    pub d_converted: f64,
    pub d_conceded: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdLean {
    pub name: String,
    pub gender: Gender,
    pub o_score: f64,
    pub d_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OdLeanSummary {
    pub players: Vec<OdLean>,
    /// Half-width of the neutral band on the O axis (population std of O scores).
    pub o_band: f64,
    pub d_band: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RankBy {
    Goals,
    Assists,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaRank {
    pub rank: usize,
    pub name: String,
    pub gender: Gender,
    pub value: u32,
}

/// `NaN` when the denominator is zero.
pub fn rate(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        f64::NAN
    } else {
        numerator / denominator
    }
}

pub fn point_result_shares(stats: &[IndividualStats]) -> Vec<PointResultShares> {
    stats
        .iter()
        .map(|s| {
            let played = f64::from(s.points_played);
            PointResultShares {
                name: s.name.clone(),
                conceded: rate(f64::from(s.conceded()), played),
                converted_not_ga: rate(s.converted_not_ga() as f64, played),
                assists: rate(f64::from(s.assists), played),
                goals: rate(f64::from(s.goals), played),
            }
        })
        .collect()
}

pub fn od_efficiency(stats: &[IndividualStats]) -> Vec<OdEfficiency> {
    stats
        .iter()
        .map(|s| {
            let o = f64::from(s.o_points());
            let d = f64::from(s.d_points());
            OdEfficiency {
                name: s.name.clone(),
                o_converted: rate(f64::from(s.o_converted), o),
                o_conceded: rate(f64::from(s.o_conceded), o),
                d_converted: rate(f64::from(s.d_converted), d),
                d_conceded: rate(f64::from(s.d_conceded), d),
            }
        })
        .collect()
}

pub fn od_lean(stats: &[IndividualStats]) -> OdLeanSummary {
    let efficiency = od_efficiency(stats);
    let o_mean = mean_skip_nan(efficiency.iter().map(|e| e.o_converted));
    let d_mean = mean_skip_nan(efficiency.iter().map(|e| e.d_converted));

    let players: Vec<OdLean> = stats
        .iter()
        .zip(&efficiency)
        .map(|(s, e)| OdLean {
            name: s.name.clone(),
            gender: s.gender,
            o_score: e.o_converted - o_mean,
            d_score: e.d_converted - d_mean,
        })
        .collect();

    OdLeanSummary {
        o_band: std_skip_nan(players.iter().map(|p| p.o_score)),
        d_band: std_skip_nan(players.iter().map(|p| p.d_score)),
        players,
    }
}

pub fn ga_rankings(stats: &[IndividualStats], by: RankBy) -> Vec<GaRank> {
    let value = |s: &IndividualStats| match by {
        RankBy::Goals => s.goals,
        RankBy::Assists => s.assists,
    };
    let mut sorted: Vec<&IndividualStats> = stats.iter().collect();
    sorted.sort_by(|a, b| value(b).cmp(&value(a)));
    sorted
        .into_iter()
        .enumerate()
        .map(|(idx, s)| GaRank {
            rank: idx + 1,
            name: s.name.clone(),
            gender: s.gender,
            value: value(s),
        })
        .collect()
}

pub fn mean_points_played(stats: &[IndividualStats]) -> f64 {
    mean_skip_nan(stats.iter().map(|s| f64::from(s.points_played)))
}

fn mean_skip_nan(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    rate(sum, n as f64)
}

fn std_skip_nan(values: impl Iterator<Item = f64> + Clone) -> f64 {
    let mean = mean_skip_nan(values.clone());
    mean_skip_nan(values.map(|v| (v - mean).powi(2))).sqrt()
}
