use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::{StatsError, StatsResult};
use crate::records::{FieldCell, Game, Gender, GenderRatio, Roster};

// Shares per converted point, in `PairCode::ALL` order.
pub const FEMALE_MAJORITY_SHARES: [f64; 4] = [2.0 / 7.0, 2.0 / 7.0, 2.0 / 7.0, 1.0 / 7.0];
pub const MALE_MAJORITY_SHARES: [f64; 4] = [1.0 / 7.0, 2.0 / 7.0, 2.0 / 7.0, 2.0 / 7.0];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalAssistPair {
    pub opponent: String,
    pub point: u32,
    pub scorer: String,
    pub assister: String,
    pub gender_ratio: Option<GenderRatio>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum PairCode {
    FF,
    FM,
    MF,
    MM,
}

impl PairCode {
    pub const ALL: [PairCode; 4] = [PairCode::FF, PairCode::FM, PairCode::MF, PairCode::MM];

    pub fn from_genders(assister: Gender, scorer: Gender) -> Self {
        match (assister, scorer) {
            (Gender::F, Gender::F) => PairCode::FF,
            (Gender::F, Gender::M) => PairCode::FM,
            (Gender::M, Gender::F) => PairCode::MF,
            (Gender::M, Gender::M) => PairCode::MM,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PairCode::FF => "FF",
            PairCode::FM => "FM",
            PairCode::MF => "MF",
            PairCode::MM => "MM",
        }
    }

    fn index(self) -> usize {
        match self {
            PairCode::FF => 0,
            PairCode::FM => 1,
            PairCode::MF => 2,
            PairCode::MM => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairCodeCount {
    pub code: PairCode,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GaFlowLink {
    pub assister: String,
    pub scorer: String,
    pub count: usize,
    pub code: Option<PairCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenderStats {
    pub ratio: GenderRatio,
    pub points: usize,
    pub converted: usize,
    pub conceded: usize,
    pub f_goals: usize,
    pub m_goals: usize,
    pub f_assists: usize,
    pub m_assists: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisparityRow {
    pub code: PairCode,
    pub female_share: f64,
    pub male_share: f64,
    pub female_expected: f64,
    pub male_expected: f64,
    pub theoretical: f64,
    pub actual: usize,
    pub difference: f64,
}

pub fn goal_assist_pairs(games: &[Game]) -> StatsResult<Vec<GoalAssistPair>> {
    let mut out = Vec::new();
    for game in games {
        for point in &game.points {
            if !game.pitch.has_point_column(point.number) {
                continue;
            }
            let scorer = single_marker(game, point.number, FieldCell::Goal)?;
            let assister = single_marker(game, point.number, FieldCell::Assist)?;
            let (Some(scorer), Some(assister)) = (scorer, assister) else {
                continue;
            };
            out.push(GoalAssistPair {
                opponent: game.opponent.clone(),
                point: point.number,
                scorer: scorer.to_string(),
                assister: assister.to_string(),
                gender_ratio: point.gender_ratio,
            });
        }
    }
    Ok(out)
}

fn single_marker(game: &Game, point: u32, marker: FieldCell) -> StatsResult<Option<&str>> {
    let mut holders = game
        .pitch
        .records
        .iter()
        .filter(|r| r.cell(point) == Some(marker))
        .map(|r| r.name.as_str());
    let first = holders.next();
    if let Some(second) = holders.next() {
        return Err(StatsError::JoinAmbiguity(format!(
            "point {point} vs {} has {:?} recorded for both {} and {second}",
            game.opponent,
            marker,
            first.unwrap_or_default()
        )));
    }
    Ok(first)
}

pub fn pair_code(pair: &GoalAssistPair, roster: &Roster) -> Option<PairCode> {
    let assister = roster.gender_of(&pair.assister)?;
    let scorer = roster.gender_of(&pair.scorer)?;
    Some(PairCode::from_genders(assister, scorer))
}

fn observed_counts(pairs: &[GoalAssistPair], roster: &Roster) -> [usize; 4] {
    let mut counts = [0usize; 4];
    let mut unmatched = 0usize;
    for pair in pairs {
        match pair_code(pair, roster) {
            Some(code) => counts[code.index()] += 1,
            None => unmatched += 1,
        }
    }
    if unmatched > 0 {
        log::warn!("{unmatched} goal/assist pairs name players outside the roster; not coded");
    }
    counts
}

pub fn pair_code_counts(pairs: &[GoalAssistPair], roster: &Roster) -> Vec<PairCodeCount> {
    let counts = observed_counts(pairs, roster);
    let mut out: Vec<PairCodeCount> = PairCode::ALL
        .iter()
        .map(|&code| PairCodeCount {
            code,
            count: counts[code.index()],
        })
        .filter(|c| c.count > 0)
        .collect();
    out.sort_by(|a, b| b.count.cmp(&a.count));
    out
}

pub fn ga_flow_links(pairs: &[GoalAssistPair], roster: &Roster) -> Vec<GaFlowLink> {
    let mut grouped: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for pair in pairs {
        *grouped
            .entry((pair.assister.as_str(), pair.scorer.as_str()))
            .or_insert(0) += 1;
    }
    grouped
        .into_iter()
        .map(|((assister, scorer), count)| GaFlowLink {
            assister: assister.to_string(),
            scorer: scorer.to_string(),
            count,
            code: roster
                .gender_of(assister)
                .zip(roster.gender_of(scorer))
                .map(|(a, s)| PairCode::from_genders(a, s)),
        })
        .collect()
}

/// Points with no recorded outcome count as conceded.
pub fn compute_gender_stats(
    games: &[Game],
    pairs: &[GoalAssistPair],
    roster: &Roster,
) -> Vec<GenderStats> {
    let mut by_ratio: BTreeMap<GenderRatio, GenderStats> = BTreeMap::new();
    for point in games.iter().flat_map(|g| g.points.iter()) {
        let Some(ratio) = point.gender_ratio else { continue };
        let row = by_ratio.entry(ratio).or_insert_with(|| GenderStats {
            ratio,
            points: 0,
            converted: 0,
            conceded: 0,
            f_goals: 0,
            m_goals: 0,
            f_assists: 0,
            m_assists: 0,
        });
        row.points += 1;
        if point.did_we_score == Some(true) {
            row.converted += 1;
        }
    }

    for pair in pairs {
        let Some(row) = pair.gender_ratio.and_then(|r| by_ratio.get_mut(&r)) else {
            continue;
        };
        match roster.gender_of(&pair.scorer) {
            Some(Gender::F) => row.f_goals += 1,
            Some(Gender::M) => row.m_goals += 1,
            None => {}
        }
        match roster.gender_of(&pair.assister) {
            Some(Gender::F) => row.f_assists += 1,
            Some(Gender::M) => row.m_assists += 1,
            None => {}
        }
    }

    let mut rows: Vec<GenderStats> = by_ratio
        .into_values()
        .map(|mut row| {
            row.conceded = row.points - row.converted;
            row
        })
        .collect();
    rows.sort_by(|a, b| b.points.cmp(&a.points));
    rows
}

pub fn disparity(
    gender_stats: &[GenderStats],
    pairs: &[GoalAssistPair],
    roster: &Roster,
) -> Vec<DisparityRow> {
    let converted = |ratio: GenderRatio| {
        gender_stats
            .iter()
            .find(|s| s.ratio == ratio)
            .map(|s| s.converted as f64)
            .unwrap_or(0.0)
    };
    let f_converted = converted(GenderRatio::FemaleMajority);
    let m_converted = converted(GenderRatio::MaleMajority);
    let observed = observed_counts(pairs, roster);

    PairCode::ALL
        .iter()
        .map(|&code| {
            let female_share = FEMALE_MAJORITY_SHARES[code.index()];
            let male_share = MALE_MAJORITY_SHARES[code.index()];
            let female_expected = female_share * f_converted;
            let male_expected = male_share * m_converted;
            let theoretical = female_expected + male_expected;
            let actual = observed[code.index()];
            DisparityRow {
                code,
                female_share,
                male_share,
                female_expected,
                male_expected,
                theoretical,
                actual,
                difference: actual as f64 - theoretical,
            }
        })
        .collect()
}
