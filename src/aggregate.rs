use serde::Serialize;

use crate::error::StatsResult;
use crate::joiner;
use crate::records::{Game, Gender, PointBucket, Roster};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndividualStats {
    pub name: String,
    pub gender: Gender,
    pub points_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub o_converted: u32,
    pub o_conceded: u32,
    pub d_converted: u32,
    pub d_conceded: u32,
}

impl IndividualStats {
    fn empty(name: &str, gender: Gender) -> Self {
        Self {
            name: name.to_string(),
            gender,
            points_played: 0,
            goals: 0,
            assists: 0,
            o_converted: 0,
            o_conceded: 0,
            d_converted: 0,
            d_conceded: 0,
        }
    }

    pub fn o_points(&self) -> u32 {
        self.o_converted + self.o_conceded
    }

    pub fn d_points(&self) -> u32 {
        self.d_converted + self.d_conceded
    }

    pub fn conceded(&self) -> u32 {
        self.o_conceded + self.d_conceded
    }

    /// Negative when the sheet totals disagree with the bucketed points.
    pub fn converted_not_ga(&self) -> i64 {
        i64::from(self.points_played)
            - (i64::from(self.goals) + i64::from(self.assists) + i64::from(self.conceded()))
    }

    fn bump(&mut self, bucket: PointBucket) {
        match bucket {
            PointBucket::OConverted => self.o_converted += 1,
            PointBucket::OConceded => self.o_conceded += 1,
            PointBucket::DConverted => self.d_converted += 1,
            PointBucket::DConceded => self.d_conceded += 1,
        }
    }
}

pub fn compute_individual_stats(games: &[Game], roster: &Roster) -> StatsResult<Vec<IndividualStats>> {
    let mut rows: Vec<IndividualStats> = roster
        .entries()
        .iter()
        .map(|e| IndividualStats::empty(&e.name, e.gender))
        .collect();

    for game in games {
        for record in &game.pitch.records {
            let Some(idx) = roster.position(&record.name) else { continue };
            let row = &mut rows[idx];
            row.points_played += record.points_played;
            row.goals += record.goals;
            row.assists += record.assists;
        }

        let mut unbucketed = 0usize;
        for joined in joiner::join_game(game)? {
            let Some(bucket) = joined.point.bucket() else {
                unbucketed += 1;
                continue;
            };
            for player in joined.present {
                if let Some(idx) = roster.position(&player.name) {
                    rows[idx].bump(bucket);
                }
            }
        }
        if unbucketed > 0 {
            log::warn!(
                "{unbucketed} points vs {} lack a starting side or outcome; left out of O/D buckets",
                game.opponent
            );
        }
    }

    rows.sort_by(|a, b| b.points_played.cmp(&a.points_played));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeMap, BTreeSet};

    use super::*;
    use crate::records::{FieldCell, PitchRecord, PitchTable, Point, RosterEntry, StartingSide};

    fn point(number: u32, side: Option<StartingSide>, scored: Option<bool>) -> Point {
        let mut p = Point::new(number);
        p.starting_side = side;
        p.did_we_score = scored;
        p
    }

    fn record(name: &str, played: u32, cells: &[(u32, FieldCell)]) -> PitchRecord {
        PitchRecord {
            name: name.to_string(),
            gender: Gender::M,
            points_played: played,
            goals: 0,
            assists: 0,
            cells: cells.iter().copied().collect::<BTreeMap<_, _>>(),
        }
    }

    fn roster(names: &[&str]) -> Roster {
        Roster::from_entries(names.iter().map(|n| RosterEntry {
            name: n.to_string(),
            gender: Gender::M,
        }))
    }

    #[test]
    fn missing_side_keeps_points_played_but_no_bucket() {
        let game = Game {
            opponent: "Tigers".into(),
            points: vec![
                point(1, Some(StartingSide::Defense), Some(false)),
                point(2, None, Some(true)),
            ],
            pitch: PitchTable {
                point_columns: BTreeSet::from([1, 2]),
                records: vec![record(
                    "Dan",
                    2,
                    &[(1, FieldCell::OnField), (2, FieldCell::OnField)],
                )],
            },
        };
        let stats = compute_individual_stats(&[game], &roster(&["Dan"])).unwrap();
        let dan = &stats[0];
        assert_eq!(dan.points_played, 2);
        assert_eq!(dan.d_conceded, 1);
        assert_eq!(dan.o_points() + dan.d_points(), 1);
        assert_eq!(dan.converted_not_ga(), 1);
    }

    #[test]
    fn players_missing_from_a_game_count_zero_and_sort_is_stable() {
        let game = Game {
            opponent: "Lions".into(),
            points: vec![point(1, Some(StartingSide::Offense), Some(true))],
            pitch: PitchTable {
                point_columns: BTreeSet::from([1]),
                records: vec![record("Eve", 1, &[(1, FieldCell::OnField)])],
            },
        };
        let stats = compute_individual_stats(&[game], &roster(&["Abe", "Bea", "Eve"])).unwrap();
        let names: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Eve", "Abe", "Bea"]);
        assert_eq!(stats[1].points_played, 0);
        assert_eq!(stats[0].o_converted, 1);
    }
}
