use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Gender {
    F,
    M,
}

impl Gender {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "F" | "f" => Some(Gender::F),
            "M" | "m" => Some(Gender::M),
            _ => None,
        }
    }

    pub fn code(self) -> char {
        match self {
            Gender::F => 'F',
            Gender::M => 'M',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum StartingSide {
    Offense,
    Defense,
}

impl StartingSide {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "O" | "o" => Some(StartingSide::Offense),
            "D" | "d" => Some(StartingSide::Defense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum GenderRatio {
    FemaleMajority,
    MaleMajority,
    Uneven,
}

impl GenderRatio {
    pub const ALL: [GenderRatio; 3] = [
        GenderRatio::FemaleMajority,
        GenderRatio::MaleMajority,
        GenderRatio::Uneven,
    ];

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "F" | "f" => Some(GenderRatio::FemaleMajority),
            "M" | "m" => Some(GenderRatio::MaleMajority),
            _ => Some(GenderRatio::Uneven),
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            GenderRatio::FemaleMajority => "F",
            GenderRatio::MaleMajority => "M",
            GenderRatio::Uneven => "U",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CalledBy {
    Us,
    Them,
    NotApplicable,
}

impl CalledBy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "u" | "us" | "team" => Some(CalledBy::Us),
            "t" | "them" | "opponent" => Some(CalledBy::Them),
            "" | "n/a" | "na" | "-" => Some(CalledBy::NotApplicable),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            CalledBy::Us => "U",
            CalledBy::Them => "T",
            CalledBy::NotApplicable => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum TimeoutCaller {
    Team,
    Opponent,
    Uneven,
}

impl TimeoutCaller {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "U" => Some(TimeoutCaller::Team),
            "T" => Some(TimeoutCaller::Opponent),
            "UT" | "TU" => Some(TimeoutCaller::Uneven),
            _ => None,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            TimeoutCaller::Team => "U",
            TimeoutCaller::Opponent => "T",
            TimeoutCaller::Uneven => "UT",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Timeout {
    pub caller: TimeoutCaller,
    /// Position on the point axis; between-point events sit at fractional positions.
    pub position: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointBucket {
    OConverted,
    OConceded,
    DConverted,
    DConceded,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Point {
    pub number: u32,
    pub our_score: Option<u32>,
    pub their_score: Option<u32>,
    pub did_we_score: Option<bool>,
    pub starting_side: Option<StartingSide>,
    pub gender_ratio: Option<GenderRatio>,
    pub gender_called_by: CalledBy,
    pub possessions: Option<u32>,
    pub midpoint_timeout: Option<TimeoutCaller>,
    pub between_point_timeout: Option<Timeout>,
}

impl Point {
    pub fn new(number: u32) -> Self {
        Self {
            number,
            our_score: None,
            their_score: None,
            did_we_score: None,
            starting_side: None,
            gender_ratio: None,
            gender_called_by: CalledBy::NotApplicable,
            possessions: None,
            midpoint_timeout: None,
            between_point_timeout: None,
        }
    }

    pub fn bucket(&self) -> Option<PointBucket> {
        let side = self.starting_side?;
        let scored = self.did_we_score?;
        Some(match (side, scored) {
            (StartingSide::Offense, true) => PointBucket::OConverted,
            (StartingSide::Offense, false) => PointBucket::OConceded,
            (StartingSide::Defense, true) => PointBucket::DConverted,
            (StartingSide::Defense, false) => PointBucket::DConceded,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FieldCell {
    Goal,
    Assist,
    OnField,
}

impl FieldCell {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "" => None,
            "G" => Some(FieldCell::Goal),
            "A" => Some(FieldCell::Assist),
            _ => Some(FieldCell::OnField),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PitchRecord {
    pub name: String,
    pub gender: Gender,
    pub points_played: u32,
    pub goals: u32,
    pub assists: u32,
    pub cells: BTreeMap<u32, FieldCell>,
}

impl PitchRecord {
    pub fn cell(&self, point: u32) -> Option<FieldCell> {
        self.cells.get(&point).copied()
    }

    pub fn was_on_field(&self, point: u32) -> bool {
        self.cells.contains_key(&point)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PitchTable {
    /// Point-number columns present in the export, whether or not any cell is filled.
    pub point_columns: BTreeSet<u32>,
    pub records: Vec<PitchRecord>,
}

impl PitchTable {
    pub fn has_point_column(&self, point: u32) -> bool {
        self.point_columns.contains(&point)
    }

    pub fn record(&self, name: &str) -> Option<&PitchRecord> {
        self.records.iter().find(|r| r.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub opponent: String,
    pub points: Vec<Point>,
    pub pitch: PitchTable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RosterEntry {
    pub name: String,
    pub gender: Gender,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Roster {
    entries: Vec<RosterEntry>,
    #[serde(skip)]
    by_name: HashMap<String, usize>,
}

impl Roster {
    /// Duplicate names keep their first occurrence.
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut roster = Roster::default();
        for entry in entries {
            roster.push(entry);
        }
        roster
    }

    pub fn from_pitch_table(table: &PitchTable) -> Self {
        Self::from_entries(table.records.iter().map(|r| RosterEntry {
            name: r.name.clone(),
            gender: r.gender,
        }))
    }

    pub fn push(&mut self, entry: RosterEntry) -> bool {
        if self.by_name.contains_key(&entry.name) {
            return false;
        }
        self.by_name.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn gender_of(&self, name: &str) -> Option<Gender> {
        self.position(name).map(|idx| self.entries[idx].gender)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tournament {
    pub games: Vec<Game>,
    pub roster: Roster,
}

impl Tournament {
    pub fn game(&self, opponent: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.opponent == opponent)
    }
}

/// Parses a whole, non-negative number; spreadsheet exports sometimes write `3.0`.
pub fn parse_count(raw: &str) -> Option<u32> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<u32>() {
        return Some(n);
    }
    let f = trimmed.parse::<f64>().ok()?;
    if f.is_finite() && f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 {
        Some(f as u32)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_requires_side_and_outcome() {
        let mut p = Point::new(1);
        assert_eq!(p.bucket(), None);
        p.starting_side = Some(StartingSide::Defense);
        assert_eq!(p.bucket(), None);
        p.did_we_score = Some(true);
        assert_eq!(p.bucket(), Some(PointBucket::DConverted));
        p.starting_side = Some(StartingSide::Offense);
        p.did_we_score = Some(false);
        assert_eq!(p.bucket(), Some(PointBucket::OConceded));
    }

    #[test]
    fn parse_count_accepts_float_exports() {
        assert_eq!(parse_count("3"), Some(3));
        assert_eq!(parse_count(" 4.0 "), Some(4));
        assert_eq!(parse_count("2.5"), None);
        assert_eq!(parse_count("-1"), None);
        assert_eq!(parse_count(""), None);
    }

    #[test]
    fn roster_keeps_first_duplicate() {
        let roster = Roster::from_entries([
            RosterEntry {
                name: "Alice".into(),
                gender: Gender::F,
            },
            RosterEntry {
                name: "Alice".into(),
                gender: Gender::M,
            },
        ]);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster.gender_of("Alice"), Some(Gender::F));
        assert_eq!(roster.gender_of("alice"), None);
    }

    #[test]
    fn field_cell_markers() {
        assert_eq!(FieldCell::parse("G"), Some(FieldCell::Goal));
        assert_eq!(FieldCell::parse("A"), Some(FieldCell::Assist));
        assert_eq!(FieldCell::parse("1"), Some(FieldCell::OnField));
        assert_eq!(FieldCell::parse("  "), None);
    }
}
