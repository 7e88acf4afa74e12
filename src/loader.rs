use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use csv::{ReaderBuilder, StringRecord};

use crate::error::{StatsError, StatsResult};
use crate::records::{
    CalledBy, FieldCell, Game, Gender, GenderRatio, PitchRecord, PitchTable, Point, Roster,
    RosterEntry, StartingSide, Timeout, TimeoutCaller, Tournament, parse_count,
};

// Totals rows appended under the players in every pitch-time export.
pub const PITCH_SUMMARY_ROWS: usize = 3;
pub const DEFAULT_TEAM_COLUMN: &str = "Deep Space";

const OPPONENT: &str = "Opponent";
const POINT_NUMBER: &str = "Point number";
const DID_WE_SCORE: &str = "Did we score";
const STARTING_SIDE: &str = "Starting on O/D";
const GENDER_RATIO: &str = "Gender ratio";
const GENDER_CALLED_BY: &str = "Gender Called by";
// The export misspells this header; accept the corrected spelling too.
const POSSESSIONS: [&str; 2] = ["Number of posessions", "Number of possessions"];
const MIDPOINT_TIMEOUTS: &str = "Midpoint Timeouts";
const BETWEEN_TIMEOUTS: &str = "Timeouts between points";
const BETWEEN_EVENTS: &str = "Events between points";
const POINTS_PLAYED: &str = "Points Played";
const GOALS: &str = "Goals";
const ASSISTS: &str = "Assists";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RosterSource {
    #[default]
    LastGame,
    Union,
}

impl FromStr for RosterSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last" | "last_game" => Ok(RosterSource::LastGame),
            "union" => Ok(RosterSource::Union),
            other => Err(format!("unknown roster source '{other}' (expected last|union)")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    /// Overview column holding our running score.
    pub team_column: String,
    pub roster_source: RosterSource,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            team_column: DEFAULT_TEAM_COLUMN.to_string(),
            roster_source: RosterSource::LastGame,
        }
    }
}

pub fn overview_file_name(opponent: &str) -> String {
    format!("{opponent}-Overview.csv")
}

pub fn pitchtime_file_name(opponent: &str) -> String {
    format!("{opponent}-Pitchtime.csv")
}

/// Game files are resolved next to the manifest.
pub fn load_tournament(manifest: &Path, opts: &LoadOptions) -> StatsResult<Tournament> {
    let schedule = parse_schedule(open_file(manifest)?, manifest)?;
    let base = manifest.parent().unwrap_or_else(|| Path::new("."));

    let mut games = Vec::with_capacity(schedule.len());
    for opponent in schedule {
        let overview_path = base.join(overview_file_name(&opponent));
        let pitch_path = base.join(pitchtime_file_name(&opponent));
        let points = parse_overview(open_file(&overview_path)?, &overview_path, &opts.team_column)?;
        let pitch = parse_pitch_table(open_file(&pitch_path)?, &pitch_path)?;
        check_pitch_points(&opponent, &points, &pitch)?;
        log::info!(
            "loaded game vs {opponent}: {} points, {} players",
            points.len(),
            pitch.records.len()
        );
        games.push(Game {
            opponent,
            points,
            pitch,
        });
    }

    let roster = build_roster(&games, opts.roster_source);
    flag_roster_mismatches(&games, &roster);
    Ok(Tournament { games, roster })
}

/// Every filled pitch-time cell must refer to a point in the overview.
pub fn check_pitch_points(opponent: &str, points: &[Point], pitch: &PitchTable) -> StatsResult<()> {
    let known: BTreeSet<u32> = points.iter().map(|p| p.number).collect();
    for record in &pitch.records {
        if let Some(number) = record.cells.keys().find(|n| !known.contains(*n)) {
            return Err(StatsError::schema(format!(
                "{}'s pitch time vs {opponent} marks point {number}, which is not in the overview",
                record.name
            )));
        }
    }
    let unused = pitch
        .point_columns
        .iter()
        .filter(|n| !known.contains(*n))
        .count();
    if unused > 0 {
        log::debug!("{unused} empty pitch-time columns vs {opponent} have no overview row");
    }
    Ok(())
}

pub fn build_roster(games: &[Game], source: RosterSource) -> Roster {
    match source {
        RosterSource::LastGame => games
            .last()
            .map(|g| Roster::from_pitch_table(&g.pitch))
            .unwrap_or_default(),
        RosterSource::Union => {
            let mut roster = Roster::default();
            for game in games {
                for record in &game.pitch.records {
                    if let Some(gender) = roster.gender_of(&record.name)
                        && gender != record.gender
                    {
                        log::warn!(
                            "{} is listed as {} vs {} but {} earlier; keeping {}",
                            record.name,
                            record.gender.code(),
                            game.opponent,
                            gender.code(),
                            gender.code()
                        );
                    }
                    roster.push(RosterEntry {
                        name: record.name.clone(),
                        gender: record.gender,
                    });
                }
            }
            roster
        }
    }
}

fn flag_roster_mismatches(games: &[Game], roster: &Roster) {
    for game in games {
        let unknown: Vec<&str> = game
            .pitch
            .records
            .iter()
            .map(|r| r.name.as_str())
            .filter(|name| !roster.contains(name))
            .collect();
        if !unknown.is_empty() {
            log::warn!(
                "roster mismatch: players vs {} not in roster and excluded from per-player stats: {}",
                game.opponent,
                unknown.join(", ")
            );
        }
        let absent = roster
            .entries()
            .iter()
            .filter(|e| game.pitch.record(&e.name).is_none())
            .count();
        if absent > 0 {
            log::debug!("{absent} roster players have no row vs {}", game.opponent);
        }
    }
}

fn open_file(path: &Path) -> StatsResult<File> {
    if !path.is_file() {
        return Err(StatsError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    File::open(path).map_err(|source| StatsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_all<R: Read>(rdr: R, path: &Path) -> StatsResult<(StringRecord, Vec<StringRecord>)> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(rdr);
    let csv_err = |source| StatsError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let headers = reader.headers().map_err(csv_err)?.clone();
    let mut rows = Vec::new();
    for record in reader.records() {
        rows.push(record.map_err(csv_err)?);
    }
    Ok((headers, rows))
}

fn is_blank_row(row: &StringRecord) -> bool {
    row.iter().all(|cell| cell.trim().is_empty())
}

struct Columns<'a> {
    headers: &'a StringRecord,
    path: &'a Path,
}

impl<'a> Columns<'a> {
    fn find(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h.trim() == name)
    }

    fn require(&self, name: &str) -> StatsResult<usize> {
        self.find(name).ok_or_else(|| {
            StatsError::schema(format!(
                "{} has no '{name}' column",
                self.path.display()
            ))
        })
    }
}

fn cell(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).map(str::trim).unwrap_or("")
}

fn opt_cell(row: &StringRecord, idx: Option<usize>) -> &str {
    idx.map(|i| cell(row, i)).unwrap_or("")
}

pub fn parse_schedule<R: Read>(rdr: R, path: &Path) -> StatsResult<Vec<String>> {
    let (headers, rows) = read_all(rdr, path)?;
    let rows: Vec<StringRecord> = rows.into_iter().filter(|r| !is_blank_row(r)).collect();
    if rows.is_empty() {
        return Err(StatsError::MalformedSchedule(format!(
            "{} lists no games",
            path.display()
        )));
    }

    let opponent_idx = headers
        .iter()
        .position(|h| h.trim() == OPPONENT)
        .filter(|&idx| rows.iter().any(|r| !cell(r, idx).is_empty()))
        .ok_or_else(|| {
            StatsError::MalformedSchedule(format!(
                "{} has no populated '{OPPONENT}' column",
                path.display()
            ))
        })?;

    let mut seen = HashSet::new();
    let mut opponents = Vec::new();
    for (idx, row) in rows.iter().enumerate() {
        let opponent = cell(row, opponent_idx);
        if opponent.is_empty() {
            log::warn!("schedule row {} has no opponent; skipping", idx + 1);
            continue;
        }
        if !seen.insert(opponent.to_string()) {
            log::warn!("opponent {opponent} listed more than once; loading it once");
            continue;
        }
        opponents.push(opponent.to_string());
    }
    Ok(opponents)
}

pub fn parse_overview<R: Read>(rdr: R, path: &Path, team_column: &str) -> StatsResult<Vec<Point>> {
    let (headers, rows) = read_all(rdr, path)?;
    let cols = Columns {
        headers: &headers,
        path,
    };

    let number_idx = cols.require(POINT_NUMBER)?;
    let scored_idx = cols.require(DID_WE_SCORE)?;
    let side_idx = cols.require(STARTING_SIDE)?;
    let ratio_idx = cols.require(GENDER_RATIO)?;
    let called_idx = cols.require(GENDER_CALLED_BY)?;
    let possessions_idx = POSSESSIONS
        .iter()
        .find_map(|name| cols.find(name))
        .ok_or_else(|| {
            StatsError::schema(format!(
                "{} has no '{}' column",
                path.display(),
                POSSESSIONS[0]
            ))
        })?;
    let ours_idx = cols.find(team_column);
    let theirs_idx = cols.find(OPPONENT);
    let midpoint_idx = cols.find(MIDPOINT_TIMEOUTS);
    let between_idx = cols.find(BETWEEN_TIMEOUTS);
    let events_idx = cols.find(BETWEEN_EVENTS);
    if ours_idx.is_none() {
        log::debug!("{} has no '{team_column}' score column", path.display());
    }

    let mut seen = BTreeSet::new();
    let mut points = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        if is_blank_row(row) {
            continue;
        }
        let at = || format!("{} row {}", path.display(), row_no + 2);

        let number = parse_count(cell(row, number_idx))
            .filter(|n| *n > 0)
            .ok_or_else(|| StatsError::schema(format!("{}: invalid point number", at())))?;
        if !seen.insert(number) {
            return Err(StatsError::schema(format!(
                "{}: point {number} appears twice",
                at()
            )));
        }

        let mut point = Point::new(number);
        point.did_we_score = parse_flag(cell(row, scored_idx))
            .map_err(|raw| StatsError::schema(format!("{}: bad '{DID_WE_SCORE}' value '{raw}'", at())))?;

        let side_raw = cell(row, side_idx);
        point.starting_side = if side_raw.is_empty() {
            None
        } else {
            Some(StartingSide::parse(side_raw).ok_or_else(|| {
                StatsError::schema(format!("{}: bad '{STARTING_SIDE}' value '{side_raw}'", at()))
            })?)
        };

        point.gender_ratio = GenderRatio::parse(cell(row, ratio_idx));
        let called_raw = cell(row, called_idx);
        point.gender_called_by = CalledBy::parse(called_raw).unwrap_or_else(|| {
            log::warn!("{}: unrecognised '{GENDER_CALLED_BY}' value '{called_raw}'", at());
            CalledBy::NotApplicable
        });

        let possessions_raw = cell(row, possessions_idx);
        point.possessions = parse_count(possessions_raw);
        if point.possessions.is_none() && !possessions_raw.is_empty() {
            log::warn!("{}: ignoring possession count '{possessions_raw}'", at());
        }

        point.our_score = parse_count(opt_cell(row, ours_idx));
        point.their_score = parse_count(opt_cell(row, theirs_idx));
        point.midpoint_timeout = parse_caller(opt_cell(row, midpoint_idx), &at);

        // Both the caller and the position are needed to place a between-point timeout.
        let caller = parse_caller(opt_cell(row, between_idx), &at);
        let position = opt_cell(row, events_idx).parse::<f64>().ok();
        if let (Some(caller), Some(position)) = (caller, position) {
            point.between_point_timeout = Some(Timeout { caller, position });
        }

        points.push(point);
    }
    Ok(points)
}

fn parse_flag(raw: &str) -> Result<Option<bool>, String> {
    match raw {
        "" => Ok(None),
        "1" | "1.0" | "True" | "true" => Ok(Some(true)),
        "0" | "0.0" | "False" | "false" => Ok(Some(false)),
        other => Err(other.to_string()),
    }
}

fn parse_caller(raw: &str, at: &dyn Fn() -> String) -> Option<TimeoutCaller> {
    if raw.is_empty() {
        return None;
    }
    let caller = TimeoutCaller::parse(raw);
    if caller.is_none() {
        log::warn!("{}: unrecognised timeout caller '{raw}'", at());
    }
    caller
}

/// The first two columns are gender and name whatever their headers say.
pub fn parse_pitch_table<R: Read>(rdr: R, path: &Path) -> StatsResult<PitchTable> {
    let (headers, mut rows) = read_all(rdr, path)?;
    if headers.len() < 2 {
        return Err(StatsError::schema(format!(
            "{} needs gender and name columns",
            path.display()
        )));
    }
    let cols = Columns {
        headers: &headers,
        path,
    };
    let played_idx = cols.require(POINTS_PLAYED)?;
    let goals_idx = cols.require(GOALS)?;
    let assists_idx = cols.require(ASSISTS)?;

    let point_columns: Vec<(usize, u32)> = headers
        .iter()
        .enumerate()
        .skip(2)
        .filter_map(|(idx, h)| h.trim().parse::<u32>().ok().map(|n| (idx, n)))
        .collect();

    rows.truncate(rows.len().saturating_sub(PITCH_SUMMARY_ROWS));

    let mut names = HashSet::new();
    let mut records = Vec::with_capacity(rows.len());
    for (row_no, row) in rows.iter().enumerate() {
        let name = cell(row, 1);
        if name.is_empty() {
            if !is_blank_row(row) {
                log::warn!("{} row {}: no player name; skipping", path.display(), row_no + 2);
            }
            continue;
        }
        if !names.insert(name.to_string()) {
            return Err(StatsError::JoinAmbiguity(format!(
                "{}: player '{name}' has more than one row",
                path.display()
            )));
        }
        let gender_raw = cell(row, 0);
        let gender = Gender::parse(gender_raw).ok_or_else(|| {
            StatsError::schema(format!(
                "{}: player '{name}' has unknown gender '{gender_raw}'",
                path.display()
            ))
        })?;

        let mut cells = BTreeMap::new();
        for &(idx, number) in &point_columns {
            if let Some(c) = FieldCell::parse(cell(row, idx)) {
                cells.insert(number, c);
            }
        }

        records.push(PitchRecord {
            name: name.to_string(),
            gender,
            points_played: parse_count(cell(row, played_idx)).unwrap_or(0),
            goals: parse_count(cell(row, goals_idx)).unwrap_or(0),
            assists: parse_count(cell(row, assists_idx)).unwrap_or(0),
            cells,
        });
    }

    Ok(PitchTable {
        point_columns: point_columns.into_iter().map(|(_, n)| n).collect(),
        records,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path() -> &'static Path {
        Path::new("test.csv")
    }

    #[test]
    fn schedule_drops_empty_rows_and_dedups() {
        let raw = "Opponent,Date,\nTigers,1,\n,,\nLions,2,\nTigers,3,\n";
        let games = parse_schedule(raw.as_bytes(), path()).unwrap();
        assert_eq!(games, vec!["Tigers".to_string(), "Lions".to_string()]);
    }

    #[test]
    fn empty_schedule_is_malformed() {
        let err = parse_schedule("Opponent,Date\n,\n".as_bytes(), path()).unwrap_err();
        assert!(matches!(err, StatsError::MalformedSchedule(_)));
        let err = parse_schedule("Team\nTigers\n".as_bytes(), path()).unwrap_err();
        assert!(matches!(err, StatsError::MalformedSchedule(_)));
    }

    #[test]
    fn overview_parses_optional_cells() {
        let raw = "\
Point number,Deep Space,Opponent,Did we score,Starting on O/D,Gender ratio,Gender Called by,Number of posessions,Midpoint Timeouts,Timeouts between points,Events between points
1,1,0,1,O,F,U,2,,,
2,1,1,0,D,M,T,3,T,U,2.5
3,1,1,,,F,,,,,
";
        let points = parse_overview(raw.as_bytes(), path(), DEFAULT_TEAM_COLUMN).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points[0].did_we_score, Some(true));
        assert_eq!(points[0].our_score, Some(1));
        assert_eq!(points[1].midpoint_timeout, Some(TimeoutCaller::Opponent));
        assert_eq!(
            points[1].between_point_timeout,
            Some(Timeout {
                caller: TimeoutCaller::Team,
                position: 2.5
            })
        );
        assert_eq!(points[2].did_we_score, None);
        assert_eq!(points[2].starting_side, None);
        assert_eq!(points[2].possessions, None);
        assert_eq!(points[2].gender_called_by, CalledBy::NotApplicable);
    }

    #[test]
    fn overview_rejects_duplicate_points() {
        let raw = "\
Point number,Did we score,Starting on O/D,Gender ratio,Gender Called by,Number of posessions
1,1,O,F,U,2
1,0,D,M,T,3
";
        let err = parse_overview(raw.as_bytes(), path(), DEFAULT_TEAM_COLUMN).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
    }

    #[test]
    fn overview_requires_minimum_columns() {
        let raw = "Point number,Did we score\n1,1\n";
        let err = parse_overview(raw.as_bytes(), path(), DEFAULT_TEAM_COLUMN).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
    }

    #[test]
    fn pitch_table_strips_summary_rows() {
        let raw = "\
,,1,2,Points Played,Goals,Assists
F,Alice,G,1,2,1,0
M,Bob,A,,1,0,1
,Total,,,3,1,1
,,,,,,
,Ratio,,,,,
";
        let table = parse_pitch_table(raw.as_bytes(), path()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.point_columns.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
        let alice = table.record("Alice").unwrap();
        assert_eq!(alice.gender, Gender::F);
        assert_eq!(alice.cell(1), Some(FieldCell::Goal));
        assert_eq!(alice.cell(2), Some(FieldCell::OnField));
        assert!(!table.record("Bob").unwrap().was_on_field(2));
    }

    #[test]
    fn pitch_table_rejects_duplicate_players() {
        let raw = "\
Gender,Name,1,Points Played,Goals,Assists
F,Alice,1,1,0,0
F,Alice,1,1,0,0
x,,,,,
x,,,,,
x,,,,,
";
        let err = parse_pitch_table(raw.as_bytes(), path()).unwrap_err();
        assert!(matches!(err, StatsError::JoinAmbiguity(_)));
    }

    #[test]
    fn overview_rejects_bad_outcome() {
        let raw = "\
Point number,Did we score,Starting on O/D,Gender ratio,Gender Called by,Number of posessions
1,yes,O,F,U,2
";
        let err = parse_overview(raw.as_bytes(), path(), DEFAULT_TEAM_COLUMN).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
        assert!(err.to_string().contains("yes"));
    }

    #[test]
    fn pitch_table_rejects_unknown_gender() {
        let raw = "\
,,1,Points Played,Goals,Assists
X,Alice,1,1,0,0
,,,,,
,,,,,
,,,,,
";
        let err = parse_pitch_table(raw.as_bytes(), path()).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
    }

    #[test]
    fn pitch_cells_must_match_overview_points() {
        let overview = "\
Point number,Did we score,Starting on O/D,Gender ratio,Gender Called by,Number of posessions
1,1,O,F,U,2
";
        let pitch = "\
,,1,2,3,Points Played,Goals,Assists
F,Alice,1,G,,2,1,0
M,Bob,1,A,,2,0,1
,,,,,,,
,,,,,,,
,,,,,,,
";
        let points = parse_overview(overview.as_bytes(), path(), DEFAULT_TEAM_COLUMN).unwrap();
        let table = parse_pitch_table(pitch.as_bytes(), path()).unwrap();
        let err = check_pitch_points("Tigers", &points, &table).unwrap_err();
        assert!(matches!(err, StatsError::Schema(_)));
        assert!(err.to_string().contains("point 2"));

        // An empty column with no overview row is tolerated.
        let trimmed = parse_pitch_table(
            ",,1,2,Points Played,Goals,Assists\nF,Alice,G,,1,1,0\n,,,,,,\n,,,,,,\n,,,,,,\n".as_bytes(),
            path(),
        )
        .unwrap();
        assert!(check_pitch_points("Tigers", &points, &trimmed).is_ok());
    }

    #[test]
    fn roster_source_parses() {
        assert_eq!("union".parse::<RosterSource>(), Ok(RosterSource::Union));
        assert_eq!("LAST".parse::<RosterSource>(), Ok(RosterSource::LastGame));
        assert!("all".parse::<RosterSource>().is_err());
    }
}
