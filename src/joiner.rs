use crate::error::{StatsError, StatsResult};
use crate::records::{Game, PitchRecord, Point};

#[derive(Debug, Clone)]
pub struct JoinedPoint<'g> {
    pub point: &'g Point,
    pub present: Vec<&'g PitchRecord>,
}

/// Scoring markers count as presence.
pub fn present_players(game: &Game, point: u32) -> StatsResult<Vec<&PitchRecord>> {
    if !game.pitch.has_point_column(point) {
        return Err(StatsError::Schema(format!(
            "point {point} vs {} is in the overview but has no pitch-time column",
            game.opponent
        )));
    }
    Ok(game
        .pitch
        .records
        .iter()
        .filter(|r| r.was_on_field(point))
        .collect())
}

pub fn join_game(game: &Game) -> StatsResult<Vec<JoinedPoint<'_>>> {
    game.points
        .iter()
        .map(|point| -> StatsResult<JoinedPoint<'_>> {
            Ok(JoinedPoint {
                point,
                present: present_players(game, point.number)?,
            })
        })
        .collect()
}
