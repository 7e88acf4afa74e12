use serde::Serialize;

use crate::records::{Game, TimeoutCaller};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TimeoutKind {
    Midpoint,
    BetweenPoints,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineTimeout {
    pub position: f64,
    pub caller: TimeoutCaller,
    pub kind: TimeoutKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelinePoint {
    pub point: u32,
    pub our_score: Option<u32>,
    pub their_score: Option<u32>,
    /// Gender ratio code followed by who called it, e.g. `FU`.
    pub label: String,
    pub did_we_score: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameTimeline {
    pub opponent: String,
    pub points: Vec<TimelinePoint>,
    pub timeouts: Vec<TimelineTimeout>,
}

pub fn game_timeline(game: &Game) -> GameTimeline {
    let points = game
        .points
        .iter()
        .map(|p| TimelinePoint {
            point: p.number,
            our_score: p.our_score,
            their_score: p.their_score,
            label: format!(
                "{}{}",
                p.gender_ratio.map(|r| r.code()).unwrap_or_default(),
                p.gender_called_by.code()
            ),
            did_we_score: p.did_we_score,
        })
        .collect();

    let midpoint = game.points.iter().filter_map(|p| {
        p.midpoint_timeout.map(|caller| TimelineTimeout {
            position: f64::from(p.number),
            caller,
            kind: TimeoutKind::Midpoint,
        })
    });
    let between = game.points.iter().filter_map(|p| {
        p.between_point_timeout.map(|t| TimelineTimeout {
            position: t.position,
            caller: t.caller,
            kind: TimeoutKind::BetweenPoints,
        })
    });
    let mut timeouts: Vec<TimelineTimeout> = midpoint.chain(between).collect();
    timeouts.sort_by(|a, b| a.position.total_cmp(&b.position));

    GameTimeline {
        opponent: game.opponent.clone(),
        points,
        timeouts,
    }
}
