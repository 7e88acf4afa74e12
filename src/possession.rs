use std::collections::HashMap;

use serde::Serialize;

use crate::error::StatsResult;
use crate::joiner;
use crate::records::{Game, Roster};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerPossessions {
    pub name: String,
    pub converted: Vec<u32>,
    pub conceded: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PossessionPoint {
    pub point: u32,
    pub possessions: Option<u32>,
    pub did_we_score: Option<bool>,
}

/// Roster players come first, anyone else after them in first-seen order. Points
/// without a possession count are skipped; a point not won counts as conceded.
pub fn possession_distributions(games: &[Game], roster: &Roster) -> StatsResult<Vec<PlayerPossessions>> {
    let mut out: Vec<PlayerPossessions> = roster
        .entries()
        .iter()
        .map(|e| PlayerPossessions {
            name: e.name.clone(),
            converted: Vec::new(),
            conceded: Vec::new(),
        })
        .collect();
    let mut index: HashMap<String, usize> = out
        .iter()
        .enumerate()
        .map(|(idx, p)| (p.name.clone(), idx))
        .collect();

    for game in games {
        for joined in joiner::join_game(game)? {
            let Some(possessions) = joined.point.possessions else {
                continue;
            };
            let scored = joined.point.did_we_score == Some(true);
            for player in joined.present {
                let idx = match index.get(&player.name) {
                    Some(&idx) => idx,
                    None => {
                        out.push(PlayerPossessions {
                            name: player.name.clone(),
                            converted: Vec::new(),
                            conceded: Vec::new(),
                        });
                        index.insert(player.name.clone(), out.len() - 1);
                        out.len() - 1
                    }
                };
                if scored {
                    out[idx].converted.push(possessions);
                } else {
                    out[idx].conceded.push(possessions);
                }
            }
        }
    }
    Ok(out)
}

pub fn game_possession_series(game: &Game) -> Vec<PossessionPoint> {
    game.points
        .iter()
        .map(|p| PossessionPoint {
            point: p.number,
            possessions: p.possessions,
            did_we_score: p.did_we_score,
        })
        .collect()
}
