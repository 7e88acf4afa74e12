use std::path::PathBuf;

use pitch_stats::aggregate::{IndividualStats, compute_individual_stats};
use pitch_stats::joiner::present_players;
use pitch_stats::loader::{LoadOptions, load_tournament};
use pitch_stats::possession::possession_distributions;
use pitch_stats::records::{Gender, Tournament};

fn fixture(name: &str) -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path
}

fn load() -> Tournament {
    load_tournament(&fixture("tournament.csv"), &LoadOptions::default())
        .expect("fixture tournament should load")
}

fn row<'a>(stats: &'a [IndividualStats], name: &str) -> &'a IndividualStats {
    stats
        .iter()
        .find(|s| s.name == name)
        .expect("player should have a row")
}

#[test]
fn loads_games_in_schedule_order_with_last_game_roster() {
    let t = load();
    let opponents: Vec<&str> = t.games.iter().map(|g| g.opponent.as_str()).collect();
    assert_eq!(opponents, vec!["Tigers", "Lions"]);
    assert_eq!(t.games[0].points.len(), 4);
    assert_eq!(t.games[0].pitch.records.len(), 4);
    let names: Vec<&str> = t.roster.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Cara", "Dan"]);
    assert_eq!(t.roster.gender_of("Cara"), Some(Gender::F));
}

#[test]
fn individual_stats_match_hand_count() {
    let t = load();
    let stats = compute_individual_stats(&t.games, &t.roster).unwrap();

    let order: Vec<&str> = stats.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(order, vec!["Dan", "Alice", "Bob", "Cara"]);

    let alice = row(&stats, "Alice");
    assert_eq!(
        (alice.points_played, alice.goals, alice.assists),
        (5, 1, 1)
    );
    assert_eq!(
        (
            alice.o_converted,
            alice.o_conceded,
            alice.d_converted,
            alice.d_conceded
        ),
        (1, 2, 1, 1)
    );
    assert_eq!(alice.converted_not_ga(), 0);

    // Bob's third Lions point has no outcome: it stays in points played only.
    let bob = row(&stats, "Bob");
    assert_eq!(bob.points_played, 5);
    assert_eq!(bob.o_points() + bob.d_points(), 4);
    assert_eq!(bob.converted_not_ga(), 1);

    let dan = row(&stats, "Dan");
    assert_eq!(dan.points_played, 6);
    assert_eq!((dan.o_points(), dan.d_points()), (3, 2));
    assert_eq!(dan.conceded(), 2);
    assert_eq!(dan.converted_not_ga(), 4);
}

#[test]
fn every_present_player_lands_in_one_bucket() {
    let t = load();
    let stats = compute_individual_stats(&t.games, &t.roster).unwrap();
    let bucketed: u32 = stats.iter().map(|s| s.o_points() + s.d_points()).sum();

    let mut present = 0u32;
    for game in &t.games {
        for point in game.points.iter().filter(|p| p.bucket().is_some()) {
            present += present_players(game, point.number).unwrap().len() as u32;
        }
    }
    assert_eq!(bucketed, present);
    assert_eq!(bucketed, 18);
}

#[test]
fn points_played_reconciles_when_outcomes_are_known() {
    let t = load();
    let stats = compute_individual_stats(&t.games, &t.roster).unwrap();
    for s in &stats {
        let reconciled =
            i64::from(s.goals) + i64::from(s.assists) + i64::from(s.conceded()) + s.converted_not_ga();
        assert_eq!(reconciled, i64::from(s.points_played));
    }
    // Players never on the unresolved Lions point have every point bucketed.
    let alice = row(&stats, "Alice");
    assert_eq!(alice.o_points() + alice.d_points(), alice.points_played);
}

#[test]
fn aggregation_is_idempotent() {
    let t = load();
    let first = compute_individual_stats(&t.games, &t.roster).unwrap();
    let second = compute_individual_stats(&t.games, &t.roster).unwrap();
    assert_eq!(first, second);
}

#[test]
fn possessions_split_by_outcome() {
    let t = load();
    let dist = possession_distributions(&t.games, &t.roster).unwrap();
    let names: Vec<&str> = dist.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Alice", "Bob", "Cara", "Dan"]);

    assert_eq!(dist[0].converted, vec![1, 5]);
    assert_eq!(dist[0].conceded, vec![3, 4, 2]);
    assert_eq!(dist[1].converted, vec![1, 2]);
    // Lions point 3 has no outcome and lands with the conceded points.
    assert_eq!(dist[1].conceded, vec![3, 2, 1]);
    assert_eq!(dist[3].converted, vec![1, 2, 5]);
    assert_eq!(dist[3].conceded, vec![4, 2, 1]);
}
