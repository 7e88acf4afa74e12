use anyhow::{Result, anyhow};

use pitch_stats::config::{ReportConfig, flag_value};
use pitch_stats::{loader, possession, timeline};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cfg = ReportConfig::from_env_and_args()?;
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let tournament = loader::load_tournament(&cfg.manifest, &cfg.load_options())?;

    let game = match flag_value(&args, "--game") {
        Some(opponent) => tournament
            .game(&opponent)
            .ok_or_else(|| anyhow!("no game vs {opponent} in {}", cfg.manifest.display()))?,
        None => tournament
            .games
            .first()
            .ok_or_else(|| anyhow!("schedule has no games"))?,
    };

    let events = timeline::game_timeline(game);
    let series = possession::game_possession_series(game);

    println!("Events vs {}", events.opponent);
    for (point, poss) in events.points.iter().zip(&series) {
        let score = match (point.our_score, point.their_score) {
            (Some(us), Some(them)) => format!("{us}-{them}"),
            _ => "?".to_string(),
        };
        let outcome = match poss.did_we_score {
            Some(true) => "converted",
            Some(false) => "conceded",
            None => "-",
        };
        let possessions = poss
            .possessions
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>3}  {:>5}  {:<3} {:<9} possessions {}",
            point.point, score, point.label, outcome, possessions
        );
    }
    if !events.timeouts.is_empty() {
        println!();
        println!("Timeouts:");
        for t in &events.timeouts {
            println!(" - {:?} at {} ({})", t.kind, t.position, t.caller.code());
        }
    }

    Ok(())
}
