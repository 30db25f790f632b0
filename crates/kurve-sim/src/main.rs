use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_subscriber::EnvFilter;

use kurve_arena::GameState;
use kurve_arena::config::ArenaConfig;
use kurve_core::game_trait::{ArenaGame, GameEvent};
use kurve_core::input::HeldKeys;
use kurve_core::player::{Controls, MAX_PLAYERS, PlayerSetup, default_seats, ready_players};
use kurve_core::time::ManualTimeSource;

/// Simulated frame length.
const FRAME_MS: u64 = 16;

struct Args {
    seed: u64,
    players: usize,
    max_ticks: u64,
    json: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        seed: 1,
        players: 2,
        max_ticks: 200_000,
        json: false,
    };
    for arg in std::env::args().skip(1) {
        if let Some(v) = arg.strip_prefix("--seed=").and_then(|v| v.parse().ok()) {
            args.seed = v;
        } else if let Some(v) = arg.strip_prefix("--players=").and_then(|v| v.parse().ok()) {
            args.players = v;
        } else if let Some(v) = arg.strip_prefix("--max-ticks=").and_then(|v| v.parse().ok()) {
            args.max_ticks = v;
        } else if arg == "--json" {
            args.json = true;
        } else {
            tracing::warn!(arg = %arg, "Ignoring unknown argument");
        }
    }
    args.players = args.players.clamp(2, MAX_PLAYERS);
    args
}

/// Lobby seats with generated key bindings for the first `n` players.
fn seat_players(n: usize) -> Vec<PlayerSetup> {
    let mut seats = default_seats();
    for seat in seats.iter_mut().take(n) {
        let id = seat.id;
        seat.controls = Controls::new(format!("p{id}-left"), format!("p{id}-right"));
    }
    ready_players(&seats)
}

/// Random steering: each player holds left, right or nothing for a while.
struct Wanderer {
    rng: StdRng,
    holds: Vec<(Option<String>, u32)>,
}

impl Wanderer {
    fn new(seed: u64, players: usize) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed ^ 0x5eed),
            holds: vec![(None, 0); players],
        }
    }

    fn keys(&mut self, roster: &[PlayerSetup]) -> HeldKeys {
        let mut keys = HeldKeys::new();
        for (seat, hold) in roster.iter().zip(self.holds.iter_mut()) {
            if hold.1 == 0 {
                hold.0 = match self.rng.random_range(0..3) {
                    0 => Some(seat.controls.left.clone()),
                    1 => Some(seat.controls.right.clone()),
                    _ => None,
                };
                hold.1 = self.rng.random_range(10..60);
            }
            hold.1 -= 1;
            if let Some(key) = &hold.0 {
                keys.press(key.clone());
            }
        }
        keys
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = parse_args();
    let config = ArenaConfig {
        seed: Some(args.seed),
        ..ArenaConfig::load()
    };
    let clock = ManualTimeSource::new(0);
    let mut game = GameState::with_time_source(config, clock.clone());

    let roster = seat_players(args.players);
    if let Err(e) = game.init(&roster) {
        tracing::error!(error = %e, "Invalid roster");
        std::process::exit(1);
    }

    let mut driver = Wanderer::new(args.seed, roster.len());
    let mut ticks = 0u64;
    let mut winner = None;
    game.toggle_play();
    game.toggle_play();

    while ticks < args.max_ticks {
        clock.advance(FRAME_MS);
        let keys = driver.keys(&roster);
        let mut round_over = false;
        for event in game.update(&keys) {
            match event {
                GameEvent::RoundComplete { survivor } => {
                    tracing::info!(tick = ticks, survivor = ?survivor, "Round over");
                    round_over = true;
                },
                GameEvent::MatchWon { player_id } => winner = Some(player_id),
                other => tracing::debug!(tick = ticks, event = ?other),
            }
        }
        ticks += 1;
        if winner.is_some() {
            break;
        }
        if round_over {
            // Prepare and start the next round.
            game.toggle_play();
            game.toggle_play();
        }
    }

    let board = game.scoreboard();
    match winner {
        Some(id) => {
            let name = board
                .rows
                .iter()
                .find(|r| r.player_id == id)
                .map_or("?", |r| r.name.as_str());
            tracing::info!(
                ticks,
                rounds = game.state().round_number,
                "{name} wins the match"
            );
        },
        None => tracing::info!(ticks, "No winner within the tick limit"),
    }
    for row in &board.rows {
        tracing::info!(player = %row.name, score = row.score, "Final standing");
    }

    if args.json {
        match serde_json::to_string_pretty(&board) {
            Ok(json) => println!("{json}"),
            Err(e) => tracing::error!(error = %e, "Failed to encode scoreboard"),
        }
    }
}
