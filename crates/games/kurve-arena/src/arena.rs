use std::f64::consts::TAU;

use rand::Rng;

use crate::config::ArenaConfig;
use crate::trail::Point;

/// A round-start position with starting heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPoint {
    pub position: Point,
    pub angle: f64,
}

/// Pick round-start positions for `player_count` players inside the spawn
/// margin, retrying each one until it is at least `min_spawn_spacing` from
/// the others. After `spawn_attempts` misses the last candidate is accepted.
pub fn spawn_points(
    player_count: usize,
    config: &ArenaConfig,
    rng: &mut impl Rng,
) -> Vec<SpawnPoint> {
    let margin = config.spawn_margin;
    let mut points: Vec<SpawnPoint> = Vec::with_capacity(player_count);

    for _ in 0..player_count {
        let mut candidate = random_point(config, margin, rng);
        for _ in 1..config.spawn_attempts.max(1) {
            let crowded = points
                .iter()
                .any(|p| p.position.distance(candidate) < config.min_spawn_spacing);
            if !crowded {
                break;
            }
            candidate = random_point(config, margin, rng);
        }
        points.push(SpawnPoint {
            position: candidate,
            angle: rng.random_range(0.0..TAU),
        });
    }
    points
}

fn random_point(config: &ArenaConfig, margin: f64, rng: &mut impl Rng) -> Point {
    Point::new(
        rng.random_range(margin..config.arena_width - margin),
        rng.random_range(margin..config.arena_height - margin),
    )
}
