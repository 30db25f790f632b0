use kurve_core::game_trait::PlayerId;

use crate::config::ArenaConfig;
use crate::player::Player;

/// Arena extent; the playable area is `[0, width] x [0, height]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn from_config(config: &ArenaConfig) -> Self {
        Self {
            width: config.arena_width,
            height: config.arena_height,
        }
    }
}

/// What killed a player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collision {
    Wall,
    Trail { owner: PlayerId },
}

/// Wrap a head that left the arena onto the opposite edge. Returns whether
/// the position changed.
pub fn wrap_position(player: &mut Player, bounds: Bounds) -> bool {
    let before = player.position;
    let p = &mut player.position;
    if p.x < 0.0 {
        p.x = bounds.width;
    } else if p.x > bounds.width {
        p.x = 0.0;
    }
    if p.y < 0.0 {
        p.y = bounds.height;
    } else if p.y > bounds.height {
        p.y = 0.0;
    }
    *p != before
}

/// Whether the head's radius-expanded box touches or leaves the arena.
pub fn hits_wall(player: &Player, bounds: Bounds) -> bool {
    let r = player.collision_radius();
    let p = player.position;
    p.x - r <= 0.0 || p.x + r >= bounds.width || p.y - r <= 0.0 || p.y + r >= bounds.height
}

/// Number of the player's own most recent trail entries that cannot hit it.
///
/// The window grows with line width and, below default speed, with how
/// closely the points are packed.
pub fn self_grace(player: &Player, config: &ArenaConfig) -> usize {
    let packing = (config.default_speed / player.speed.max(f64::EPSILON)).max(1.0);
    let ratio = player.line_width / config.default_line_width * packing;
    let grace = (config.self_grace_points as f64 * ratio).ceil() as usize;
    if player.square_turn { grace * 2 } else { grace }
}

/// Test the player at `index` against the walls and every trail.
///
/// With border wrap (the player's own or `global_wrap`) the head is moved to
/// the opposite edge instead of dying. Invincible players never collide.
/// Liveness is left to the caller.
pub fn check_collision(
    index: usize,
    players: &mut [Player],
    bounds: Bounds,
    global_wrap: bool,
    config: &ArenaConfig,
) -> Option<Collision> {
    let wraps = {
        let player = &mut players[index];
        let wraps = player.border_wrap || global_wrap;
        if wraps {
            wrap_position(player, bounds);
        }
        wraps
    };

    let players: &[Player] = players;
    let me = &players[index];
    if me.invincible {
        return None;
    }
    if !wraps && hits_wall(me, bounds) {
        return Some(Collision::Wall);
    }

    let radius = me.collision_radius();
    let head = me.position;
    for (i, other) in players.iter().enumerate() {
        let is_self = i == index;
        let count = if is_self {
            other.trail.len().saturating_sub(self_grace(me, config))
        } else {
            other.trail.len()
        };
        let padding = if is_self && me.square_turn {
            config.square_turn_padding
        } else {
            0.0
        };
        let hit = other
            .trail
            .points_with_width(count)
            .any(|(point, width)| head.distance(point) < radius + width / 2.0 + padding);
        if hit {
            return Some(Collision::Trail { owner: other.id });
        }
    }
    None
}
