use std::f64::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};

use kurve_core::effect::{EffectTimer, SourceId};
use kurve_core::game_trait::PlayerId;
use kurve_core::input::KeyboardState;
use kurve_core::player::{Controls, PlayerColor, PlayerSetup};
use kurve_core::time::Millis;

use crate::config::ArenaConfig;
use crate::effects::{Category, Effect, EffectBook};
use crate::trail::{Point, Trail};

/// Steering direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Turn {
    Left,
    Right,
}

impl Turn {
    fn sign(self) -> f64 {
        match self {
            Turn::Left => -1.0,
            Turn::Right => 1.0,
        }
    }
}

/// Steering keys held on the previous tick, for press detection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PressedKeys {
    pub left: bool,
    pub right: bool,
}

/// A player in the arena: kinematics, trail and active effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub head_color: PlayerColor,
    pub head_opacity: f64,
    pub controls: Controls,
    pub original_controls: Controls,
    pub swapped: bool,
    pub position: Point,
    /// Heading in radians; 0 points along +x.
    pub angle: f64,
    pub speed: f64,
    pub alive: bool,
    pub score: u32,
    pub square_turn: bool,
    pub square_head: bool,
    pub invincible: bool,
    pub border_wrap: bool,
    pub trail: Trail,
    pub line_width: f64,
    pub head_radius: f64,
    gap_counter: u32,
    gap_interval: f64,
    in_gap: bool,
    last_pressed: PressedKeys,
    effects: EffectBook,
    next_source: u64,
}

impl Player {
    pub fn new(setup: &PlayerSetup, config: &ArenaConfig) -> Self {
        Self {
            id: setup.id,
            name: setup.name.clone(),
            color: setup.color,
            head_color: PlayerColor::YELLOW,
            head_opacity: 1.0,
            controls: setup.controls.clone(),
            original_controls: setup.controls.clone(),
            swapped: false,
            position: Point::new(config.arena_width / 2.0, config.arena_height / 2.0),
            angle: 0.0,
            speed: config.default_speed,
            alive: true,
            score: 0,
            square_turn: false,
            square_head: false,
            invincible: false,
            border_wrap: false,
            trail: Trail::new(config.default_line_width),
            line_width: config.default_line_width,
            head_radius: config.default_head_radius,
            gap_counter: 0,
            gap_interval: config.gap_interval_min,
            in_gap: false,
            last_pressed: PressedKeys::default(),
            effects: EffectBook::default(),
            next_source: 1,
        }
    }

    /// Read the player's (possibly swapped) bindings and turn. In square-turn
    /// mode only a fresh press turns; otherwise a held key turns every tick.
    pub fn steer(&mut self, keys: &dyn KeyboardState, config: &ArenaConfig) {
        let left = keys.is_held(&self.controls.left);
        let right = keys.is_held(&self.controls.right);
        if self.square_turn {
            if left && !self.last_pressed.left {
                self.turn(Turn::Left, config);
            }
            if right && !self.last_pressed.right {
                self.turn(Turn::Right, config);
            }
        } else {
            if left {
                self.turn(Turn::Left, config);
            }
            if right {
                self.turn(Turn::Right, config);
            }
        }
        self.last_pressed = PressedKeys { left, right };
    }

    pub fn turn(&mut self, turn: Turn, config: &ArenaConfig) {
        if self.square_turn {
            let quadrant = (self.angle / FRAC_PI_2).round() + turn.sign();
            self.angle = (quadrant * FRAC_PI_2).rem_euclid(TAU);
        } else {
            self.angle += turn.sign() * config.turn_step;
        }
    }

    /// One movement tick: expire effects, lay trail (or a gap), then move.
    pub fn advance(&mut self, now: Millis, config: &ArenaConfig, rng: &mut impl Rng) {
        self.update_effects(now, config);

        self.gap_counter += 1;
        let counter = f64::from(self.gap_counter);
        if counter >= self.gap_interval {
            if !self.in_gap && !self.invincible {
                self.trail.push_gap(self.line_width);
                self.in_gap = true;
            }
            if counter >= self.gap_interval + f64::from(config.gap_length) {
                self.gap_counter = 0;
                self.in_gap = false;
                self.gap_interval = random_gap_interval(config, rng);
            }
        } else if !self.in_gap && !self.invincible {
            self.add_trail_point(config);
        }

        self.position.x += self.angle.cos() * self.speed;
        self.position.y += self.angle.sin() * self.speed;
        self.update_head_opacity(now);
    }

    fn add_trail_point(&mut self, config: &ArenaConfig) {
        if let Some(last) = self.trail.last_point() {
            let dx = (self.position.x - last.x).abs();
            let dy = (self.position.y - last.y).abs();
            if dx > config.trail_jump_threshold || dy > config.trail_jump_threshold {
                self.trail.push_gap(self.line_width);
                return;
            }
        }
        self.trail.push_point(self.position);
    }

    fn update_head_opacity(&mut self, now: Millis) {
        self.head_opacity = if self.border_wrap {
            0.3 + (now as f64 / 500.0).sin().abs() * 0.7
        } else {
            1.0
        };
    }

    /// Grant a timed effect and apply its immediate state change. Returns the
    /// grant's source id so exactly this grant can be revoked later.
    pub fn add_effect(
        &mut self,
        kind: Effect,
        multiplier: f64,
        duration: Millis,
        now: Millis,
        config: &ArenaConfig,
    ) -> SourceId {
        let source = SourceId(self.next_source);
        self.next_source += 1;
        self.effects
            .add(EffectTimer::new(kind, multiplier, now, duration, source));

        match kind {
            Effect::Speed | Effect::Slow => self.recompute_speed(now, config),
            Effect::FatLine | Effect::SkinnyLine => self.recompute_width(now, config),
            Effect::SquareTurn => {
                self.square_turn = true;
                self.square_head = true;
                self.angle = ((self.angle / FRAC_PI_2).round() * FRAC_PI_2).rem_euclid(TAU);
            },
            Effect::Swap => {
                if !self.swapped {
                    self.controls.swap();
                    self.swapped = true;
                }
                self.head_color = PlayerColor::BLUE;
            },
            Effect::Invincible => self.invincible = true,
            Effect::BorderWrap => self.border_wrap = true,
            Effect::SpawnBoost => {},
        }
        tracing::debug!(player_id = self.id, kind = ?kind, duration, "effect granted");
        source
    }

    /// Revoke one grant. Reverts the kind's state only when no other grant of
    /// it is still running. Removing an unknown source is a no-op.
    pub fn remove_effect(
        &mut self,
        kind: Effect,
        source: SourceId,
        now: Millis,
        config: &ArenaConfig,
    ) -> bool {
        if !self.effects.remove_source(kind, source) {
            return false;
        }
        match kind.category() {
            Category::Speed => self.recompute_speed(now, config),
            Category::Width => self.recompute_width(now, config),
            Category::Other => {
                if !self.effects.has(kind, now) {
                    self.revert(kind);
                }
            },
        }
        true
    }

    pub fn has_effect(&self, kind: Effect, now: Millis) -> bool {
        self.effects.has(kind, now)
    }

    pub fn effect_remaining(&self, kind: Effect, now: Millis) -> Millis {
        self.effects.remaining(kind, now)
    }

    pub fn active_effects(&self) -> impl Iterator<Item = Effect> + '_ {
        self.effects.active_kinds()
    }

    pub fn collision_radius(&self) -> f64 {
        self.head_radius
    }

    /// Drop expired timers, recompute derived speed and width, and revert the
    /// state of kinds whose last grant just ran out.
    pub fn update_effects(&mut self, now: Millis, config: &ArenaConfig) {
        let emptied = self.effects.prune_expired(now);
        self.recompute_speed(now, config);
        self.recompute_width(now, config);
        for kind in emptied {
            if kind.has_revert() && !self.effects.has(kind, now) {
                self.revert(kind);
            }
        }
    }

    fn recompute_speed(&mut self, now: Millis, config: &ArenaConfig) {
        self.speed = config.default_speed * self.effects.multiplier(Category::Speed, now);
    }

    fn recompute_width(&mut self, now: Millis, config: &ArenaConfig) {
        let multiplier = self.effects.multiplier(Category::Width, now);
        let width = config.default_line_width * multiplier;
        if width != self.line_width {
            self.line_width = width;
            self.head_radius = config.default_head_radius * multiplier;
            self.trail.change_width(width);
        }
    }

    fn revert(&mut self, kind: Effect) {
        match kind {
            Effect::Swap => {
                if self.swapped {
                    self.controls.swap();
                    self.swapped = false;
                }
                self.head_color = PlayerColor::YELLOW;
            },
            Effect::SquareTurn => {
                self.square_turn = false;
                self.square_head = false;
            },
            Effect::Invincible => {
                if self.invincible {
                    self.invincible = false;
                    self.trail.push_gap(self.line_width);
                }
            },
            Effect::BorderWrap => self.border_wrap = false,
            _ => {},
        }
        tracing::debug!(player_id = self.id, kind = ?kind, "effect reverted");
    }

    /// Clear every effect and restore default speed, width, head and
    /// bindings. Position and trail are kept.
    pub fn reset_effects(&mut self, config: &ArenaConfig) {
        self.effects.clear();
        self.speed = config.default_speed;
        self.head_color = PlayerColor::YELLOW;
        self.head_opacity = 1.0;
        self.controls = self.original_controls.clone();
        self.swapped = false;
        self.square_turn = false;
        self.square_head = false;
        self.invincible = false;
        self.border_wrap = false;
        if self.line_width != config.default_line_width {
            self.line_width = config.default_line_width;
            self.trail.change_width(self.line_width);
        }
        self.head_radius = config.default_head_radius;
    }

    /// Round-start reset: effects cleared, trail restarted with a short stub
    /// behind the head, gap timer reseeded.
    pub fn reset(&mut self, config: &ArenaConfig, rng: &mut impl Rng) {
        self.reset_effects(config);
        self.alive = true;

        self.trail.clear(config.default_line_width);
        let (dx, dy) = (self.angle.cos(), self.angle.sin());
        for i in (0..config.trail_stub_points).rev() {
            let back = i as f64 * config.trail_stub_spacing;
            self.trail.push_point(Point::new(
                self.position.x - dx * back,
                self.position.y - dy * back,
            ));
        }

        self.last_pressed = PressedKeys::default();
        self.gap_counter = 0;
        self.in_gap = false;
        self.gap_interval = random_gap_interval(config, rng);
    }

    pub fn is_in_gap(&self) -> bool {
        self.in_gap
    }
}

fn random_gap_interval(config: &ArenaConfig, rng: &mut impl Rng) -> f64 {
    rng.random_range(config.gap_interval_min..config.gap_interval_max)
}
