use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use kurve_core::effect::SourceId;
use kurve_core::game_trait::PlayerId;
use kurve_core::player::PlayerColor;
use kurve_core::time::Millis;

use crate::config::ArenaConfig;
use crate::effects::Effect;
use crate::player::Player;
use crate::scheduler::{ScheduledAction, Scheduler};
use crate::trail::Point;

/// Collectible power-up types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PowerUpType {
    Clear,
    Speed,
    Swap,
    SquareTurn,
    Slow,
    SpawnBoost,
    SkinnyLine,
    FatLine,
    Invincible,
    Random,
    BorderWrap,
}

impl PowerUpType {
    pub const ALL: [PowerUpType; 11] = [
        PowerUpType::Clear,
        PowerUpType::Speed,
        PowerUpType::Swap,
        PowerUpType::SquareTurn,
        PowerUpType::Slow,
        PowerUpType::SpawnBoost,
        PowerUpType::SkinnyLine,
        PowerUpType::FatLine,
        PowerUpType::Invincible,
        PowerUpType::Random,
        PowerUpType::BorderWrap,
    ];

    /// Player effect granted by this type, if it grants one.
    pub fn effect(self) -> Option<Effect> {
        match self {
            PowerUpType::Speed => Some(Effect::Speed),
            PowerUpType::Slow => Some(Effect::Slow),
            PowerUpType::Swap => Some(Effect::Swap),
            PowerUpType::SquareTurn => Some(Effect::SquareTurn),
            PowerUpType::SpawnBoost => Some(Effect::SpawnBoost),
            PowerUpType::SkinnyLine => Some(Effect::SkinnyLine),
            PowerUpType::FatLine => Some(Effect::FatLine),
            PowerUpType::Invincible => Some(Effect::Invincible),
            PowerUpType::BorderWrap => Some(Effect::BorderWrap),
            PowerUpType::Clear | PowerUpType::Random => None,
        }
    }

    fn random(rng: &mut impl Rng) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    fn random_concrete(rng: &mut impl Rng) -> Self {
        let concrete: Vec<_> = Self::ALL
            .into_iter()
            .filter(|t| *t != PowerUpType::Random)
            .collect();
        concrete[rng.random_range(0..concrete.len())]
    }
}

/// Color variant chosen at spawn. For dual-effect types it decides who is hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Variant {
    Red,
    Green,
    Blue,
    Purple,
}

impl Variant {
    pub fn color(self) -> PlayerColor {
        match self {
            Variant::Red => PlayerColor::rgb(0xFF, 0x00, 0x00),
            Variant::Green => PlayerColor::rgb(0x00, 0xFF, 0x00),
            Variant::Blue => PlayerColor::rgb(0x00, 0x00, 0xFF),
            Variant::Purple => PlayerColor::rgb(0x6A, 0x0D, 0xAD),
        }
    }
}

pub fn pick_variant(kind: PowerUpType, rng: &mut impl Rng) -> Variant {
    match kind {
        PowerUpType::Speed | PowerUpType::SquareTurn | PowerUpType::Slow => {
            if rng.random_bool(0.5) {
                Variant::Red
            } else {
                Variant::Green
            }
        },
        PowerUpType::BorderWrap => {
            if rng.random_bool(0.5) {
                Variant::Blue
            } else {
                Variant::Green
            }
        },
        PowerUpType::Clear | PowerUpType::SpawnBoost => Variant::Blue,
        PowerUpType::Random => Variant::Purple,
        PowerUpType::FatLine | PowerUpType::Swap => Variant::Red,
        PowerUpType::SkinnyLine | PowerUpType::Invincible => Variant::Green,
    }
}

/// Who receives a power-up's effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Collector,
    Others,
    Everyone,
}

impl Target {
    pub fn resolve(kind: PowerUpType, variant: Variant) -> Self {
        match kind {
            PowerUpType::Speed | PowerUpType::Slow | PowerUpType::SquareTurn => {
                if variant == Variant::Red {
                    Target::Others
                } else {
                    Target::Collector
                }
            },
            PowerUpType::Swap | PowerUpType::FatLine => Target::Others,
            PowerUpType::BorderWrap if variant == Variant::Blue => Target::Everyone,
            _ => Target::Collector,
        }
    }

    fn includes(self, is_collector: bool) -> bool {
        match self {
            Target::Collector => is_collector,
            Target::Others => !is_collector,
            Target::Everyone => true,
        }
    }
}

/// One effect grant made by a power-up, revoked exactly on expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grant {
    pub player_id: PlayerId,
    pub effect: Effect,
    pub source: SourceId,
}

/// Match state a power-up may touch while applying or expiring. Borrowed
/// for a single call.
pub struct MatchContext<'a> {
    pub players: &'a mut [Player],
    pub border_wrap_active: &'a mut bool,
    pub spawn_rate: &'a mut f64,
    pub scheduler: &'a mut Scheduler,
    pub config: &'a ArenaConfig,
    pub now: Millis,
    pub rng: &'a mut StdRng,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u64,
    pub kind: PowerUpType,
    pub variant: Variant,
    pub position: Point,
    pub radius: f64,
    pub inner_radius: f64,
    pub duration: Millis,
    pub collected: bool,
    pub collected_at: Option<Millis>,
    pub collector: Option<PlayerId>,
    grants: Vec<Grant>,
    global_wrap: bool,
    expired: bool,
}

impl PowerUp {
    pub fn new(
        id: u64,
        kind: PowerUpType,
        variant: Variant,
        position: Point,
        duration: Millis,
        config: &ArenaConfig,
    ) -> Self {
        Self {
            id,
            kind,
            variant,
            position,
            radius: config.power_up_radius,
            inner_radius: config.power_up_inner_radius,
            duration,
            collected: false,
            collected_at: None,
            collector: None,
            grants: Vec::new(),
            global_wrap: false,
            expired: false,
        }
    }

    /// One spawn roll. On success returns a power-up of a random type placed
    /// clear of the other uncollected power-ups, or `None` if no free spot
    /// was found.
    pub fn try_spawn(
        id: u64,
        spawn_rate: f64,
        existing: &[PowerUp],
        config: &ArenaConfig,
        rng: &mut impl Rng,
    ) -> Option<PowerUp> {
        if rng.random::<f64>() >= spawn_rate {
            return None;
        }
        let kind = PowerUpType::random(rng);
        let variant = pick_variant(kind, rng);
        let duration = rng.random_range(config.power_up_duration_min..config.power_up_duration_max);
        let pad = config.power_up_padding;
        let min_spacing = 3.0 * config.power_up_radius;

        for _ in 0..config.power_up_placement_attempts {
            let candidate = Point::new(
                rng.random_range(pad..config.arena_width - pad),
                rng.random_range(pad..config.arena_height - pad),
            );
            let crowded = existing
                .iter()
                .filter(|p| !p.collected)
                .any(|p| p.position.distance(candidate) < min_spacing);
            if !crowded {
                tracing::debug!(id, kind = ?kind, variant = ?variant, "power-up spawned");
                return Some(PowerUp::new(id, kind, variant, candidate, duration, config));
            }
        }
        tracing::debug!(id, kind = ?kind, "no free spot for power-up");
        None
    }

    pub fn collides_with(&self, player: &Player) -> bool {
        !self.collected && player.alive && self.position.distance(player.position) < self.radius
    }

    pub fn grants(&self) -> &[Grant] {
        &self.grants
    }

    /// Whether this power-up currently holds the global border wrap.
    pub fn holds_global_wrap(&self) -> bool {
        self.global_wrap && !self.expired
    }

    pub fn target(&self) -> Target {
        Target::resolve(self.kind, self.variant)
    }

    /// Mark collected by the player at `collector` and apply the effect.
    pub fn apply(&mut self, collector: usize, ctx: &mut MatchContext<'_>) {
        let collector_id = ctx.players[collector].id;
        self.collected = true;
        self.collected_at = Some(ctx.now);
        self.collector = Some(collector_id);

        if self.kind == PowerUpType::Random {
            self.kind = PowerUpType::random_concrete(&mut *ctx.rng);
            self.variant = pick_variant(self.kind, &mut *ctx.rng);
            tracing::debug!(id = self.id, kind = ?self.kind, "random power-up resolved");
        }

        match self.kind {
            PowerUpType::Clear => {
                for player in ctx.players.iter_mut() {
                    let width = player.line_width;
                    player.trail.clear(width);
                }
            },
            PowerUpType::SpawnBoost => {
                *ctx.spawn_rate = ctx.config.boosted_spawn_rate;
                let boost = ctx.config.spawn_boost_duration;
                let source = ctx.players[collector].add_effect(
                    Effect::SpawnBoost,
                    1.0,
                    boost,
                    ctx.now,
                    ctx.config,
                );
                ctx.scheduler.schedule(
                    ctx.now.saturating_add(boost),
                    ScheduledAction::EndSpawnBoost {
                        collector: collector_id,
                        source,
                    },
                );
            },
            kind => {
                let Some(effect) = kind.effect() else {
                    return;
                };
                let target = self.target();
                for (i, player) in ctx.players.iter_mut().enumerate() {
                    if !target.includes(i == collector) {
                        continue;
                    }
                    let source = player.add_effect(
                        effect,
                        effect.default_multiplier(),
                        self.duration,
                        ctx.now,
                        ctx.config,
                    );
                    self.grants.push(Grant {
                        player_id: player.id,
                        effect,
                        source,
                    });
                }
                if target == Target::Everyone && kind == PowerUpType::BorderWrap {
                    *ctx.border_wrap_active = true;
                    self.global_wrap = true;
                }
            },
        }
    }

    /// Poll expiry. Once the duration has elapsed since collection, revoke
    /// this power-up's grants and return true. Returns true only once.
    pub fn update(&mut self, ctx: &mut MatchContext<'_>) -> bool {
        if !self.collected || self.expired {
            return false;
        }
        let Some(collected_at) = self.collected_at else {
            return false;
        };
        if ctx.now.saturating_sub(collected_at) < self.duration {
            return false;
        }

        for grant in self.grants.drain(..) {
            if let Some(player) = ctx.players.iter_mut().find(|p| p.id == grant.player_id) {
                player.remove_effect(grant.effect, grant.source, ctx.now, ctx.config);
            }
        }
        if self.global_wrap {
            *ctx.border_wrap_active = false;
        }
        self.expired = true;
        tracing::debug!(id = self.id, kind = ?self.kind, "power-up expired");
        true
    }
}

#[cfg(test)]
mod tests {
    use kurve_core::test_helpers::make_roster;
    use rand::SeedableRng;

    use super::*;

    struct Fixture {
        players: Vec<Player>,
        border_wrap_active: bool,
        spawn_rate: f64,
        scheduler: Scheduler,
        config: ArenaConfig,
        rng: StdRng,
    }

    impl Fixture {
        fn new(n: usize) -> Self {
            let config = ArenaConfig::default();
            let mut rng = StdRng::seed_from_u64(5);
            let players = make_roster(n)
                .iter()
                .enumerate()
                .map(|(i, setup)| {
                    let mut p = Player::new(setup, &config);
                    p.position = Point::new(100.0 + 150.0 * i as f64, 400.0);
                    p.reset(&config, &mut rng);
                    p
                })
                .collect();
            Self {
                players,
                border_wrap_active: false,
                spawn_rate: config.base_spawn_rate,
                scheduler: Scheduler::default(),
                config,
                rng,
            }
        }

        fn ctx(&mut self, now: Millis) -> MatchContext<'_> {
            MatchContext {
                players: &mut self.players,
                border_wrap_active: &mut self.border_wrap_active,
                spawn_rate: &mut self.spawn_rate,
                scheduler: &mut self.scheduler,
                config: &self.config,
                now,
                rng: &mut self.rng,
            }
        }

        fn power_up(&self, id: u64, kind: PowerUpType, variant: Variant) -> PowerUp {
            PowerUp::new(id, kind, variant, Point::new(500.0, 400.0), 5000, &self.config)
        }
    }

    #[test]
    fn red_speed_hits_everyone_but_collector() {
        let mut f = Fixture::new(3);
        let mut p = f.power_up(1, PowerUpType::Speed, Variant::Red);
        p.apply(0, &mut f.ctx(0));
        assert_eq!(f.players[0].speed, 2.0);
        assert_eq!(f.players[1].speed, 4.0);
        assert_eq!(f.players[2].speed, 4.0);
        assert_eq!(p.grants().len(), 2);
    }

    #[test]
    fn green_slow_hits_collector_only() {
        let mut f = Fixture::new(2);
        let mut p = f.power_up(1, PowerUpType::Slow, Variant::Green);
        p.apply(1, &mut f.ctx(0));
        assert_eq!(f.players[0].speed, 2.0);
        assert_eq!(f.players[1].speed, 1.0);
    }

    #[test]
    fn fat_line_sources_expire_independently() {
        let mut f = Fixture::new(2);
        let mut a = f.power_up(1, PowerUpType::FatLine, Variant::Red);
        let mut b = f.power_up(2, PowerUpType::FatLine, Variant::Red);
        a.apply(0, &mut f.ctx(0));
        b.apply(0, &mut f.ctx(1000));
        assert_eq!(f.players[1].line_width, 32.0);

        assert!(a.update(&mut f.ctx(5000)));
        assert_eq!(f.players[1].line_width, 16.0, "b still running");
        assert!(!a.update(&mut f.ctx(5000)), "expiry reported once");
        assert!(!b.update(&mut f.ctx(5999)));
        assert!(b.update(&mut f.ctx(6000)));
        assert_eq!(f.players[1].line_width, 8.0);
    }

    #[test]
    fn swap_reverts_on_expiry() {
        let mut f = Fixture::new(2);
        let original = f.players[1].controls.clone();
        let mut p = f.power_up(1, PowerUpType::Swap, Variant::Red);
        p.apply(0, &mut f.ctx(0));
        assert!(f.players[1].swapped);
        assert!(!f.players[0].swapped);
        p.update(&mut f.ctx(5000));
        assert_eq!(f.players[1].controls, original);
    }

    #[test]
    fn blue_border_wrap_is_global() {
        let mut f = Fixture::new(3);
        let mut p = f.power_up(1, PowerUpType::BorderWrap, Variant::Blue);
        p.apply(2, &mut f.ctx(0));
        assert!(f.border_wrap_active);
        assert!(f.players.iter().all(|pl| pl.border_wrap));
        assert!(p.holds_global_wrap());

        p.update(&mut f.ctx(5000));
        assert!(!f.border_wrap_active);
        assert!(f.players.iter().all(|pl| !pl.border_wrap));
        assert!(!p.holds_global_wrap());
    }

    #[test]
    fn green_border_wrap_is_collector_only() {
        let mut f = Fixture::new(2);
        let mut p = f.power_up(1, PowerUpType::BorderWrap, Variant::Green);
        p.apply(0, &mut f.ctx(0));
        assert!(!f.border_wrap_active);
        assert!(f.players[0].border_wrap);
        assert!(!f.players[1].border_wrap);
    }

    #[test]
    fn clear_wipes_every_trail() {
        let mut f = Fixture::new(3);
        let mut p = f.power_up(1, PowerUpType::Clear, Variant::Blue);
        p.apply(0, &mut f.ctx(0));
        assert!(f.players.iter().all(|pl| pl.trail.is_empty()));
        assert!(f.players.iter().all(|pl| pl.trail.segments().len() == 1));
    }

    #[test]
    fn spawn_boost_raises_rate_and_schedules_revert() {
        let mut f = Fixture::new(2);
        let mut p = f.power_up(1, PowerUpType::SpawnBoost, Variant::Blue);
        p.apply(0, &mut f.ctx(100));
        assert_eq!(f.spawn_rate, f.config.boosted_spawn_rate);
        assert!(f.players[0].has_effect(Effect::SpawnBoost, 100));
        let due = f.scheduler.take_due(3100);
        assert_eq!(due.len(), 1);
        assert!(matches!(
            due[0],
            ScheduledAction::EndSpawnBoost { collector: 1, .. }
        ));
    }

    #[test]
    fn random_resolves_to_concrete_type() {
        let mut f = Fixture::new(2);
        for id in 0..20 {
            let mut p = f.power_up(id, PowerUpType::Random, Variant::Purple);
            p.apply(0, &mut f.ctx(0));
            assert_ne!(p.kind, PowerUpType::Random);
            assert_ne!(p.variant, Variant::Purple);
        }
    }

    #[test]
    fn uncollected_never_expires() {
        let mut f = Fixture::new(2);
        let mut p = f.power_up(1, PowerUpType::Speed, Variant::Green);
        assert!(!p.update(&mut f.ctx(1_000_000)));
    }

    #[test]
    fn expiry_with_no_grants_is_noop() {
        let mut f = Fixture::new(2);
        let mut p = f.power_up(1, PowerUpType::Clear, Variant::Blue);
        p.apply(0, &mut f.ctx(0));
        let before = f.players.clone();
        assert!(p.update(&mut f.ctx(5000)));
        assert_eq!(f.players, before);
    }

    #[test]
    fn dead_players_cannot_collect() {
        let mut f = Fixture::new(1);
        let p = f.power_up(1, PowerUpType::Speed, Variant::Green);
        f.players[0].position = p.position;
        assert!(p.collides_with(&f.players[0]));
        f.players[0].alive = false;
        assert!(!p.collides_with(&f.players[0]));
    }

    #[test]
    fn spawn_respects_rate_and_spacing() {
        let config = ArenaConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        assert!(PowerUp::try_spawn(1, 0.0, &[], &config, &mut rng).is_none());

        let mut placed: Vec<PowerUp> = Vec::new();
        for id in 0..30 {
            if let Some(p) = PowerUp::try_spawn(id, 1.0, &placed, &config, &mut rng) {
                let pad = config.power_up_padding;
                assert!(p.position.x >= pad && p.position.x < config.arena_width - pad);
                assert!(p.position.y >= pad && p.position.y < config.arena_height - pad);
                assert!((5000..10_000).contains(&p.duration));
                for other in &placed {
                    assert!(other.position.distance(p.position) >= 3.0 * config.power_up_radius);
                }
                placed.push(p);
            }
        }
        assert!(!placed.is_empty());
    }

    #[test]
    fn variant_targets() {
        assert_eq!(
            Target::resolve(PowerUpType::SquareTurn, Variant::Red),
            Target::Others
        );
        assert_eq!(
            Target::resolve(PowerUpType::SquareTurn, Variant::Green),
            Target::Collector
        );
        assert_eq!(
            Target::resolve(PowerUpType::SkinnyLine, Variant::Green),
            Target::Collector
        );
        assert_eq!(
            Target::resolve(PowerUpType::BorderWrap, Variant::Blue),
            Target::Everyone
        );
        assert_eq!(Variant::Purple.color().to_hex(), "#6A0DAD");
    }
}
