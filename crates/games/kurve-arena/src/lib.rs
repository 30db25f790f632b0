pub mod arena;
pub mod collision;
pub mod config;
pub mod effects;
pub mod player;
pub mod powerups;
pub mod scheduler;
pub mod scoring;
pub mod trail;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

use kurve_core::error::SetupError;
use kurve_core::game_trait::{ArenaGame, GameEvent, GameMetadata, PlayerId, PlayerScore};
use kurve_core::input::{HeldKeys, KeyboardState};
use kurve_core::player::{PlayerSetup, validate_roster};
use kurve_core::time::{Millis, PausableClock, SystemTimeSource, TimeSource};

use collision::Bounds;
use config::ArenaConfig;
use effects::Effect;
use player::Player;
use powerups::{MatchContext, PowerUp, PowerUpType, Variant};
use scheduler::{ScheduledAction, Scheduler};
use scoring::Scoreboard;
use trail::Point;

/// Where the match is between rounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    /// No round; the next toggle positions the players.
    Idle,
    /// Players are positioned; the next toggle starts the round.
    ReadyToStart,
    /// A round is running (or paused).
    RoundActive,
}

/// Renderable match snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub players: Vec<Player>,
    pub power_ups: Vec<PowerUp>,
    pub phase: Phase,
    pub playing: bool,
    pub target_score: u32,
    pub border_wrap_active: bool,
    pub spawn_rate: f64,
    pub round_number: u32,
    pub arena_width: f64,
    pub arena_height: f64,
    pub match_winner: Option<PlayerId>,
    pub last_survivor: Option<PlayerId>,
    /// Game-clock time of the last simulated tick.
    pub clock_ms: Millis,
}

/// One frame of input from an external provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArenaInput {
    /// Keys currently held down.
    pub held: Vec<String>,
    /// The play/pause key was pressed this frame.
    pub toggle_play: bool,
}

/// The arena match: roster, power-ups and the round/match state machine.
pub struct GameState {
    state: MatchState,
    clock: PausableClock,
    rng: StdRng,
    scheduler: Scheduler,
    config: ArenaConfig,
    next_power_up_id: u64,
}

impl GameState {
    pub fn new() -> Self {
        Self::with_config(ArenaConfig::load())
    }

    pub fn with_config(config: ArenaConfig) -> Self {
        Self::with_time_source(config, SystemTimeSource::new())
    }

    /// Build a match on `source`. An invalid `config` is replaced by the
    /// defaults.
    pub fn with_time_source(config: ArenaConfig, source: impl TimeSource + 'static) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                tracing::warn!("Rejected arena config: {e}, using defaults");
                ArenaConfig {
                    seed: config.seed,
                    ..ArenaConfig::default()
                }
            },
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            state: MatchState {
                players: Vec::new(),
                power_ups: Vec::new(),
                phase: Phase::Idle,
                playing: false,
                target_score: 0,
                border_wrap_active: false,
                spawn_rate: config.base_spawn_rate,
                round_number: 0,
                arena_width: config.arena_width,
                arena_height: config.arena_height,
                match_winner: None,
                last_survivor: None,
                clock_ms: 0,
            },
            clock: PausableClock::new(source),
            rng,
            scheduler: Scheduler::default(),
            config,
            next_power_up_id: 1,
        }
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Current game-clock time (paused time excluded).
    pub fn now(&self) -> Millis {
        self.clock.now()
    }

    pub fn is_paused(&self) -> bool {
        self.state.phase == Phase::RoundActive && !self.state.playing
    }

    /// Direct roster access for hosts arranging a scenario (demos, replays).
    pub fn players_mut(&mut self) -> &mut [Player] {
        &mut self.state.players
    }

    pub fn scoreboard(&self) -> Scoreboard {
        Scoreboard::build(
            &self.state.players,
            self.state.target_score,
            self.config.winning_margin,
        )
    }

    /// Put an uncollected power-up on the field. Returns its id.
    pub fn place_power_up(&mut self, kind: PowerUpType, variant: Variant, position: Point) -> u64 {
        let id = self.next_power_up_id;
        self.next_power_up_id += 1;
        let duration = self.config.power_up_duration_min;
        self.state
            .power_ups
            .push(PowerUp::new(id, kind, variant, position, duration, &self.config));
        id
    }

    /// Zero every score and forget the previous winner.
    pub fn start_new_match(&mut self) {
        for player in &mut self.state.players {
            player.score = 0;
        }
        self.state.match_winner = None;
        self.state.last_survivor = None;
        self.state.round_number = 0;
        tracing::info!(players = self.state.players.len(), "new match");
    }

    /// Decode one rmp-encoded [`ArenaInput`] and run a tick with it.
    /// Malformed input is dropped.
    pub fn apply_input(&mut self, input: &[u8]) -> Vec<GameEvent> {
        match rmp_serde::from_slice::<ArenaInput>(input) {
            Err(e) => {
                tracing::debug!(error = %e, "Dropped malformed arena input");
                Vec::new()
            },
            Ok(frame) => {
                if frame.toggle_play {
                    self.toggle_play();
                }
                let keys: HeldKeys = frame.held.into_iter().collect();
                self.update(&keys)
            },
        }
    }

    fn prepare_round(&mut self) {
        if self.state.match_winner.is_some() {
            self.start_new_match();
        }

        let spawns = arena::spawn_points(self.state.players.len(), &self.config, &mut self.rng);
        for (player, spawn) in self.state.players.iter_mut().zip(spawns) {
            player.position = spawn.position;
            player.angle = spawn.angle;
            player.reset(&self.config, &mut self.rng);
        }
        self.clear_round_state();
        self.state.last_survivor = None;
        self.state.phase = Phase::ReadyToStart;
        self.state.playing = false;
        tracing::debug!(round = self.state.round_number + 1, "round prepared");
    }

    fn start_round(&mut self) {
        self.state.phase = Phase::RoundActive;
        self.state.playing = true;
        self.state.round_number += 1;
        tracing::info!(round = self.state.round_number, "round started");
    }

    fn clear_round_state(&mut self) {
        self.state.power_ups.clear();
        self.scheduler.clear();
        self.state.spawn_rate = self.config.base_spawn_rate;
        self.state.border_wrap_active = false;
    }

    fn run_scheduled(&mut self, now: Millis) {
        for action in self.scheduler.take_due(now) {
            match action {
                ScheduledAction::EndSpawnBoost { collector, source } => {
                    if let Some(player) = self.state.players.iter_mut().find(|p| p.id == collector)
                    {
                        player.remove_effect(Effect::SpawnBoost, source, now, &self.config);
                    }
                    let boosted = self
                        .state
                        .players
                        .iter()
                        .any(|p| p.has_effect(Effect::SpawnBoost, now));
                    if !boosted {
                        self.state.spawn_rate = self.config.base_spawn_rate;
                        tracing::debug!(collector, "spawn boost ended");
                    }
                },
            }
        }
    }

    fn move_players(&mut self, keys: &dyn KeyboardState, now: Millis, events: &mut Vec<GameEvent>) {
        let bounds = Bounds::from_config(&self.config);
        for i in 0..self.state.players.len() {
            if !self.state.players[i].alive {
                continue;
            }
            let player = &mut self.state.players[i];
            player.steer(keys, &self.config);
            player.advance(now, &self.config, &mut self.rng);

            let hit = collision::check_collision(
                i,
                &mut self.state.players,
                bounds,
                self.state.border_wrap_active,
                &self.config,
            );
            if let Some(cause) = hit {
                let player = &mut self.state.players[i];
                player.alive = false;
                tracing::debug!(player_id = player.id, cause = ?cause, "player died");
                events.push(GameEvent::PlayerDied {
                    player_id: player.id,
                });
                for update in scoring::award_survivors(&mut self.state.players) {
                    events.push(GameEvent::ScoreUpdate {
                        player_id: update.player_id,
                        score: update.score,
                    });
                }
            }
        }
    }

    fn update_power_ups(&mut self, now: Millis, events: &mut Vec<GameEvent>) {
        let mut ctx = MatchContext {
            players: &mut self.state.players,
            border_wrap_active: &mut self.state.border_wrap_active,
            spawn_rate: &mut self.state.spawn_rate,
            scheduler: &mut self.scheduler,
            config: &self.config,
            now,
            rng: &mut self.rng,
        };

        for power_up in self.state.power_ups.iter_mut().filter(|p| !p.collected) {
            let Some(collector) = ctx.players.iter().position(|p| power_up.collides_with(p)) else {
                continue;
            };
            power_up.apply(collector, &mut ctx);
            let player_id = ctx.players[collector].id;
            tracing::debug!(
                player_id,
                power_up_id = power_up.id,
                kind = ?power_up.kind,
                "power-up collected"
            );
            events.push(GameEvent::PowerUpCollected {
                player_id,
                power_up_id: power_up.id,
            });
        }

        self.state.power_ups.retain_mut(|p| !p.update(&mut ctx));

        // An overlapping global wrap keeps the flag up after another one expires.
        if self.state.power_ups.iter().any(PowerUp::holds_global_wrap) {
            self.state.border_wrap_active = true;
        }

        let id = self.next_power_up_id;
        if let Some(power_up) = PowerUp::try_spawn(
            id,
            self.state.spawn_rate,
            &self.state.power_ups,
            &self.config,
            &mut self.rng,
        ) {
            self.next_power_up_id += 1;
            self.state.power_ups.push(power_up);
        }
    }

    fn end_round(&mut self, events: &mut Vec<GameEvent>) {
        let survivor = self.state.players.iter().find(|p| p.alive).map(|p| p.id);
        for player in &mut self.state.players {
            player.reset_effects(&self.config);
        }
        self.clear_round_state();
        self.state.phase = Phase::Idle;
        self.state.playing = false;
        self.state.last_survivor = survivor;
        tracing::info!(round = self.state.round_number, survivor = ?survivor, "round complete");
        events.push(GameEvent::RoundComplete { survivor });

        if let Some(winner) = scoring::winner(
            &self.state.players,
            self.state.target_score,
            self.config.winning_margin,
        ) {
            self.state.match_winner = Some(winner);
            tracing::info!(player_id = winner, "match won");
            events.push(GameEvent::MatchWon { player_id: winner });
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::with_config(ArenaConfig::default())
    }
}

impl ArenaGame for GameState {
    fn metadata(&self) -> GameMetadata {
        GameMetadata {
            name: "Kurve".to_string(),
            description: "Steer your line, dodge every trail, grab power-ups, outlast the rest."
                .to_string(),
            min_players: 2,
            max_players: kurve_core::player::MAX_PLAYERS as u8,
        }
    }

    fn init(&mut self, roster: &[PlayerSetup]) -> Result<(), SetupError> {
        validate_roster(roster)?;
        if self.clock.is_paused() {
            self.clock.resume();
        }
        self.state.players = roster
            .iter()
            .map(|setup| Player::new(setup, &self.config))
            .collect();
        self.state.target_score = self.config.target_score(roster.len());
        self.state.phase = Phase::Idle;
        self.state.playing = false;
        self.state.round_number = 0;
        self.state.match_winner = None;
        self.state.last_survivor = None;
        self.clear_round_state();
        tracing::info!(
            players = roster.len(),
            target = self.state.target_score,
            "match initialized"
        );
        Ok(())
    }

    fn update(&mut self, keys: &dyn KeyboardState) -> Vec<GameEvent> {
        if self.state.phase != Phase::RoundActive || !self.state.playing {
            return Vec::new();
        }
        let now = self.clock.now();
        self.state.clock_ms = now;
        let mut events = Vec::new();

        self.run_scheduled(now);
        self.move_players(keys, now, &mut events);
        self.update_power_ups(now, &mut events);

        let alive = self.state.players.iter().filter(|p| p.alive).count();
        if alive <= 1 {
            self.end_round(&mut events);
        }
        events
    }

    fn toggle_play(&mut self) {
        match self.state.phase {
            Phase::Idle => self.prepare_round(),
            Phase::ReadyToStart => self.start_round(),
            Phase::RoundActive if self.state.playing => {
                self.clock.pause();
                self.state.playing = false;
                tracing::info!(at = self.clock.now(), "paused");
            },
            Phase::RoundActive => {
                let paused_ms = self.clock.resume();
                self.state.playing = true;
                tracing::info!(paused_ms, "resumed");
            },
        }
    }

    fn is_playing(&self) -> bool {
        self.state.phase == Phase::RoundActive && self.state.playing
    }

    fn is_round_complete(&self) -> bool {
        self.state.phase == Phase::Idle && self.state.round_number > 0
    }

    fn serialize_state(&self) -> Vec<u8> {
        rmp_serde::to_vec(&self.state).unwrap_or_default()
    }

    fn standings(&self) -> Vec<PlayerScore> {
        self.state
            .players
            .iter()
            .map(|p| PlayerScore {
                player_id: p.id,
                score: p.score,
            })
            .collect()
    }
}
