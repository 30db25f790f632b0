use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::input::KeyboardState;
use crate::player::PlayerSetup;

/// Unique identifier for a player in the game.
pub type PlayerId = u64;

/// Core trait implemented by the arena game.
///
/// The host owns the frame loop, keyboard polling and drawing; the game only
/// handles simulation. Each frame the host calls `update` once, then reads
/// the snapshot for rendering.
pub trait ArenaGame: Send {
    /// Game metadata for the lobby screen.
    fn metadata(&self) -> GameMetadata;

    /// Called once when the lobby hands over its ready seats.
    fn init(&mut self, roster: &[PlayerSetup]) -> Result<(), SetupError>;

    /// Called each frame. Returns the game events produced this tick.
    fn update(&mut self, keys: &dyn KeyboardState) -> Vec<GameEvent>;

    /// The play/pause key: prepares a round, starts it, or pauses/resumes it.
    fn toggle_play(&mut self);

    /// Whether the simulation is running (a round is active and not paused).
    fn is_playing(&self) -> bool;

    /// Whether the last round has finished and no new one is prepared.
    fn is_round_complete(&self) -> bool;

    /// Serialize the renderable state snapshot.
    fn serialize_state(&self) -> Vec<u8>;

    /// Current scores in roster order.
    fn standings(&self) -> Vec<PlayerScore>;
}

/// Game metadata for the lobby screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameMetadata {
    pub name: String,
    pub description: String,
    pub min_players: u8,
    pub max_players: u8,
}

/// Events emitted by the game during update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerDied { player_id: PlayerId },
    ScoreUpdate { player_id: PlayerId, score: u32 },
    PowerUpCollected { player_id: PlayerId, power_up_id: u64 },
    RoundComplete { survivor: Option<PlayerId> },
    MatchWon { player_id: PlayerId },
}

/// Score entry for a player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub score: u32,
}
