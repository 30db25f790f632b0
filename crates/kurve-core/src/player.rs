use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::game_trait::PlayerId;

/// Most players a single match accepts.
pub const MAX_PLAYERS: usize = 6;

/// RGB color used for trails, heads and scoreboard rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Default for PlayerColor {
    fn default() -> Self {
        Self::PALETTE[0]
    }
}

impl PlayerColor {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Default head color.
    pub const YELLOW: PlayerColor = PlayerColor::rgb(255, 255, 0);
    /// Head tint while a player's controls are swapped.
    pub const BLUE: PlayerColor = PlayerColor::rgb(0, 0, 255);

    /// Lobby palette, one entry per default seat.
    pub const PALETTE: &[PlayerColor] = &[
        PlayerColor::rgb(255, 0, 0),     // Red
        PlayerColor::rgb(0, 255, 0),     // Green
        PlayerColor::rgb(255, 0, 255),   // Magenta
        PlayerColor::rgb(0, 255, 255),   // Cyan
        PlayerColor::rgb(255, 165, 0),   // Orange
        PlayerColor::rgb(128, 128, 128), // Grey
    ];

    /// `#RRGGBB` form for canvas-style renderers.
    pub fn to_hex(self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Left/right steering key bindings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controls {
    pub left: String,
    pub right: String,
}

impl Controls {
    pub fn new(left: impl Into<String>, right: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn swap(&mut self) {
        std::mem::swap(&mut self.left, &mut self.right);
    }
}

/// A seat configured in the lobby, handed to the game at match start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSetup {
    pub id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub controls: Controls,
}

impl PlayerSetup {
    /// A seat takes part only once both steering keys are bound.
    pub fn is_ready(&self) -> bool {
        !self.controls.left.is_empty() && !self.controls.right.is_empty()
    }
}

/// The six lobby seats with no keys bound yet.
pub fn default_seats() -> Vec<PlayerSetup> {
    const NAMES: [&str; MAX_PLAYERS] = [
        "Fred", "Greenlee", "Pinkney", "Bluebell", "Willem", "Greydon",
    ];
    NAMES
        .iter()
        .zip(PlayerColor::PALETTE)
        .enumerate()
        .map(|(i, (name, color))| PlayerSetup {
            id: i as PlayerId + 1,
            name: (*name).to_string(),
            color: *color,
            controls: Controls::new("", ""),
        })
        .collect()
}

/// Seats that have both keys bound, in seat order.
pub fn ready_players(seats: &[PlayerSetup]) -> Vec<PlayerSetup> {
    seats.iter().filter(|s| s.is_ready()).cloned().collect()
}

/// Check a roster before a match is built from it.
pub fn validate_roster(roster: &[PlayerSetup]) -> Result<(), SetupError> {
    if roster.len() > MAX_PLAYERS {
        return Err(SetupError::TooManyPlayers(roster.len()));
    }

    let mut ids = HashSet::new();
    let mut keys: HashSet<&str> = HashSet::new();
    for seat in roster {
        if seat.name.trim().is_empty() {
            return Err(SetupError::EmptyName(seat.id));
        }
        if !ids.insert(seat.id) {
            return Err(SetupError::DuplicatePlayer(seat.id));
        }
        if !seat.is_ready() {
            return Err(SetupError::MissingBinding(seat.id));
        }
        for key in [&seat.controls.left, &seat.controls.right] {
            if !keys.insert(key.as_str()) {
                return Err(SetupError::DuplicateBinding {
                    player_id: seat.id,
                    key: key.clone(),
                });
            }
        }
    }
    tracing::debug!(players = roster.len(), "Roster validated");
    Ok(())
}
