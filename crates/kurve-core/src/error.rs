use crate::game_trait::PlayerId;
use crate::player::MAX_PLAYERS;

/// Reasons a roster cannot be turned into a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetupError {
    TooManyPlayers(usize),
    EmptyName(PlayerId),
    DuplicatePlayer(PlayerId),
    MissingBinding(PlayerId),
    DuplicateBinding { player_id: PlayerId, key: String },
}

impl std::fmt::Display for SetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TooManyPlayers(n) => {
                write!(f, "too many players: {n} (max {MAX_PLAYERS})")
            },
            Self::EmptyName(id) => write!(f, "player {id} has an empty name"),
            Self::DuplicatePlayer(id) => write!(f, "player id {id} appears twice"),
            Self::MissingBinding(id) => write!(f, "player {id} is missing a steering key"),
            Self::DuplicateBinding { player_id, key } => {
                write!(f, "key '{key}' of player {player_id} is already bound")
            },
        }
    }
}

impl std::error::Error for SetupError {}
