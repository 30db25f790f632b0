use serde::{Deserialize, Serialize};

use kurve_core::time::Millis;

/// Data-driven configuration for the arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Arena width in pixels.
    pub arena_width: f64,
    /// Arena height in pixels.
    pub arena_height: f64,
    /// Distance travelled per tick with no speed effects.
    pub default_speed: f64,
    /// Trail width with no width effects.
    pub default_line_width: f64,
    /// Head collision radius with no width effects.
    pub default_head_radius: f64,
    /// Heading change per tick of held steering (radians).
    pub turn_step: f64,
    /// Lower bound of the ticks drawn between trail gaps.
    pub gap_interval_min: f64,
    /// Upper bound (exclusive) of the ticks drawn between trail gaps.
    pub gap_interval_max: f64,
    /// Ticks a trail gap lasts.
    pub gap_length: u32,
    /// A head jump larger than this on either axis (e.g. a border wrap)
    /// records a gap instead of a point.
    pub trail_jump_threshold: f64,
    /// Points in the cosmetic trail stub laid behind the head on reset.
    pub trail_stub_points: usize,
    /// Spacing of the trail stub points.
    pub trail_stub_spacing: f64,
    /// Most recent own trail points ignored by self collision at default width.
    pub self_grace_points: usize,
    /// Extra self clearance while square turning.
    pub square_turn_padding: f64,
    /// Power-up collection radius.
    pub power_up_radius: f64,
    /// Power-up inner (filled) radius, for rendering.
    pub power_up_inner_radius: f64,
    /// Shortest power-up effect duration (ms).
    pub power_up_duration_min: Millis,
    /// Longest power-up effect duration, exclusive (ms).
    pub power_up_duration_max: Millis,
    /// Keep-out band along the arena edges for power-up placement.
    pub power_up_padding: f64,
    /// Attempts at finding a free spot for a new power-up before giving up.
    pub power_up_placement_attempts: u32,
    /// Per-tick spawn probability.
    pub base_spawn_rate: f64,
    /// Per-tick spawn probability while a spawn boost runs.
    pub boosted_spawn_rate: f64,
    /// How long a spawn boost lasts (ms).
    pub spawn_boost_duration: Millis,
    /// Keep-out band along the arena edges for round-start positions.
    pub spawn_margin: f64,
    /// Minimum distance between players at round start.
    pub min_spawn_spacing: f64,
    /// Attempts at finding spaced round-start positions before accepting.
    pub spawn_attempts: u32,
    /// Target score per opponent.
    pub points_per_opponent: u32,
    /// Lead over second place required to win.
    pub winning_margin: u32,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            arena_width: 1000.0,
            arena_height: 800.0,
            default_speed: 2.0,
            default_line_width: 8.0,
            default_head_radius: 4.0,
            turn_step: 0.05,
            gap_interval_min: 200.0,
            gap_interval_max: 600.0,
            gap_length: 12,
            trail_jump_threshold: 100.0,
            trail_stub_points: 5,
            trail_stub_spacing: 5.0,
            self_grace_points: 10,
            square_turn_padding: 2.0,
            power_up_radius: 25.0,
            power_up_inner_radius: 20.0,
            power_up_duration_min: 5000,
            power_up_duration_max: 10_000,
            power_up_padding: 50.0,
            power_up_placement_attempts: 20,
            base_spawn_rate: 0.005,
            boosted_spawn_rate: 0.025,
            spawn_boost_duration: 3000,
            spawn_margin: 50.0,
            min_spawn_spacing: 100.0,
            spawn_attempts: 50,
            points_per_opponent: 10,
            winning_margin: 2,
            seed: None,
        }
    }
}

/// Why a configuration could not be used.
#[derive(Debug)]
pub enum ConfigError {
    Io(String),
    Parse(String),
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "config io error: {e}"),
            Self::Parse(e) => write!(f, "config parse error: {e}"),
            Self::Invalid(e) => write!(f, "invalid config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl ArenaConfig {
    /// Load config from a TOML file. Falls back to defaults if the file is
    /// missing, unparseable, or invalid.
    pub fn load() -> Self {
        let path = std::env::var("KURVE_ARENA_CONFIG")
            .unwrap_or_else(|_| "config/arena.toml".to_string());
        match Self::from_file(&path) {
            Ok(cfg) => cfg,
            Err(ConfigError::Io(_)) => ArenaConfig::default(),
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}, using defaults");
                ArenaConfig::default()
            },
        }
    }

    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.arena_width > 0.0 && self.arena_height > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "arena must have a positive size, got {}x{}",
                self.arena_width, self.arena_height
            )));
        }
        for (name, margin) in [
            ("spawn_margin", self.spawn_margin),
            ("power_up_padding", self.power_up_padding),
        ] {
            if margin < 0.0
                || self.arena_width <= 2.0 * margin
                || self.arena_height <= 2.0 * margin
            {
                return Err(ConfigError::Invalid(format!(
                    "{name} {margin} leaves no room in a {}x{} arena",
                    self.arena_width, self.arena_height
                )));
            }
        }
        if self.default_speed <= 0.0 || self.default_line_width <= 0.0 {
            return Err(ConfigError::Invalid(
                "speed and line width must be positive".to_string(),
            ));
        }
        for (name, rate) in [
            ("base_spawn_rate", self.base_spawn_rate),
            ("boosted_spawn_rate", self.boosted_spawn_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(ConfigError::Invalid(format!(
                    "{name} must be within [0, 1], got {rate}"
                )));
            }
        }
        if self.gap_interval_min >= self.gap_interval_max {
            return Err(ConfigError::Invalid(format!(
                "gap interval range [{}, {}) is empty",
                self.gap_interval_min, self.gap_interval_max
            )));
        }
        if self.power_up_duration_min >= self.power_up_duration_max {
            return Err(ConfigError::Invalid(format!(
                "power-up duration range [{}, {}) is empty",
                self.power_up_duration_min, self.power_up_duration_max
            )));
        }
        Ok(())
    }

    /// Points needed to win with `player_count` players.
    pub fn target_score(&self, player_count: usize) -> u32 {
        player_count.saturating_sub(1) as u32 * self.points_per_opponent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(ArenaConfig::default().validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ArenaConfig::from_toml_str("arena_width = 640.0\nseed = 7\n").unwrap();
        assert_eq!(cfg.arena_width, 640.0);
        assert_eq!(cfg.arena_height, 800.0);
        assert_eq!(cfg.seed, Some(7));
    }

    #[test]
    fn malformed_toml_is_parse_error() {
        assert!(matches!(
            ArenaConfig::from_toml_str("arena_width = = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn spawn_rate_out_of_range_rejected() {
        assert!(matches!(
            ArenaConfig::from_toml_str("base_spawn_rate = 1.5"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn empty_gap_range_rejected() {
        let cfg = ArenaConfig {
            gap_interval_min: 600.0,
            ..ArenaConfig::default()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn arena_narrower_than_spawn_margin_rejected() {
        let cfg = ArenaConfig {
            arena_width: 100.0,
            spawn_margin: 50.0,
            power_up_padding: 10.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn arena_shorter_than_spawn_margin_rejected() {
        let cfg = ArenaConfig {
            arena_height: 90.0,
            spawn_margin: 50.0,
            power_up_padding: 10.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn arena_narrower_than_power_up_padding_rejected() {
        let cfg = ArenaConfig {
            arena_width: 120.0,
            spawn_margin: 10.0,
            power_up_padding: 60.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn arena_shorter_than_power_up_padding_rejected() {
        let cfg = ArenaConfig {
            arena_height: 120.0,
            spawn_margin: 10.0,
            power_up_padding: 60.0,
            ..ArenaConfig::default()
        };
        assert!(matches!(cfg.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn tiny_arena_from_toml_rejected() {
        assert!(matches!(
            ArenaConfig::from_toml_str("arena_width = 90.0\narena_height = 90.0\nseed = 1\n"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_io_error() {
        assert!(matches!(
            ArenaConfig::from_file("/nonexistent/kurve/arena.toml"),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn target_score_scales_with_opponents() {
        let cfg = ArenaConfig::default();
        assert_eq!(cfg.target_score(2), 10);
        assert_eq!(cfg.target_score(4), 30);
        assert_eq!(cfg.target_score(0), 0);
    }
}
