use std::fmt::Debug;
use std::hash::Hash;

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::time::Millis;

/// Trait for game-specific effect kind enums.
pub trait EffectKind:
    Debug + Clone + Copy + PartialEq + Eq + Hash + Serialize + DeserializeOwned
{
}

/// Identifies a single effect grant, so that exactly that grant can be
/// revoked while other grants of the same kind keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SourceId(pub u64);

/// A timed, stacking modifier held by a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct EffectTimer<K: EffectKind> {
    pub kind: K,
    pub multiplier: f64,
    /// Absolute game-clock instant at which this timer stops applying.
    pub expires_at: Millis,
    pub source: SourceId,
}

impl<K: EffectKind> EffectTimer<K> {
    pub fn new(kind: K, multiplier: f64, now: Millis, duration: Millis, source: SourceId) -> Self {
        debug_assert!(
            multiplier.is_finite() && multiplier > 0.0,
            "effect multiplier must be positive and finite, got {multiplier}"
        );
        Self {
            kind,
            multiplier,
            expires_at: now.saturating_add(duration),
            source,
        }
    }

    pub fn is_expired(&self, now: Millis) -> bool {
        now >= self.expires_at
    }

    pub fn remaining(&self, now: Millis) -> Millis {
        self.expires_at.saturating_sub(now)
    }
}
