use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use kurve_core::effect::{EffectKind, EffectTimer, SourceId};
use kurve_core::time::Millis;

/// Timed effects a player can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Effect {
    Speed,
    Slow,
    FatLine,
    SkinnyLine,
    SquareTurn,
    Swap,
    Invincible,
    BorderWrap,
    SpawnBoost,
}

impl EffectKind for Effect {}

/// Which derived quantity an effect's multiplier feeds into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Speed,
    Width,
    Other,
}

impl Effect {
    pub fn category(self) -> Category {
        match self {
            Effect::Speed | Effect::Slow => Category::Speed,
            Effect::FatLine | Effect::SkinnyLine => Category::Width,
            _ => Category::Other,
        }
    }

    pub fn default_multiplier(self) -> f64 {
        match self {
            Effect::Speed | Effect::FatLine => 2.0,
            Effect::Slow | Effect::SkinnyLine => 0.5,
            _ => 1.0,
        }
    }

    /// Effects that flip a state on the player and must flip it back once
    /// the last grant of the kind is gone.
    pub fn has_revert(self) -> bool {
        matches!(
            self,
            Effect::SquareTurn | Effect::Swap | Effect::Invincible | Effect::BorderWrap
        )
    }
}

/// All timers a player holds, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectBook {
    timers: BTreeMap<Effect, Vec<EffectTimer<Effect>>>,
}

impl EffectBook {
    pub fn add(&mut self, timer: EffectTimer<Effect>) {
        self.timers.entry(timer.kind).or_default().push(timer);
    }

    /// Whether at least one unexpired timer of `kind` is held.
    pub fn has(&self, kind: Effect, now: Millis) -> bool {
        self.timers
            .get(&kind)
            .is_some_and(|list| list.iter().any(|t| !t.is_expired(now)))
    }

    /// Drop the timer granted by `source`. Returns false if none matched.
    pub fn remove_source(&mut self, kind: Effect, source: SourceId) -> bool {
        let Some(list) = self.timers.get_mut(&kind) else {
            return false;
        };
        let before = list.len();
        list.retain(|t| t.source != source);
        let removed = list.len() != before;
        if list.is_empty() {
            self.timers.remove(&kind);
        }
        removed
    }

    /// Drop every expired timer and return the kinds left with no timers.
    pub fn prune_expired(&mut self, now: Millis) -> Vec<Effect> {
        let mut emptied = Vec::new();
        self.timers.retain(|kind, list| {
            let before = list.len();
            list.retain(|t| !t.is_expired(now));
            if list.is_empty() {
                if before > 0 {
                    emptied.push(*kind);
                }
                false
            } else {
                true
            }
        });
        emptied
    }

    /// Product of the multipliers of every active timer in `category`.
    pub fn multiplier(&self, category: Category, now: Millis) -> f64 {
        self.timers
            .iter()
            .filter(|(kind, _)| kind.category() == category)
            .flat_map(|(_, list)| list.iter())
            .filter(|t| !t.is_expired(now))
            .map(|t| t.multiplier)
            .product()
    }

    /// Time left on the longest-running timer of `kind`.
    pub fn remaining(&self, kind: Effect, now: Millis) -> Millis {
        self.timers
            .get(&kind)
            .and_then(|list| list.iter().map(|t| t.remaining(now)).max())
            .unwrap_or(0)
    }

    pub fn active_kinds(&self) -> impl Iterator<Item = Effect> + '_ {
        self.timers.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
