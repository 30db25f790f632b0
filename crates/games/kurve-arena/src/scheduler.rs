use serde::{Deserialize, Serialize};

use kurve_core::effect::SourceId;
use kurve_core::game_trait::PlayerId;
use kurve_core::time::Millis;

/// Deferred work the match runs once its due time passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScheduledAction {
    /// Restore the base spawn rate unless another boost is still running.
    EndSpawnBoost {
        collector: PlayerId,
        source: SourceId,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Entry {
    due_at: Millis,
    action: ScheduledAction,
}

/// Queue of game-clock-timed actions, polled once per tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduler {
    entries: Vec<Entry>,
}

impl Scheduler {
    pub fn schedule(&mut self, due_at: Millis, action: ScheduledAction) {
        self.entries.push(Entry { due_at, action });
    }

    /// Remove and return every action due at `now`, earliest first. Actions
    /// due at the same instant keep their scheduling order.
    pub fn take_due(&mut self, now: Millis) -> Vec<ScheduledAction> {
        let mut due: Vec<Entry> = Vec::new();
        self.entries.retain(|e| {
            if e.due_at <= now {
                due.push(e.clone());
                false
            } else {
                true
            }
        });
        due.sort_by_key(|e| e.due_at);
        due.into_iter().map(|e| e.action).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
