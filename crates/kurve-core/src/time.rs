use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

/// Milliseconds, used both for durations and for timestamps on a clock.
pub type Millis = u64;

/// A monotonic millisecond source the simulation reads "now" from.
pub trait TimeSource: Send + Sync {
    fn now_ms(&self) -> Millis;
}

/// Wall-clock time source, counting from its own creation.
#[derive(Debug, Clone)]
pub struct SystemTimeSource {
    origin: Instant,
}

impl SystemTimeSource {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemTimeSource {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeSource for SystemTimeSource {
    fn now_ms(&self) -> Millis {
        self.origin.elapsed().as_millis() as Millis
    }
}

/// Hand-driven time source. Clones share the same underlying counter, so a
/// test can keep one handle and give the other to the game.
#[derive(Debug, Clone, Default)]
pub struct ManualTimeSource {
    now: Arc<AtomicU64>,
}

impl ManualTimeSource {
    pub fn new(start: Millis) -> Self {
        Self {
            now: Arc::new(AtomicU64::new(start)),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, by: Millis) {
        self.now.fetch_add(by, Ordering::SeqCst);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> Millis {
        self.now.load(Ordering::SeqCst)
    }
}

/// Game clock that stands still while paused.
///
/// Every timer in the simulation (effect expiry, power-up collection time,
/// scheduled events) is stamped with `now()` from this clock. Time spent
/// paused is subtracted from the wall reading, so remaining effect time is
/// the same after a resume as it was at the moment of pausing.
pub struct PausableClock {
    source: Box<dyn TimeSource>,
    /// Wall reading at which the current pause began.
    paused_at: Option<Millis>,
    /// Sum of all completed pauses.
    paused_total: Millis,
}

impl PausableClock {
    pub fn new(source: impl TimeSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            paused_at: None,
            paused_total: 0,
        }
    }

    /// Current game time.
    pub fn now(&self) -> Millis {
        let wall = self.paused_at.unwrap_or_else(|| self.source.now_ms());
        wall.saturating_sub(self.paused_total)
    }

    /// Wall reading at which the clock was paused, if it is paused.
    pub fn paused_at(&self) -> Option<Millis> {
        self.paused_at
    }

    pub fn is_paused(&self) -> bool {
        self.paused_at.is_some()
    }

    /// Total wall time spent paused so far.
    pub fn paused_total(&self) -> Millis {
        self.paused_total
    }

    /// Freeze game time. Pausing an already-paused clock keeps the original
    /// pause timestamp.
    pub fn pause(&mut self) {
        if self.paused_at.is_none() {
            self.paused_at = Some(self.source.now_ms());
        }
    }

    /// Unfreeze game time and return how long the pause lasted.
    pub fn resume(&mut self) -> Millis {
        let Some(started) = self.paused_at.take() else {
            return 0;
        };
        let paused_for = self.source.now_ms().saturating_sub(started);
        self.paused_total += paused_for;
        paused_for
    }
}

impl std::fmt::Debug for PausableClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PausableClock")
            .field("now", &self.now())
            .field("paused_at", &self.paused_at)
            .field("paused_total", &self.paused_total)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_source_clones_share_time() {
        let a = ManualTimeSource::new(100);
        let b = a.clone();
        a.advance(50);
        assert_eq!(b.now_ms(), 150);
        b.set(10);
        assert_eq!(a.now_ms(), 10);
    }

    #[test]
    fn clock_follows_source_while_running() {
        let src = ManualTimeSource::new(0);
        let clock = PausableClock::new(src.clone());
        src.advance(1234);
        assert_eq!(clock.now(), 1234);
    }

    #[test]
    fn clock_freezes_while_paused() {
        let src = ManualTimeSource::new(0);
        let mut clock = PausableClock::new(src.clone());
        src.set(1000);
        clock.pause();
        src.set(2500);
        assert_eq!(clock.now(), 1000);
        assert_eq!(clock.paused_at(), Some(1000));
    }

    #[test]
    fn resume_subtracts_paused_duration() {
        let src = ManualTimeSource::new(0);
        let mut clock = PausableClock::new(src.clone());
        src.set(1000);
        clock.pause();
        src.set(3000);
        assert_eq!(clock.resume(), 2000);
        assert!(!clock.is_paused());
        src.set(7000);
        assert_eq!(clock.now(), 5000);
    }

    #[test]
    fn double_pause_keeps_first_timestamp() {
        let src = ManualTimeSource::new(0);
        let mut clock = PausableClock::new(src.clone());
        src.set(100);
        clock.pause();
        src.set(400);
        clock.pause();
        src.set(600);
        assert_eq!(clock.resume(), 500);
    }

    #[test]
    fn resume_without_pause_is_noop() {
        let src = ManualTimeSource::new(42);
        let mut clock = PausableClock::new(src);
        assert_eq!(clock.resume(), 0);
        assert_eq!(clock.now(), 42);
    }

    #[test]
    fn system_source_is_monotonic() {
        let src = SystemTimeSource::new();
        let a = src.now_ms();
        let b = src.now_ms();
        assert!(b >= a);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn game_time_never_runs_backwards(
                steps in prop::collection::vec((0u64..2000, any::<bool>()), 1..60),
            ) {
                let src = ManualTimeSource::new(0);
                let mut clock = PausableClock::new(src.clone());
                let mut last = clock.now();
                for (advance, toggle) in steps {
                    src.advance(advance);
                    if toggle {
                        if clock.is_paused() {
                            clock.resume();
                        } else {
                            clock.pause();
                        }
                    }
                    let now = clock.now();
                    prop_assert!(now >= last, "clock went from {} to {}", last, now);
                    last = now;
                }
            }

            #[test]
            fn running_time_excludes_every_pause(
                pauses in prop::collection::vec((0u64..1000, 0u64..1000), 0..20),
            ) {
                let src = ManualTimeSource::new(0);
                let mut clock = PausableClock::new(src.clone());
                let mut running = 0;
                for (run, idle) in pauses {
                    src.advance(run);
                    running += run;
                    clock.pause();
                    src.advance(idle);
                    prop_assert_eq!(clock.resume(), idle);
                }
                prop_assert_eq!(clock.now(), running);
            }
        }
    }
}
