pub mod effect;
pub mod error;
pub mod game_trait;
pub mod input;
pub mod player;
pub mod time;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use crate::game_trait::{ArenaGame, GameEvent, PlayerId};
    use crate::input::{HeldKeys, KeyboardState, NoKeys};
    use crate::player::{Controls, PlayerColor, PlayerSetup};

    /// Create `n` test seats with sequential IDs starting at 1 and unique
    /// bindings `l<id>` / `r<id>`.
    pub fn make_roster(n: usize) -> Vec<PlayerSetup> {
        (0..n)
            .map(|i| {
                let id = i as PlayerId + 1;
                PlayerSetup {
                    id,
                    name: format!("Player{id}"),
                    color: PlayerColor::PALETTE[i % PlayerColor::PALETTE.len()],
                    controls: Controls::new(format!("l{id}"), format!("r{id}")),
                }
            })
            .collect()
    }

    /// Keys held for the given seat ids: `left` and/or `right` bindings as
    /// produced by [`make_roster`].
    pub fn hold(ids_left: &[PlayerId], ids_right: &[PlayerId]) -> HeldKeys {
        ids_left
            .iter()
            .map(|id| format!("l{id}"))
            .chain(ids_right.iter().map(|id| format!("r{id}")))
            .collect()
    }

    /// Run N updates with the given keys, returning all accumulated events.
    pub fn run_updates(
        game: &mut dyn ArenaGame,
        n: usize,
        keys: &dyn KeyboardState,
    ) -> Vec<GameEvent> {
        let mut all_events = Vec::new();
        for _ in 0..n {
            all_events.extend(game.update(keys));
        }
        all_events
    }

    // ================================================================
    // Game Trait Contract Tests
    // ================================================================
    // Generic checks every ArenaGame implementation must pass. Game crates
    // call them from their own #[cfg(test)] modules.

    /// After init() with N seats, standings have N entries and the snapshot
    /// is non-empty.
    pub fn contract_init_creates_state(game: &mut dyn ArenaGame, player_count: usize) {
        let roster = make_roster(player_count);
        game.init(&roster)
            .unwrap_or_else(|e| panic!("init with {player_count} seats failed: {e}"));
        assert!(
            !game.serialize_state().is_empty(),
            "serialize_state() must return non-empty bytes after init"
        );
        assert_eq!(game.standings().len(), player_count);
    }

    /// First toggle prepares the round, second starts it.
    pub fn contract_toggle_play_starts_round(game: &mut dyn ArenaGame) {
        assert!(!game.is_playing(), "Game must not start playing on init");
        game.toggle_play();
        assert!(!game.is_playing(), "First toggle only prepares the round");
        game.toggle_play();
        assert!(game.is_playing(), "Second toggle starts the round");
    }

    /// While paused, update() must not change the snapshot; after resuming
    /// it must.
    pub fn contract_pause_stops_updates(game: &mut dyn ArenaGame) {
        if !game.is_playing() {
            contract_toggle_play_starts_round(game);
        }
        game.toggle_play();
        assert!(!game.is_playing(), "Toggle during a round pauses it");

        let before = game.serialize_state();
        game.update(&NoKeys);
        let during_pause = game.serialize_state();
        assert_eq!(before, during_pause, "State must not change while paused");

        game.toggle_play();
        game.update(&NoKeys);
        let after_resume = game.serialize_state();
        assert_ne!(during_pause, after_resume, "State must change after resume");
    }

    /// Running update() enough times must end the round.
    pub fn contract_round_eventually_completes(game: &mut dyn ArenaGame, max_ticks: usize) {
        if !game.is_playing() {
            contract_toggle_play_starts_round(game);
        }
        for _ in 0..max_ticks {
            game.update(&NoKeys);
            if game.is_round_complete() {
                return;
            }
        }
        assert!(
            game.is_round_complete(),
            "Round must complete within {max_ticks} ticks"
        );
    }

    /// Serializing twice without an update yields identical bytes.
    pub fn contract_snapshot_stable(game: &dyn ArenaGame) {
        assert_eq!(
            game.serialize_state(),
            game.serialize_state(),
            "Snapshot must be deterministic"
        );
    }
}
