use serde::{Deserialize, Serialize};

use kurve_core::game_trait::{PlayerId, PlayerScore};
use kurve_core::player::PlayerColor;

use crate::player::Player;

/// Award one point to every living player after a death. Nothing is awarded
/// when nobody is alive or nobody has died. Returns the updated scores.
pub fn award_survivors(players: &mut [Player]) -> Vec<PlayerScore> {
    let alive = players.iter().filter(|p| p.alive).count();
    if alive == 0 || alive == players.len() {
        return Vec::new();
    }
    players
        .iter_mut()
        .filter(|p| p.alive)
        .map(|p| {
            p.score += 1;
            PlayerScore {
                player_id: p.id,
                score: p.score,
            }
        })
        .collect()
}

/// Whether the leader has reached `target` with at least `margin` over
/// second place. Fewer than two players never produce a winner.
pub fn has_winner(scores: &[u32], target: u32, margin: u32) -> bool {
    if scores.len() < 2 {
        return false;
    }
    let mut sorted = scores.to_vec();
    sorted.sort_unstable_by(|a, b| b.cmp(a));
    sorted[0] >= target && sorted[0] - sorted[1] >= margin
}

/// The leading player, if the winning condition holds.
pub fn winner(players: &[Player], target: u32, margin: u32) -> Option<PlayerId> {
    let scores: Vec<u32> = players.iter().map(|p| p.score).collect();
    if !has_winner(&scores, target, margin) {
        return None;
    }
    players.iter().max_by_key(|p| p.score).map(|p| p.id)
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub player_id: PlayerId,
    pub name: String,
    pub color: PlayerColor,
    pub score: u32,
    pub alive: bool,
}

/// Standings sorted by score, highest first, with the goal to reach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub rows: Vec<ScoreRow>,
    pub target_score: u32,
    pub winning_margin: u32,
}

impl Scoreboard {
    pub fn build(players: &[Player], target_score: u32, winning_margin: u32) -> Self {
        let mut rows: Vec<ScoreRow> = players
            .iter()
            .map(|p| ScoreRow {
                player_id: p.id,
                name: p.name.clone(),
                color: p.color,
                score: p.score,
                alive: p.alive,
            })
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        Self {
            rows,
            target_score,
            winning_margin,
        }
    }
}

#[cfg(test)]
mod tests {
    use kurve_core::test_helpers::make_roster;

    use super::*;
    use crate::config::ArenaConfig;

    fn roster(n: usize) -> Vec<Player> {
        let config = ArenaConfig::default();
        make_roster(n)
            .iter()
            .map(|s| Player::new(s, &config))
            .collect()
    }

    #[test]
    fn margin_of_two_wins() {
        assert!(has_winner(&[10, 8, 8], 10, 2));
    }

    #[test]
    fn margin_of_one_does_not_win() {
        assert!(!has_winner(&[10, 9, 8], 10, 2));
    }

    #[test]
    fn below_target_does_not_win() {
        assert!(!has_winner(&[9, 0, 0], 10, 2));
    }

    #[test]
    fn order_does_not_matter() {
        assert!(has_winner(&[8, 12, 3], 10, 2));
    }

    #[test]
    fn degenerate_rosters_never_win() {
        assert!(!has_winner(&[], 0, 2));
        assert!(!has_winner(&[50], 10, 2));
    }

    #[test]
    fn every_survivor_scores_on_a_death() {
        let mut players = roster(4);
        players[2].alive = false;
        let updates = award_survivors(&mut players);
        assert_eq!(updates.len(), 3);
        assert_eq!(
            players.iter().map(|p| p.score).collect::<Vec<_>>(),
            vec![1, 1, 0, 1]
        );
    }

    #[test]
    fn no_points_when_all_alive_or_all_dead() {
        let mut players = roster(3);
        assert!(award_survivors(&mut players).is_empty());
        for p in &mut players {
            p.alive = false;
        }
        assert!(award_survivors(&mut players).is_empty());
        assert!(players.iter().all(|p| p.score == 0));
    }

    #[test]
    fn winner_is_leader() {
        let mut players = roster(3);
        players[1].score = 12;
        players[0].score = 9;
        assert_eq!(winner(&players, 10, 2), Some(2));
        players[0].score = 11;
        assert_eq!(winner(&players, 10, 2), None);
    }

    #[test]
    fn scoreboard_sorted_descending() {
        let mut players = roster(3);
        players[0].score = 1;
        players[2].score = 5;
        let board = Scoreboard::build(&players, 20, 2);
        let ids: Vec<_> = board.rows.iter().map(|r| r.player_id).collect();
        assert_eq!(ids, vec![3, 1, 2]);
        assert_eq!(board.target_score, 20);
    }
}
