use std::collections::{BTreeMap, VecDeque};

use crate::game::Marker;

/// Win/draw/loss counts for one seat, classified from base rewards.
#[derive(Debug, Clone, Copy, Default)]
pub struct SeatTally {
    pub wins: u64,
    pub draws: u64,
    pub losses: u64,
}

impl SeatTally {
    pub fn episodes(&self) -> u64 {
        self.wins + self.draws + self.losses
    }
}

/// Training metrics tracker: lifetime tallies per seat plus a rolling
/// window of base rewards for the progress line.
pub struct TrainingMetrics {
    tallies: BTreeMap<Marker, SeatTally>,
    recent: BTreeMap<Marker, VecDeque<f64>>,
    capacity: usize,
}

impl TrainingMetrics {
    pub fn with_capacity(capacity: usize) -> Self {
        TrainingMetrics {
            tallies: BTreeMap::new(),
            recent: BTreeMap::new(),
            capacity,
        }
    }

    pub fn new() -> Self {
        Self::with_capacity(100)
    }

    /// Record one episode's base reward for a seat. A reward of exactly 1
    /// is a draw, above 1 a win, anything else a loss (including the -999
    /// no-placement penalty).
    pub fn record_reward(&mut self, marker: Marker, reward: f64) {
        let tally = self.tallies.entry(marker).or_default();
        if reward == 1.0 {
            tally.draws += 1;
        } else if reward > 1.0 {
            tally.wins += 1;
        } else {
            tally.losses += 1;
        }

        let recent = self.recent.entry(marker).or_default();
        recent.push_back(reward);
        if recent.len() > self.capacity {
            recent.pop_front();
        }
    }

    pub fn tally(&self, marker: Marker) -> SeatTally {
        self.tallies.get(&marker).copied().unwrap_or_default()
    }

    /// Mean base reward over the last N recorded episodes for a seat.
    pub fn average_reward(&self, marker: Marker, last_n: usize) -> f64 {
        let Some(recent) = self.recent.get(&marker) else {
            return 0.0;
        };
        let n = recent.len().min(last_n);
        if n == 0 {
            return 0.0;
        }
        let sum: f64 = recent.iter().rev().take(n).sum();
        sum / n as f64
    }

    /// Episodes recorded so far (seats are fed once per episode each).
    pub fn total_episodes(&self) -> u64 {
        self.tallies
            .values()
            .map(SeatTally::episodes)
            .max()
            .unwrap_or(0)
    }
}

impl Default for TrainingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reward_classification() {
        let mut m = TrainingMetrics::new();
        m.record_reward(Marker::Red, 10.0); // win
        m.record_reward(Marker::Red, 2.0); // win
        m.record_reward(Marker::Red, 1.0); // draw
        m.record_reward(Marker::Red, -2.0); // loss
        m.record_reward(Marker::Red, -999.0); // loss

        let tally = m.tally(Marker::Red);
        assert_eq!(tally.wins, 2);
        assert_eq!(tally.draws, 1);
        assert_eq!(tally.losses, 2);
        assert_eq!(tally.episodes(), 5);
    }

    #[test]
    fn test_average_reward_window() {
        let mut m = TrainingMetrics::new();
        for reward in [10.0, 2.0, -2.0, 2.0] {
            m.record_reward(Marker::Blue, reward);
        }
        assert!((m.average_reward(Marker::Blue, 4) - 3.0).abs() < 1e-9);
        // Window smaller than history: only the newest entries count.
        assert!((m.average_reward(Marker::Blue, 2) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn test_unseen_marker_is_empty() {
        let m = TrainingMetrics::new();
        assert_eq!(m.tally(Marker::Red).episodes(), 0);
        assert_eq!(m.average_reward(Marker::Red, 10), 0.0);
        assert_eq!(m.total_episodes(), 0);
    }

    #[test]
    fn test_rolling_window_caps_history() {
        let mut m = TrainingMetrics::with_capacity(3);
        for _ in 0..10 {
            m.record_reward(Marker::Red, -2.0);
        }
        m.record_reward(Marker::Red, 2.0);
        // Only the last 3 rewards remain: [-2, -2, 2].
        assert!((m.average_reward(Marker::Red, 100) - (-2.0 / 3.0)).abs() < 1e-9);
        // Lifetime tallies are never capped.
        assert_eq!(m.tally(Marker::Red).episodes(), 11);
    }
}
