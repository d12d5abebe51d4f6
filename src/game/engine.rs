use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;

use super::queue::EventQueue;
use super::{Board, Marker, Outcome};

/// The board engine: owns the silo rack and the queue of in-flight
/// placements, and resolves due events into board mutations as simulated
/// time advances.
#[derive(Debug, Default)]
pub struct Engine {
    board: Board,
    queue: EventQueue,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Queue a placement to land at `due_time`. Availability is not checked
    /// here; a column that fills up in the meantime absorbs the event as a
    /// no-op at resolution.
    pub fn schedule(&mut self, marker: Marker, column: usize, due_time: f64) {
        self.queue.push(marker, column, due_time);
    }

    /// Resolve every event due at `now`. Returns whether any event resolved
    /// during the call, the signal the presentation layer uses to re-render.
    ///
    /// When the two earliest events share a due time the slot is contested:
    /// the committed column is always the first-popped event's, and only the
    /// marker is drawn uniformly between the two contenders. A third
    /// simultaneous event is resolved on a later loop iteration.
    pub fn advance(&mut self, now: f64, rng: &mut StdRng) -> bool {
        let mut resolved = false;
        while let Some(event) = self.queue.pop_due(now) {
            let mut marker = event.marker;
            if let Some(next) = self.queue.peek() {
                if next.due_time == event.due_time {
                    let rival = self.queue.pop().expect("peeked event must pop");
                    let contenders = [rival.marker, event.marker];
                    marker = contenders[rng.random_range(0..contenders.len())];
                }
            }
            self.board.place(event.column, marker);
            resolved = true;
        }
        resolved
    }

    /// Terminal state of the board, polled by the driver each tick.
    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    pub fn scores(&self) -> BTreeMap<Marker, u32> {
        self.board.score_by_marker()
    }

    pub fn available_columns(&self) -> Vec<usize> {
        self.board.available_columns()
    }

    #[cfg(test)]
    pub(crate) fn pending_events(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Cell;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_due_event_lands_on_board() {
        let mut engine = Engine::new();
        let mut rng = rng();
        engine.schedule(Marker::Red, 2, 1.5);

        assert!(!engine.advance(1.0, &mut rng));
        assert_eq!(engine.board().get(2, 0), Cell::Empty);

        assert!(engine.advance(1.5, &mut rng));
        assert_eq!(engine.board().get(2, 0), Cell::Red);
        assert_eq!(engine.pending_events(), 0);
    }

    #[test]
    fn test_advance_drains_all_due_events() {
        let mut engine = Engine::new();
        let mut rng = rng();
        engine.schedule(Marker::Red, 0, 1.0);
        engine.schedule(Marker::Blue, 1, 2.0);
        engine.schedule(Marker::Red, 2, 9.0);

        assert!(engine.advance(5.0, &mut rng));
        assert_eq!(engine.board().get(0, 0), Cell::Red);
        assert_eq!(engine.board().get(1, 0), Cell::Blue);
        assert_eq!(engine.board().get(2, 0), Cell::Empty);
        assert_eq!(engine.pending_events(), 1);
    }

    #[test]
    fn test_collision_commits_one_placement_on_first_column() {
        let mut rng = rng();
        for _ in 0..100 {
            let mut engine = Engine::new();
            engine.schedule(Marker::Red, 0, 3.0);
            engine.schedule(Marker::Blue, 4, 3.0);
            engine.advance(3.0, &mut rng);

            // Exactly one placement, always in the first-scheduled column.
            assert_eq!(engine.board().get(4, 0), Cell::Empty);
            assert_ne!(engine.board().get(0, 0), Cell::Empty);
            assert_eq!(engine.scores().values().sum::<u32>(), 30);
        }
    }

    #[test]
    fn test_collision_marker_is_roughly_fair() {
        let mut rng = rng();
        let mut red_wins = 0;
        let trials = 1000;
        for _ in 0..trials {
            let mut engine = Engine::new();
            engine.schedule(Marker::Red, 0, 3.0);
            engine.schedule(Marker::Blue, 1, 3.0);
            engine.advance(3.0, &mut rng);
            if engine.board().get(0, 0) == Cell::Red {
                red_wins += 1;
            }
        }
        assert!(
            (400..=600).contains(&red_wins),
            "expected roughly fair marker draw, red won {red_wins}/{trials}"
        );
    }

    #[test]
    fn test_three_simultaneous_events_commit_two_placements() {
        let mut engine = Engine::new();
        let mut rng = rng();
        engine.schedule(Marker::Red, 0, 3.0);
        engine.schedule(Marker::Blue, 1, 3.0);
        engine.schedule(Marker::Red, 2, 3.0);
        engine.advance(3.0, &mut rng);

        // First pair collapses into column 0, the straggler lands alone.
        assert_ne!(engine.board().get(0, 0), Cell::Empty);
        assert_eq!(engine.board().get(1, 0), Cell::Empty);
        assert_eq!(engine.board().get(2, 0), Cell::Red);
        assert_eq!(engine.scores().values().sum::<u32>(), 60);
    }

    #[test]
    fn test_resolution_into_full_column_is_a_noop() {
        let mut engine = Engine::new();
        let mut rng = rng();
        for _ in 0..3 {
            engine.schedule(Marker::Blue, 0, 1.0);
            engine.advance(1.0, &mut rng);
        }
        engine.schedule(Marker::Red, 0, 2.0);
        // The event still resolves (and reports), but the board is unchanged.
        assert!(engine.advance(2.0, &mut rng));
        assert_eq!(engine.scores().get(&Marker::Red), None);
        assert_eq!(engine.scores().get(&Marker::Blue), Some(&90));
    }
}
