//! Core silo game logic: board representation, timed placement events, and
//! the engine resolving them into board mutations.

mod board;
mod engine;
mod queue;

pub use board::{Board, Cell, Marker, Outcome, COLS, ROWS, SLOT_SCORE};
pub use engine::Engine;
pub use queue::{EventQueue, PendingPlacement};
