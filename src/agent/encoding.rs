//! Keys into the tabular policy: the per-decision state key and the
//! per-seat profile partition key.

use crate::game::{Board, Marker};

use super::state::Action;

/// Policy lookup key for one decision: the board hash from the deciding
/// side's perspective, the low-stock flag, and the action under
/// consideration.
pub fn state_key(board: &Board, owner: Marker, low_stock: bool, action: Action) -> String {
    format!("{}-{}-{}", board.hash(owner), low_stock, action.id())
}

/// Policy partition key. Seats with identical (speed, success rate) share
/// learned values; differing seats never cross-pollute.
pub fn profile_key(speed: f64, success_rate: f64) -> String {
    format!("S{}_R{:.1}", speed as i64, success_rate)
}
