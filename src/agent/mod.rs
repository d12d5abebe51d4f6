//! Agents occupying the two seats of a match: shared runtime state, the
//! learning (tabular RL) seat, and the console-controlled human seat.

pub mod encoding;
mod human;
mod learner;
mod state;

pub use human::{parse_choice, HumanAgent};
pub use learner::LearningAgent;
pub use state::{
    Action, AgentParams, AgentState, MAX_FREEZE_TIME, MAX_SPEED, PADDY_RICE_COUNT, SUCCESS_RATES,
};

use rand::rngs::StdRng;

use crate::game::Engine;
use crate::policy::PolicyStore;

/// The one capability a seat must provide: propose an action against the
/// current engine snapshot. Human and automated seats implement the same
/// contract; everything else (cooldown, rice accounting, placement trials)
/// lives in the shared [`AgentState`].
pub trait Agent {
    fn state(&self) -> &AgentState;

    fn state_mut(&mut self) -> &mut AgentState;

    fn propose_move(
        &mut self,
        engine: &Engine,
        t: f64,
        policies: &PolicyStore,
        rng: &mut StdRng,
    ) -> Action;
}
