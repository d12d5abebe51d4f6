use std::cmp::Ordering;
use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::Rng;

use crate::game::{Engine, Marker, Outcome};
use crate::policy::PolicyStore;

use super::encoding::{profile_key, state_key};
use super::state::{Action, AgentParams, AgentState};
use super::Agent;

/// Step size of the tabular value update.
const LEARNING_RATE: f64 = 0.2;
/// Discount applied to the propagated reward at each step back.
const DECAY_GAMMA: f64 = 0.9;
/// Penalty for ending an episode without a single slot on the board.
const NO_PLACEMENT_PENALTY: f64 = -999.0;

/// The tabular RL seat: greedy/ε-random action selection over its profile's
/// value table, with end-of-episode reward backpropagation. The policy
/// store itself is owned by the harness and passed in by reference.
pub struct LearningAgent {
    state: AgentState,
    random_rate: f64,
    visited: Vec<String>,
}

impl LearningAgent {
    /// `random_rate` is the exploration probability, used during training
    /// only; pass 0 for evaluation/play. Out-of-range values are clamped.
    pub fn new(
        name: impl Into<String>,
        marker: Marker,
        random_rate: f64,
        params: AgentParams,
        policies: &mut PolicyStore,
        rng: &mut StdRng,
    ) -> Self {
        let agent = LearningAgent {
            state: AgentState::new(name, marker, params, rng),
            random_rate: random_rate.clamp(0.0, 1.0),
            visited: Vec::new(),
        };
        policies.ensure_profile(&agent.profile());
        agent
    }

    /// Policy partition this agent reads from and learns into.
    pub fn profile(&self) -> String {
        profile_key(self.state.speed(), self.state.success_rate())
    }

    pub fn visited_states(&self) -> &[String] {
        &self.visited
    }

    fn key_for(&self, engine: &Engine, action: Action) -> String {
        state_key(
            engine.board(),
            self.state.marker(),
            self.state.low_stock(),
            action,
        )
    }

    /// Compute the episode's base reward and propagate it backwards through
    /// the visited states, mutating the profile's table in place. Returns
    /// the base reward for tallying.
    pub fn feed_reward(
        &mut self,
        outcome: &Outcome,
        scores: &BTreeMap<Marker, u32>,
        policies: &mut PolicyStore,
    ) -> f64 {
        let me = self.state.marker();

        let base = if !scores.contains_key(&me) {
            NO_PLACEMENT_PENALTY
        } else if *outcome == Outcome::Win(me) {
            10.0
        } else if matches!(outcome, Outcome::Draw | Outcome::Ongoing) {
            let own = scores[&me];
            // Alone on the scoreboard counts as overwhelming.
            let mut reward = 2.0;
            for (&marker, &score) in scores {
                if marker == me {
                    continue;
                }
                // Each opponent comparison overwrites the previous one.
                reward = match own.cmp(&score) {
                    Ordering::Greater => 2.0,
                    Ordering::Less => -2.0,
                    Ordering::Equal => 1.0,
                };
            }
            reward
        } else {
            -10.0
        };

        let table = policies.table_mut(&self.profile());
        let mut reward = base;
        for key in self.visited.iter().rev() {
            let value = table.entry(key.clone()).or_insert(0.0);
            *value += LEARNING_RATE * (DECAY_GAMMA * reward - *value);
            reward = *value;
        }

        base
    }

    /// Prepare for the next episode. The visited history and runtime state
    /// go; the policy table stays. Regenerated attributes may land on a new
    /// profile, which is created on the spot if missing.
    pub fn reset(&mut self, policies: &mut PolicyStore, rng: &mut StdRng) {
        self.visited.clear();
        self.state.reset(rng);
        policies.ensure_profile(&self.profile());
    }
}

impl Agent for LearningAgent {
    fn state(&self) -> &AgentState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut AgentState {
        &mut self.state
    }

    fn propose_move(
        &mut self,
        engine: &Engine,
        t: f64,
        policies: &PolicyStore,
        rng: &mut StdRng,
    ) -> Action {
        let actions = self.state.candidate_actions(engine, t);
        // A lone Stay means the seat cannot act; nothing worth recording.
        if actions.len() <= 1 {
            return Action::Stay;
        }

        let chosen = if rng.random::<f64>() <= self.random_rate {
            actions[rng.random_range(0..actions.len())]
        } else {
            let profile = self.profile();
            let mut best_value = f64::NEG_INFINITY;
            let mut best = Action::Stay;
            for &action in &actions {
                let value = policies.value(&profile, &self.key_for(engine, action));
                // >= : equal values defer to the later candidate.
                if value >= best_value {
                    best_value = value;
                    best = action;
                }
            }
            best
        };

        let key = self.key_for(engine, chosen);
        self.visited.push(key);
        chosen
    }
}
