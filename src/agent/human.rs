use std::io::{self, BufRead, Write};

use rand::rngs::StdRng;

use crate::game::{Engine, Marker};
use crate::policy::PolicyStore;

use super::state::{Action, AgentParams, AgentState};
use super::Agent;

/// A console-controlled seat. Shares the same runtime rules as the AI seat
/// (freeze, cooldown, rice stock, success trials); only the decision comes
/// from stdin.
pub struct HumanAgent {
    state: AgentState,
}

impl HumanAgent {
    pub fn new(
        name: impl Into<String>,
        marker: Marker,
        params: AgentParams,
        rng: &mut StdRng,
    ) -> Self {
        HumanAgent {
            state: AgentState::new(name, marker, params, rng),
        }
    }
}

/// Validate one line of console input against the offered actions. An empty
/// line means Stay; otherwise the value must parse and be one of the
/// offered action ids (-1 for Stay, or an open column).
pub fn parse_choice(line: &str, actions: &[Action]) -> Option<Action> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Some(Action::Stay);
    }
    let id: i64 = trimmed.parse().ok()?;
    actions.iter().copied().find(|action| action.id() == id)
}

impl Agent for HumanAgent {
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
        _policies: &PolicyStore,
        _rng: &mut StdRng,
    ) -> Action {
        let actions = self.state.candidate_actions(engine, t);
        if actions.len() <= 1 {
            return Action::Stay;
        }

        let ids: Vec<i64> = actions.iter().map(|a| a.id()).collect();
        println!(
            "{} ({}) available actions {:?} at time {:.1} (remaining: {})",
            self.state.name(),
            self.state.marker(),
            ids,
            t,
            self.state.paddy_rice()
        );

        let stdin = io::stdin();
        loop {
            print!("Please input column (-1 to stay): ");
            let _ = io::stdout().flush();

            let mut line = String::new();
            match stdin.lock().read_line(&mut line) {
                // EOF: treat like an empty answer rather than looping.
                Ok(0) => return Action::Stay,
                Ok(_) => {}
                Err(_) => return Action::Stay,
            }

            match parse_choice(&line, &actions) {
                Some(action) => return action,
                None => println!("Invalid input! Available actions: {ids:?}"),
            }
        }
    }
}
