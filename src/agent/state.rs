use std::fmt;

use rand::rngs::StdRng;
use rand::Rng;

use crate::game::{Engine, Marker};

/// Paddy rice each seat starts an episode with.
pub const PADDY_RICE_COUNT: u32 = 12;
/// Slowest placement interval a robot can be configured with, in seconds.
pub const MAX_SPEED: f64 = 18.0;
/// Latest possible arrival time in the silo zone, in seconds.
pub const MAX_FREEZE_TIME: f64 = 170.0;
/// Placement success rates observed on real robots.
pub const SUCCESS_RATES: [f64; 4] = [0.7, 0.8, 0.9, 1.0];

/// A proposed move: drop into a column, or hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Stay,
    Drop(usize),
}

impl Action {
    /// Identifier folded into state keys; Stay keeps the -1 sentinel of the
    /// persisted key format.
    pub fn id(self) -> i64 {
        match self {
            Action::Stay => -1,
            Action::Drop(col) => col as i64,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Attributes the caller pins to fixed values; anything left `None` is
/// generated randomly at construction and regenerated on every reset.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentParams {
    pub speed: Option<f64>,
    pub freeze_time: Option<f64>,
    pub success_rate: Option<f64>,
}

/// Per-seat runtime state shared by human and AI agents: physical
/// parameters, rice stock, and placement cooldown.
#[derive(Debug, Clone)]
pub struct AgentState {
    name: String,
    marker: Marker,
    speed: f64,
    freeze_time: f64,
    success_rate: f64,
    paddy_rice: u32,
    next_place_time: f64,
    last_place_col: Option<usize>,
    params: AgentParams,
}

fn generate_speed(rng: &mut StdRng) -> f64 {
    rng.random_range(0..=MAX_SPEED as u32) as f64
}

fn generate_freeze_time(rng: &mut StdRng) -> f64 {
    rng.random_range(0..=MAX_FREEZE_TIME as u32) as f64
}

fn generate_success_rate(rng: &mut StdRng) -> f64 {
    SUCCESS_RATES[rng.random_range(0..SUCCESS_RATES.len())]
}

impl AgentState {
    /// Build a seat's runtime state. Pinned attributes are clamped into
    /// their valid ranges rather than rejected; unpinned ones are drawn
    /// from the shared RNG.
    pub fn new(
        name: impl Into<String>,
        marker: Marker,
        params: AgentParams,
        rng: &mut StdRng,
    ) -> Self {
        AgentState {
            name: name.into(),
            marker,
            speed: params
                .speed
                .map(|s| s.clamp(0.0, MAX_SPEED))
                .unwrap_or_else(|| generate_speed(rng)),
            freeze_time: params
                .freeze_time
                .map(|t| t.clamp(0.0, MAX_FREEZE_TIME))
                .unwrap_or_else(|| generate_freeze_time(rng)),
            success_rate: params
                .success_rate
                .map(|r| r.clamp(SUCCESS_RATES[0], 1.0))
                .unwrap_or_else(|| generate_success_rate(rng)),
            paddy_rice: PADDY_RICE_COUNT,
            next_place_time: 0.0,
            last_place_col: None,
            params,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn marker(&self) -> Marker {
        self.marker
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn freeze_time(&self) -> f64 {
        self.freeze_time
    }

    pub fn success_rate(&self) -> f64 {
        self.success_rate
    }

    pub fn paddy_rice(&self) -> u32 {
        self.paddy_rice
    }

    pub fn last_place_col(&self) -> Option<usize> {
        self.last_place_col
    }

    /// Low-stock alert folded into the learning agent's state key.
    pub fn low_stock(&self) -> bool {
        self.paddy_rice as f64 <= PADDY_RICE_COUNT as f64 * self.success_rate
    }

    /// Legal actions at time `t`. A seat that is frozen (not yet in the
    /// zone), cooling down from its last placement, or out of rice can only
    /// hold; otherwise every open column is offered, then Stay.
    pub fn candidate_actions(&self, engine: &Engine, t: f64) -> Vec<Action> {
        if t < self.freeze_time || t < self.next_place_time || self.paddy_rice == 0 {
            return vec![Action::Stay];
        }
        let mut actions: Vec<Action> = engine
            .available_columns()
            .into_iter()
            .map(Action::Drop)
            .collect();
        actions.push(Action::Stay);
        actions
    }

    /// Commit a decided action. Stay costs nothing. A drop starts the
    /// cooldown, spends one rice, and — only when the Bernoulli success
    /// trial passes — schedules the placement to land when the cooldown
    /// ends.
    pub fn place(&mut self, engine: &mut Engine, action: Action, t: f64, rng: &mut StdRng) {
        let Action::Drop(col) = action else {
            return;
        };

        let time_needed = self.speed;
        self.next_place_time = t + time_needed;

        if rng.random::<f64>() <= self.success_rate {
            engine.schedule(self.marker, col, self.next_place_time);
        }

        self.last_place_col = Some(col);
        self.paddy_rice = self.paddy_rice.saturating_sub(1);
    }

    /// Reset for the next episode: restore rice and cooldown, clear the
    /// move history, and regenerate every attribute the caller did not pin.
    pub fn reset(&mut self, rng: &mut StdRng) {
        self.paddy_rice = PADDY_RICE_COUNT;
        self.next_place_time = 0.0;
        self.last_place_col = None;

        if self.params.speed.is_none() {
            self.speed = generate_speed(rng);
        }
        if self.params.freeze_time.is_none() {
            self.freeze_time = generate_freeze_time(rng);
        }
        if self.params.success_rate.is_none() {
            self.success_rate = generate_success_rate(rng);
        }
    }
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) speed {}, time to zone {}, success rate {:.1}",
            self.name, self.marker, self.speed, self.freeze_time, self.success_rate
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn pinned(speed: f64, freeze: f64, rate: f64) -> AgentParams {
        AgentParams {
            speed: Some(speed),
            freeze_time: Some(freeze),
            success_rate: Some(rate),
        }
    }

    #[test]
    fn test_pinned_attributes_are_clamped() {
        let mut rng = rng();
        let state = AgentState::new(
            "red",
            Marker::Red,
            pinned(25.0, 500.0, 0.5),
            &mut rng,
        );
        assert_eq!(state.speed(), 18.0);
        assert_eq!(state.freeze_time(), 170.0);
        assert_eq!(state.success_rate(), 0.7);

        let state = AgentState::new("red", Marker::Red, pinned(-3.0, -1.0, 1.5), &mut rng);
        assert_eq!(state.speed(), 0.0);
        assert_eq!(state.freeze_time(), 0.0);
        assert_eq!(state.success_rate(), 1.0);
    }

    #[test]
    fn test_generated_attributes_stay_in_range() {
        let mut rng = rng();
        for _ in 0..50 {
            let state = AgentState::new("x", Marker::Blue, AgentParams::default(), &mut rng);
            assert!((0.0..=MAX_SPEED).contains(&state.speed()));
            assert!((0.0..=MAX_FREEZE_TIME).contains(&state.freeze_time()));
            assert!(SUCCESS_RATES.contains(&state.success_rate()));
        }
    }

    #[test]
    fn test_low_stock_threshold() {
        let mut rng = rng();
        // Rate 1.0: 12 <= 12, alert from the very start.
        let state = AgentState::new("x", Marker::Red, pinned(5.0, 0.0, 1.0), &mut rng);
        assert!(state.low_stock());

        // Rate 0.7: threshold 8.4, quiet until rice drops to 8.
        let mut state = AgentState::new("x", Marker::Red, pinned(0.0, 0.0, 0.7), &mut rng);
        assert!(!state.low_stock());
        let mut engine = Engine::new();
        for i in 0..4 {
            state.place(&mut engine, Action::Drop(i % 5), 0.0, &mut rng);
        }
        assert_eq!(state.paddy_rice(), 8);
        assert!(state.low_stock());
    }

    #[test]
    fn test_frozen_seat_can_only_stay() {
        let mut rng = rng();
        let state = AgentState::new("x", Marker::Red, pinned(2.0, 30.0, 1.0), &mut rng);
        let engine = Engine::new();
        assert_eq!(state.candidate_actions(&engine, 10.0), vec![Action::Stay]);
        assert_eq!(state.candidate_actions(&engine, 30.0).len(), 6);
    }

    #[test]
    fn test_cooldown_gates_candidates() {
        let mut rng = rng();
        let mut state = AgentState::new("x", Marker::Red, pinned(5.0, 0.0, 1.0), &mut rng);
        let mut engine = Engine::new();

        state.place(&mut engine, Action::Drop(2), 10.0, &mut rng);
        assert_eq!(state.candidate_actions(&engine, 12.0), vec![Action::Stay]);
        // Cooldown expires exactly at t + speed.
        assert_eq!(state.candidate_actions(&engine, 15.0).len(), 6);
    }

    #[test]
    fn test_depleted_seat_can_only_stay() {
        let mut rng = rng();
        let mut state = AgentState::new("x", Marker::Red, pinned(0.0, 0.0, 1.0), &mut rng);
        let mut engine = Engine::new();
        for i in 0..PADDY_RICE_COUNT {
            state.place(&mut engine, Action::Drop(i as usize % 5), 0.0, &mut rng);
        }
        assert_eq!(state.paddy_rice(), 0);
        assert_eq!(state.candidate_actions(&engine, 100.0), vec![Action::Stay]);
    }

    #[test]
    fn test_place_spends_rice_and_schedules_on_success() {
        let mut rng = rng();
        let mut state = AgentState::new("x", Marker::Red, pinned(4.0, 0.0, 1.0), &mut rng);
        let mut engine = Engine::new();

        state.place(&mut engine, Action::Drop(3), 10.0, &mut rng);
        assert_eq!(state.paddy_rice(), PADDY_RICE_COUNT - 1);
        assert_eq!(state.last_place_col(), Some(3));
        // Rate 1.0 always schedules; the event lands at t + speed.
        assert!(!engine.advance(13.9, &mut rng));
        assert!(engine.advance(14.0, &mut rng));
        assert_eq!(engine.scores().get(&Marker::Red), Some(&30));
    }

    #[test]
    fn test_stay_is_free() {
        let mut rng = rng();
        let mut state = AgentState::new("x", Marker::Red, pinned(4.0, 0.0, 1.0), &mut rng);
        let mut engine = Engine::new();

        state.place(&mut engine, Action::Stay, 10.0, &mut rng);
        assert_eq!(state.paddy_rice(), PADDY_RICE_COUNT);
        assert_eq!(state.last_place_col(), None);
        assert!(!engine.advance(100.0, &mut rng));
    }

    #[test]
    fn test_reset_regenerates_only_unpinned() {
        let mut rng = rng();
        let params = AgentParams {
            speed: Some(6.0),
            freeze_time: None,
            success_rate: Some(0.8),
        };
        let mut state = AgentState::new("x", Marker::Blue, params, &mut rng);
        let mut engine = Engine::new();
        state.place(&mut engine, Action::Drop(0), 50.0, &mut rng);

        state.reset(&mut rng);
        assert_eq!(state.paddy_rice(), PADDY_RICE_COUNT);
        assert_eq!(state.last_place_col(), None);
        assert_eq!(state.speed(), 6.0);
        assert_eq!(state.success_rate(), 0.8);
        assert!((0.0..=MAX_FREEZE_TIME).contains(&state.freeze_time()));
        assert_eq!(state.candidate_actions(&engine, 171.0).len(), 6);
    }
}
