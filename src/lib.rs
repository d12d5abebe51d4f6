//! # ML Silo
//!
//! A simulator for the Robocon 2024 silo placement game with a tabular
//! reinforcement-learning agent. Two teams race to drop paddy rice into a
//! 5-column silo rack; placements take real time to land, so the board is
//! driven by a timed event queue rather than alternating turns.
//!
//! ## Modules
//!
//! - [`game`] — Board, timed event queue, and the engine resolving them
//! - [`agent`] — Agent runtime state, learning agent, human agent
//! - [`policy`] — Per-profile value tables and file persistence
//! - [`training`] — Match runner, trainer, metrics collection
//! - [`config`] — TOML configuration loading and validation
//! - [`error`] — Structured error types

pub mod agent;
pub mod config;
pub mod error;
pub mod game;
pub mod policy;
pub mod training;
