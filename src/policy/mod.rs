//! Per-profile value tables and their file-based persistence.

mod store;

pub use store::{parse_policy_filename, policy_filename, PolicyStore, PolicyTable};
