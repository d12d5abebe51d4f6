use std::path::PathBuf;

use crate::game::Marker;

/// Errors raised by game construction and roster validation.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("board must have 5 columns, got {0}")]
    BadColumnCount(usize),

    #[error("column {column} must have 3 rows, got {rows}")]
    BadRowCount { column: usize, rows: usize },

    #[error("both seats use the {0} marker")]
    DuplicateMarker(Marker),
}

/// Errors that can occur while loading or saving policy tables.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error("failed to read policy file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse policy file {path}: {source}")]
    FileParse {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("failed to write policy file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors that can occur during a training run.
#[derive(Debug, thiserror::Error)]
pub enum TrainingError {
    #[error(transparent)]
    Game(#[from] GameError),

    #[error("policy save failed: {0}")]
    Policy(#[from] PolicyError),
}

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("config validation error: {0}")]
    Validation(String),
}
