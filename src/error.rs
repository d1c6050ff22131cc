//! Error types for race setup and the game server.

use crate::race_engine::CheckpointError;

/// Errors raised while configuring or driving a race
#[derive(Debug, thiserror::Error)]
pub enum RaceError {
    /// The configured track produced an unusable checkpoint run.
    #[error("invalid checkpoints: {0}")]
    Checkpoints(#[from] CheckpointError),

    /// A config value is out of range.
    #[error("invalid race config: {0}")]
    InvalidConfig(String),

    /// Failed to read a config file.
    #[error("failed to read race config: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse a config file.
    #[error("failed to parse race config: {0}")]
    Parse(#[from] serde_json::Error),

    /// An operation needed a race but none was initialized.
    #[error("no race has been initialized")]
    NoRace,
}
