//! Race Engine Module
//!
//! Checkpoint tracking and live standings for the marble race.

pub mod checkpoint;
pub mod engine;
pub mod racer;

pub use checkpoint::{Checkpoint, CheckpointError};
pub use engine::{Finisher, RaceEngine};
pub use racer::{Racer, RacerId, RacerState};
