//! Game Server Module
//!
//! Drives a field of marbles down the track and feeds every tick
//! to the race engine for checkpoints and standings.

pub mod marble;
pub mod race;
pub mod simulation;

pub use marble::{Marble, MarbleMotion, MarbleSnapshot};
pub use race::{MarbleRace, RaceConfig, RaceResult, RaceSnapshot, RaceStatus};
pub use simulation::{GameServer, GameState, ServerStats};
