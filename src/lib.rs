//! Marble Race
//!
//! Checkpoint tracking and live standings for the marble race arcade game,
//! plus a headless game server that rolls marbles down the track.

pub mod error;
pub mod game_server;
pub mod race_engine;

pub use error::RaceError;
pub use game_server::{GameServer, GameState, MarbleRace, RaceConfig, RaceResult, RaceSnapshot};
pub use race_engine::{Checkpoint, CheckpointError, Finisher, RaceEngine, Racer, RacerId, RacerState};
