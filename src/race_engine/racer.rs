//! Racer - Progress state the engine reads and updates
//!
//! Movement is owned by the caller; the engine only touches the
//! checkpoint index, finish state and rank.

use serde::{Deserialize, Serialize};

/// Stable racer identifier
pub type RacerId = u32;

/// Racing or finished; a racer finishes at most once
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RacerState {
    Racing,
    Finished { finish_time: f32 },
}

/// Progress of one participant along the race axis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Racer {
    pub id: RacerId,
    /// Current progress, written by the caller before each update
    pub current_position: f32,
    /// Index of the next checkpoint to cross
    pub current_checkpoint_index: usize,
    pub state: RacerState,
    /// 1-based standing, 0 until the first update
    pub rank: u32,
}

impl Racer {
    pub fn new(id: RacerId) -> Self {
        Self::at(id, 0.0)
    }

    /// Create a racer at a given starting position
    pub fn at(id: RacerId, position: f32) -> Self {
        Self {
            id,
            current_position: position,
            current_checkpoint_index: 0,
            state: RacerState::Racing,
            rank: 0,
        }
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RacerState::Finished { .. })
    }

    pub fn finish_time(&self) -> Option<f32> {
        match self.state {
            RacerState::Finished { finish_time } => Some(finish_time),
            RacerState::Racing => None,
        }
    }

    pub(crate) fn mark_finished(&mut self, finish_time: f32) {
        debug_assert!(!self.is_finished());
        self.state = RacerState::Finished { finish_time };
    }
}
