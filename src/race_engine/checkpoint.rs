//! Checkpoint - Gates along the race axis
//!
//! A race is an ordered run of checkpoints; the last one is the finish line.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single gate on the race axis
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Position along the race axis
    pub position: f32,
    /// Whether crossing this gate finishes the race
    pub is_finish: bool,
}

impl Checkpoint {
    pub fn new(position: f32) -> Self {
        Self {
            position,
            is_finish: false,
        }
    }

    pub fn finish(position: f32) -> Self {
        Self {
            position,
            is_finish: true,
        }
    }
}

/// Reasons a checkpoint sequence is rejected at engine construction
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CheckpointError {
    #[error("a race needs at least one checkpoint")]
    Empty,

    #[error("checkpoint {index} has a non-finite position")]
    NonFinite { index: usize },

    #[error("checkpoint {index} at {position} does not come after {previous}")]
    NotAscending {
        index: usize,
        position: f32,
        previous: f32,
    },

    #[error("no checkpoint is flagged as the finish")]
    NoFinish,

    #[error("checkpoint {index} is flagged as a finish but is not the last one")]
    FinishNotLast { index: usize },
}

/// Check the ordering and finish-flag preconditions of a checkpoint run
pub fn validate(checkpoints: &[Checkpoint]) -> Result<(), CheckpointError> {
    let last = checkpoints.len().checked_sub(1).ok_or(CheckpointError::Empty)?;

    for (index, checkpoint) in checkpoints.iter().enumerate() {
        if !checkpoint.position.is_finite() {
            return Err(CheckpointError::NonFinite { index });
        }

        if index > 0 {
            let previous = checkpoints[index - 1].position;
            if checkpoint.position <= previous {
                return Err(CheckpointError::NotAscending {
                    index,
                    position: checkpoint.position,
                    previous,
                });
            }
        }

        if checkpoint.is_finish && index != last {
            return Err(CheckpointError::FinishNotLast { index });
        }
    }

    if !checkpoints[last].is_finish {
        return Err(CheckpointError::NoFinish);
    }

    Ok(())
}

/// Lay out `count` evenly spaced gates ending at `length`, the last being the finish
pub fn evenly_spaced(length: f32, count: usize) -> Vec<Checkpoint> {
    let count = count.max(1);
    let spacing = length / count as f32;

    (1..=count)
        .map(|i| {
            if i == count {
                Checkpoint::finish(length)
            } else {
                Checkpoint::new(spacing * i as f32)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ascending_run_with_trailing_finish() {
        let run = [
            Checkpoint::new(10.0),
            Checkpoint::new(20.0),
            Checkpoint::finish(30.0),
        ];
        assert_eq!(validate(&run), Ok(()));
    }

    #[test]
    fn rejects_empty_run() {
        assert_eq!(validate(&[]), Err(CheckpointError::Empty));
    }

    #[test]
    fn rejects_out_of_order_positions() {
        let run = [
            Checkpoint::new(10.0),
            Checkpoint::new(10.0),
            Checkpoint::finish(30.0),
        ];
        assert_eq!(
            validate(&run),
            Err(CheckpointError::NotAscending {
                index: 1,
                position: 10.0,
                previous: 10.0,
            })
        );
    }

    #[test]
    fn rejects_missing_or_misplaced_finish() {
        let no_finish = [Checkpoint::new(10.0), Checkpoint::new(20.0)];
        assert_eq!(validate(&no_finish), Err(CheckpointError::NoFinish));

        let early_finish = [Checkpoint::finish(10.0), Checkpoint::finish(20.0)];
        assert_eq!(
            validate(&early_finish),
            Err(CheckpointError::FinishNotLast { index: 0 })
        );
    }

    #[test]
    fn rejects_nan_position() {
        let run = [Checkpoint::new(f32::NAN), Checkpoint::finish(20.0)];
        assert_eq!(validate(&run), Err(CheckpointError::NonFinite { index: 0 }));
    }

    #[test]
    fn evenly_spaced_ends_on_finish() {
        let run = evenly_spaced(1000.0, 4);
        assert_eq!(run.len(), 4);
        assert_eq!(run[0], Checkpoint::new(250.0));
        assert_eq!(run[3], Checkpoint::finish(1000.0));
        assert_eq!(validate(&run), Ok(()));
    }
}
