//! Engine - Checkpoint crossing, finish detection and ranking
//!
//! The caller moves racers, then hands the whole field to [`RaceEngine::update`]
//! once per tick. The engine has exclusive access to the slice for the duration
//! of the call and keeps only racer ids afterwards.

use std::borrow::{Borrow, BorrowMut};
use std::cmp::Ordering;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::checkpoint::{self, Checkpoint, CheckpointError};
use super::racer::{Racer, RacerId};

/// A racer that crossed the finish line
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Finisher {
    pub racer_id: RacerId,
    pub finish_time: f32,
}

/// Tracks checkpoint progress and standings for one race
#[derive(Debug, Clone)]
pub struct RaceEngine {
    checkpoints: Vec<Checkpoint>,
    /// Append-only, in finish order
    finishers: Vec<Finisher>,
    started: Instant,
}

impl RaceEngine {
    /// Create an engine over an ordered checkpoint run
    pub fn new(checkpoints: Vec<Checkpoint>) -> Result<Self, CheckpointError> {
        checkpoint::validate(&checkpoints)?;

        Ok(Self {
            checkpoints,
            finishers: Vec::new(),
            started: Instant::now(),
        })
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn finishers(&self) -> &[Finisher] {
        &self.finishers
    }

    /// Advance the field using seconds elapsed since the engine was created
    pub fn update<R: BorrowMut<Racer>>(&mut self, racers: &mut [R]) {
        let now = self.started.elapsed().as_secs_f32();
        self.update_at(racers, now);
    }

    /// Advance the field, stamping any new finishers with `now`
    pub fn update_at<R: BorrowMut<Racer>>(&mut self, racers: &mut [R], now: f32) {
        for entry in racers.iter_mut() {
            let racer: &mut Racer = entry.borrow_mut();
            self.advance(racer, now);
        }

        racers.sort_by(|a, b| {
            standing_order(Borrow::<Racer>::borrow(a), Borrow::<Racer>::borrow(b))
        });

        for (i, entry) in racers.iter_mut().enumerate() {
            let racer: &mut Racer = entry.borrow_mut();
            racer.rank = i as u32 + 1;
        }
    }

    /// Credit every checkpoint the racer has reached since the last tick
    fn advance(&mut self, racer: &mut Racer, now: f32) {
        while !racer.is_finished() {
            // Past the last gate without a recorded finish: nothing to cross
            let Some(&next) = self.checkpoints.get(racer.current_checkpoint_index) else {
                break;
            };

            // NaN never reaches a gate
            let reached = racer.current_position >= next.position;
            if !reached {
                break;
            }

            racer.current_checkpoint_index += 1;
            log::debug!(
                "Racer {} crossed checkpoint {} at {:.1}",
                racer.id,
                racer.current_checkpoint_index,
                next.position
            );

            if next.is_finish {
                racer.mark_finished(now);
                self.finishers.push(Finisher {
                    racer_id: racer.id,
                    finish_time: now,
                });
                log::info!(
                    "Racer {} finished in place {} at {:.2}s",
                    racer.id,
                    self.finishers.len(),
                    now
                );
            }
        }
    }

    /// First racer of a field already sorted by [`update`](Self::update)
    pub fn leader<R>(racers: &[R]) -> Option<&R> {
        racers.first()
    }

    /// The earliest finisher; fixed once set
    pub fn winner(&self) -> Option<&Finisher> {
        self.finishers.first()
    }

    /// 1-based finishing place of a racer, if it has finished
    pub fn finish_position(&self, racer_id: RacerId) -> Option<usize> {
        self.finishers
            .iter()
            .position(|f| f.racer_id == racer_id)
            .map(|i| i + 1)
    }
}

/// Finished before racing; finishers by time; the rest by gates crossed, then position
fn standing_order(a: &Racer, b: &Racer) -> Ordering {
    match (a.finish_time(), b.finish_time()) {
        (Some(ta), Some(tb)) => ta.total_cmp(&tb),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b
            .current_checkpoint_index
            .cmp(&a.current_checkpoint_index)
            .then_with(|| b.current_position.total_cmp(&a.current_position)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::race_engine::RacerState;

    fn track() -> Vec<Checkpoint> {
        vec![
            Checkpoint::new(10.0),
            Checkpoint::new(20.0),
            Checkpoint::finish(30.0),
        ]
    }

    fn find(racers: &[Racer], id: RacerId) -> &Racer {
        racers.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn rejects_invalid_checkpoints() {
        let err = RaceEngine::new(vec![Checkpoint::new(5.0)]).unwrap_err();
        assert_eq!(err, CheckpointError::NoFinish);
    }

    #[test]
    fn crossing_advances_index() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers = vec![Racer::new(1)];

        racers[0].current_position = 9.9;
        engine.update_at(&mut racers, 0.1);
        assert_eq!(racers[0].current_checkpoint_index, 0);

        racers[0].current_position = 10.0;
        engine.update_at(&mut racers, 0.2);
        assert_eq!(racers[0].current_checkpoint_index, 1);
        assert_eq!(racers[0].rank, 1);
    }

    #[test]
    fn passing_several_gates_in_one_tick_finishes() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers = vec![Racer::at(7, 45.0)];

        engine.update_at(&mut racers, 4.0);

        assert_eq!(racers[0].current_checkpoint_index, 3);
        assert_eq!(racers[0].state, RacerState::Finished { finish_time: 4.0 });
        assert_eq!(engine.winner().map(|w| w.racer_id), Some(7));
    }

    #[test]
    fn finished_racer_is_frozen() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers = vec![Racer::at(1, 30.0)];
        engine.update_at(&mut racers, 1.0);

        racers[0].current_position = 500.0;
        engine.update_at(&mut racers, 2.0);

        assert_eq!(racers[0].finish_time(), Some(1.0));
        assert_eq!(racers[0].current_checkpoint_index, 3);
        assert_eq!(engine.finishers().len(), 1);
    }

    #[test]
    fn index_past_last_checkpoint_is_skipped() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut stray = Racer::at(3, 100.0);
        stray.current_checkpoint_index = 9;
        let mut racers = vec![stray, Racer::at(4, 15.0)];

        engine.update_at(&mut racers, 1.0);

        let stray = find(&racers, 3);
        assert!(!stray.is_finished());
        assert_eq!(stray.current_checkpoint_index, 9);
        assert_eq!(stray.rank, 1);
        assert!(engine.winner().is_none());
    }

    #[test]
    fn finishers_rank_by_time_not_iteration_order() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers = vec![Racer::at(1, 0.0), Racer::at(2, 30.0)];

        engine.update_at(&mut racers, 3.0);
        racers.iter_mut().for_each(|r| r.current_position = 30.0);
        engine.update_at(&mut racers, 5.0);

        assert_eq!(find(&racers, 2).rank, 1);
        assert_eq!(find(&racers, 1).rank, 2);
        assert_eq!(engine.finish_position(1), Some(2));
    }

    #[test]
    fn nan_position_crosses_nothing() {
        let mut engine =
            RaceEngine::new(vec![Checkpoint::new(10.0), Checkpoint::finish(20.0)]).unwrap();
        let mut racers = vec![Racer::at(1, f32::NAN), Racer::at(2, 12.0)];

        engine.update_at(&mut racers, 1.0);

        let lost = find(&racers, 1);
        assert_eq!(lost.current_checkpoint_index, 0);
        assert!(!lost.is_finished());
        assert!(engine.winner().is_none());
        assert_eq!(find(&racers, 2).rank, 1);
    }

    #[test]
    fn leader_of_empty_field_is_none() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers: Vec<Racer> = Vec::new();
        engine.update(&mut racers);
        assert!(RaceEngine::leader(&racers).is_none());
        assert!(engine.winner().is_none());
    }

    #[test]
    fn wall_clock_update_stamps_finish() {
        let mut engine = RaceEngine::new(track()).unwrap();
        let mut racers = vec![Racer::at(1, 31.0)];
        engine.update(&mut racers);
        assert!(racers[0].finish_time().is_some_and(|t| t >= 0.0));
    }
}
