//! Simulation - Headless server driving one marble race at a time
//!
//! Owns the active race, advances it by wall-clock or fixed steps,
//! and keeps a rolling window of tick timings.

use std::collections::VecDeque;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::game_server::race::{MarbleRace, RaceConfig, RaceResult, RaceSnapshot, RaceStatus};

/// Number of recent ticks averaged in [`ServerStats`]
const TICK_HISTORY: usize = 60;

/// Where the server is in the race lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    Idle,
    Ready,
    Racing,
    Results,
}

/// Tick timing and field size
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerStats {
    pub avg_tick_time_ms: f32,
    pub ticks: u64,
    pub marble_count: u32,
    pub game_state: GameState,
}

/// Drives the active race and tracks lifecycle and timings
pub struct GameServer {
    state: GameState,
    race: Option<MarbleRace>,
    /// When `tick` last ran; the next wall-clock delta starts here
    last_tick: Instant,
    /// Recent tick durations (ms)
    tick_times: VecDeque<f32>,
    /// Ticks simulated since the race was initialized
    ticks: u64,
    /// Cleared by pause and by the race finishing
    running: bool,
}

impl GameServer {
    /// An idle server with no race
    pub fn new() -> Self {
        Self {
            state: GameState::Idle,
            race: None,
            last_tick: Instant::now(),
            tick_times: VecDeque::with_capacity(TICK_HISTORY),
            ticks: 0,
            running: false,
        }
    }

    /// Build a race from `config` and line the marbles up; replaces any previous race
    pub fn init_race(&mut self, config: RaceConfig) -> Result<(), RaceError> {
        let mut race = MarbleRace::new(config)?;
        race.generate_marbles();
        race.setup_starting_positions();

        log::info!(
            "Race initialized with {} marbles over {} checkpoints",
            race.marbles.len(),
            race.checkpoints().len()
        );

        self.race = Some(race);
        self.state = GameState::Ready;
        self.running = false;
        self.ticks = 0;
        self.tick_times.clear();
        Ok(())
    }

    /// Open the countdown; fails with `NoRace` before `init_race`
    pub fn start_race(&mut self) -> Result<(), RaceError> {
        let race = self.race.as_mut().ok_or(RaceError::NoRace)?;
        race.start_countdown();
        self.state = GameState::Racing;
        self.running = true;
        self.last_tick = Instant::now();
        log::info!("Race started");
        Ok(())
    }

    /// Perform a simulation tick using wall-clock time since the last one
    pub fn tick(&mut self) -> Option<RaceSnapshot> {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick).as_secs_f32();
        self.last_tick = now;
        self.advance(delta)
    }

    /// Perform a simulation tick of a fixed length
    pub fn advance(&mut self, delta: f32) -> Option<RaceSnapshot> {
        if !self.running {
            return self.snapshot();
        }

        let tick_start = Instant::now();

        if let Some(race) = &mut self.race {
            race.update(delta);
            self.ticks += 1;

            if race.status == RaceStatus::Finished {
                self.state = GameState::Results;
                self.running = false;
            }
        }

        let tick_time = tick_start.elapsed().as_secs_f32() * 1000.0;
        if self.tick_times.len() == TICK_HISTORY {
            self.tick_times.pop_front();
        }
        self.tick_times.push_back(tick_time);

        self.snapshot()
    }

    /// Tick at a fixed step until the race finishes or `max_ticks` is reached
    pub fn run_to_completion(
        &mut self,
        step: f32,
        max_ticks: u64,
    ) -> Result<Vec<RaceResult>, RaceError> {
        if self.race.is_none() {
            return Err(RaceError::NoRace);
        }

        for _ in 0..max_ticks {
            if !self.running {
                break;
            }
            self.advance(step);
        }

        if self.state != GameState::Results {
            log::warn!("Race still running after {} ticks", self.ticks);
        }

        self.results()
    }

    /// Standings of the active race, if there is one
    pub fn snapshot(&self) -> Option<RaceSnapshot> {
        self.race.as_ref().map(MarbleRace::snapshot)
    }

    /// Finishers so far, in finish order
    pub fn results(&self) -> Result<Vec<RaceResult>, RaceError> {
        self.race
            .as_ref()
            .map(MarbleRace::results)
            .ok_or(RaceError::NoRace)
    }

    pub fn race(&self) -> Option<&MarbleRace> {
        self.race.as_ref()
    }

    /// Average tick cost over the last [`TICK_HISTORY`] ticks
    pub fn stats(&self) -> ServerStats {
        let avg_tick_time = if self.tick_times.is_empty() {
            0.0
        } else {
            self.tick_times.iter().sum::<f32>() / self.tick_times.len() as f32
        };

        ServerStats {
            avg_tick_time_ms: avg_tick_time,
            ticks: self.ticks,
            marble_count: self.race.as_ref().map(|r| r.marbles.len() as u32).unwrap_or(0),
            game_state: self.state,
        }
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    /// Drop the race and all timings
    pub fn reset(&mut self) {
        self.state = GameState::Idle;
        self.race = None;
        self.running = false;
        self.ticks = 0;
        self.tick_times.clear();
        log::info!("Race reset");
    }

    /// Stop advancing; `tick` and `advance` only report the snapshot
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Continue a paused race; the pause itself is not simulated
    pub fn resume(&mut self) {
        if self.state == GameState::Racing {
            self.running = true;
            self.last_tick = Instant::now();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }
}

impl Default for GameServer {
    fn default() -> Self {
        Self::new()
    }
}
