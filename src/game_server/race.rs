//! Race - Race configuration and state management
//!
//! Handles race setup, timing, and hands the field to the race engine
//! every tick for checkpoint and finish detection.

use std::path::Path;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::RaceError;
use crate::game_server::marble::{Marble, MarbleMotion, MarbleSnapshot};
use crate::race_engine::{checkpoint, Checkpoint, RaceEngine, RacerId};

/// Race configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    /// Distance from the start line to the finish
    pub track_length: f32,
    /// Number of checkpoints, the finish line included
    pub checkpoint_count: usize,
    /// Number of marbles
    pub marble_count: u32,
    /// Time scale factor (higher = faster simulation)
    pub time_scale: f32,
    /// Gap between rows on the starting grid
    pub formation_spread: f32,
    /// Countdown before the gates open (seconds)
    pub countdown: f32,
    /// Fixed RNG seed for reproducible races
    pub seed: Option<u64>,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            track_length: 1000.0,
            checkpoint_count: 10,
            marble_count: 8,
            time_scale: 1.0,
            formation_spread: 1.5,
            countdown: 3.0,
            seed: None,
        }
    }
}

/// Upper bound on gates per track
pub const MAX_CHECKPOINTS: usize = 10_000;

/// Upper bound on marbles per race
pub const MAX_MARBLES: u32 = 1_000;

impl RaceConfig {
    /// Load a config from a JSON file; missing fields take their defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, RaceError> {
        let raw = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RaceError> {
        if !(self.track_length.is_finite() && self.track_length > 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "track_length must be positive, got {}",
                self.track_length
            )));
        }
        if !(1..=MAX_CHECKPOINTS).contains(&self.checkpoint_count) {
            return Err(RaceError::InvalidConfig(format!(
                "checkpoint_count must be between 1 and {}, got {}",
                MAX_CHECKPOINTS, self.checkpoint_count
            )));
        }
        if !(1..=MAX_MARBLES).contains(&self.marble_count) {
            return Err(RaceError::InvalidConfig(format!(
                "marble_count must be between 1 and {}, got {}",
                MAX_MARBLES, self.marble_count
            )));
        }
        if !(self.formation_spread.is_finite() && self.formation_spread >= 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "formation_spread must not be negative, got {}",
                self.formation_spread
            )));
        }
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "time_scale must be positive, got {}",
                self.time_scale
            )));
        }
        if !(self.countdown.is_finite() && self.countdown >= 0.0) {
            return Err(RaceError::InvalidConfig(format!(
                "countdown must not be negative, got {}",
                self.countdown
            )));
        }
        Ok(())
    }

    /// Evenly spaced gates along the track, ending at the finish line
    pub fn checkpoints(&self) -> Vec<Checkpoint> {
        checkpoint::evenly_spaced(self.track_length, self.checkpoint_count)
    }
}

/// Race status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RaceStatus {
    NotStarted,
    Countdown,
    Racing,
    Finished,
}

/// Final placing of one marble
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RaceResult {
    pub marble_id: RacerId,
    pub marble_name: String,
    pub finish_time: f32,
    pub position: u32,
}

const MARBLE_NAMES: [&str; 8] = [
    "Crimson", "Cobalt", "Amber", "Jade", "Onyx", "Pearl", "Violet", "Copper",
];

/// Marbles per row on the starting grid
const GRID_WIDTH: usize = 4;

/// Complete race state
#[derive(Debug)]
pub struct MarbleRace {
    /// Race configuration
    pub config: RaceConfig,
    /// Current race status
    pub status: RaceStatus,
    /// All marbles, in standings order once racing
    pub marbles: Vec<Marble>,
    /// Elapsed race time (in-game seconds)
    pub elapsed_time: f32,
    /// Countdown remaining (seconds)
    pub countdown: f32,
    engine: RaceEngine,
    leader_id: Option<RacerId>,
    rng: StdRng,
}

impl MarbleRace {
    /// Create a new race with the given configuration
    pub fn new(config: RaceConfig) -> Result<Self, RaceError> {
        config.validate()?;
        let engine = RaceEngine::new(config.checkpoints())?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            countdown: config.countdown,
            config,
            status: RaceStatus::NotStarted,
            marbles: Vec::new(),
            elapsed_time: 0.0,
            engine,
            leader_id: None,
            rng,
        })
    }

    /// Fill the field with marbles of slightly different pace
    pub fn generate_marbles(&mut self) {
        self.marbles.clear();

        // A marble should cover the track in roughly 20-30 seconds
        let cruise = self.config.track_length / 25.0;

        for i in 0..self.config.marble_count {
            let colour = MARBLE_NAMES[i as usize % MARBLE_NAMES.len()];
            let name = match i as usize / MARBLE_NAMES.len() {
                0 => colour.to_string(),
                lap => format!("{} {}", colour, lap + 1),
            };
            let base_speed = cruise * self.rng.gen_range(0.85..1.15);
            let spin = self.rng.gen::<f32>();
            self.marbles.push(Marble::new(i, name, base_speed, spin));
        }
    }

    /// Line the marbles up in rows behind the start line
    pub fn setup_starting_positions(&mut self) {
        let spread = self.config.formation_spread;

        for (i, marble) in self.marbles.iter_mut().enumerate() {
            let row = i / GRID_WIDTH;
            marble.reset(-(row as f32) * spread);
        }
    }

    /// Start countdown
    pub fn start_countdown(&mut self) {
        self.status = RaceStatus::Countdown;
        self.countdown = self.config.countdown;
    }

    /// Update race state
    pub fn update(&mut self, delta: f32) {
        match self.status {
            RaceStatus::NotStarted => {}

            RaceStatus::Countdown => {
                self.countdown -= delta;
                if self.countdown <= 0.0 {
                    self.status = RaceStatus::Racing;
                    self.countdown = 0.0;
                    log::info!("Gates open, {} marbles racing", self.marbles.len());
                }
            }

            RaceStatus::Racing => {
                self.elapsed_time += delta * self.config.time_scale;

                self.roll_marbles(delta);
                self.engine.update_at(&mut self.marbles, self.elapsed_time);
                self.track_leader();

                if self.engine.finishers().len() == self.marbles.len() {
                    self.status = RaceStatus::Finished;
                    log::info!("Race finished after {:.2}s", self.elapsed_time);
                }
            }

            RaceStatus::Finished => {
                // Keep rolling out past the line
                self.roll_marbles(delta);
            }
        }
    }

    fn roll_marbles(&mut self, delta: f32) {
        let time_scale = self.config.time_scale;
        for marble in &mut self.marbles {
            MarbleMotion::update(marble, delta, time_scale, &mut self.rng);
        }
    }

    fn track_leader(&mut self) {
        let leader = RaceEngine::leader(&self.marbles).map(Marble::id);
        if leader != self.leader_id {
            if let Some(marble) = self.leader().filter(|_| self.leader_id.is_some()) {
                log::info!("{} takes the lead at {:.2}s", marble.name, self.elapsed_time);
            }
            self.leader_id = leader;
        }
    }

    /// Get compact snapshot for display, in standings order
    pub fn snapshot(&self) -> RaceSnapshot {
        RaceSnapshot {
            status: self.status,
            elapsed_time: self.elapsed_time,
            countdown: self.countdown,
            marbles: self.marbles.iter().map(MarbleSnapshot::from).collect(),
            finisher_count: self.engine.finishers().len() as u32,
            leader: self.leader_id,
        }
    }

    /// Finish order with names and times
    pub fn results(&self) -> Vec<RaceResult> {
        self.engine
            .finishers()
            .iter()
            .enumerate()
            .map(|(i, finisher)| RaceResult {
                marble_id: finisher.racer_id,
                marble_name: self
                    .get_marble(finisher.racer_id)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                finish_time: finisher.finish_time,
                position: i as u32 + 1,
            })
            .collect()
    }

    /// Current leader; meaningful once the race has ticked
    pub fn leader(&self) -> Option<&Marble> {
        RaceEngine::leader(&self.marbles)
    }

    /// First marble across the line
    pub fn winner(&self) -> Option<&Marble> {
        self.engine
            .winner()
            .and_then(|finisher| self.get_marble(finisher.racer_id))
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        self.engine.checkpoints()
    }

    /// Get marble by ID
    pub fn get_marble(&self, id: RacerId) -> Option<&Marble> {
        self.marbles.iter().find(|m| m.id() == id)
    }
}

/// Compact race snapshot for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceSnapshot {
    pub status: RaceStatus,
    pub elapsed_time: f32,
    pub countdown: f32,
    pub marbles: Vec<MarbleSnapshot>,
    pub finisher_count: u32,
    pub leader: Option<RacerId>,
}
