//! Marble - Individual marble state and motion
//!
//! Each marble carries its race progress plus the rolling state the
//! simulation moves every tick. The race engine only sees the [`Racer`].

use std::borrow::{Borrow, BorrowMut};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::race_engine::{Racer, RacerId};

/// Complete state for a single marble
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Marble {
    /// Progress tracked by the race engine
    pub racer: Racer,
    /// Display name
    pub name: String,
    /// Cruising speed (units/s)
    pub base_speed: f32,
    /// Current speed (units/s)
    pub current_speed: f32,
    /// Speed the marble is easing toward
    pub target_speed: f32,
    /// Rolling phase (0-1, repeating)
    pub spin: f32,
}

impl Marble {
    pub fn new(id: RacerId, name: String, base_speed: f32, spin: f32) -> Self {
        Self {
            racer: Racer::new(id),
            name,
            base_speed,
            current_speed: 0.0,
            target_speed: base_speed,
            spin,
        }
    }

    pub fn id(&self) -> RacerId {
        self.racer.id
    }

    /// Put the marble back on the grid
    pub fn reset(&mut self, start_position: f32) {
        self.racer = Racer::at(self.racer.id, start_position);
        self.current_speed = 0.0;
        self.target_speed = self.base_speed;
    }
}

impl Borrow<Racer> for Marble {
    fn borrow(&self) -> &Racer {
        &self.racer
    }
}

impl BorrowMut<Racer> for Marble {
    fn borrow_mut(&mut self) -> &mut Racer {
        &mut self.racer
    }
}

/// Marble motion logic
pub struct MarbleMotion;

impl MarbleMotion {
    const ACCELERATION_RATE: f32 = 25.0;
    const BUMP_CHANCE: f64 = 0.05;
    const MIN_BUMP: f32 = 0.6;
    const MAX_BUMP: f32 = 1.35;
    const COOLDOWN_FACTOR: f32 = 0.3;
    const SPIN_PER_UNIT: f32 = 0.25;

    /// Roll a single marble forward for one tick
    pub fn update<G: Rng>(marble: &mut Marble, delta: f32, time_scale: f32, rng: &mut G) {
        let dt = delta * time_scale;

        if marble.racer.is_finished() {
            marble.target_speed = marble.base_speed * Self::COOLDOWN_FACTOR;
        } else if rng.gen_bool(Self::BUMP_CHANCE) {
            // Bumps and slopes knock the marble off its cruising pace
            marble.target_speed = marble.base_speed * rng.gen_range(Self::MIN_BUMP..Self::MAX_BUMP);
        }

        let accel = Self::ACCELERATION_RATE * dt;
        if marble.current_speed < marble.target_speed {
            marble.current_speed = (marble.current_speed + accel).min(marble.target_speed);
        } else if marble.current_speed > marble.target_speed {
            marble.current_speed = (marble.current_speed - accel).max(marble.target_speed);
        }

        let travelled = marble.current_speed * dt;
        marble.racer.current_position += travelled;

        marble.spin = (marble.spin + travelled * Self::SPIN_PER_UNIT) % 1.0;
    }
}

/// Compact marble state for display
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarbleSnapshot {
    pub id: RacerId,
    pub position: f32,
    pub speed: f32,
    pub spin: f32,
    pub checkpoint_index: usize,
    pub rank: u32,
    pub finished: bool,
}

impl From<&Marble> for MarbleSnapshot {
    fn from(marble: &Marble) -> Self {
        Self {
            id: marble.racer.id,
            position: marble.racer.current_position,
            speed: marble.current_speed,
            spin: marble.spin,
            checkpoint_index: marble.racer.current_checkpoint_index,
            rank: marble.racer.rank,
            finished: marble.racer.is_finished(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn marble_accelerates_and_moves_forward() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut marble = Marble::new(1, "Cobalt".into(), 50.0, 0.0);

        let mut last = marble.racer.current_position;
        for _ in 0..120 {
            MarbleMotion::update(&mut marble, 1.0 / 60.0, 1.0, &mut rng);
            assert!(marble.racer.current_position >= last);
            last = marble.racer.current_position;
        }

        assert!(marble.current_speed > 0.0);
        assert!(marble.racer.current_position > 0.0);
        assert!((0.0..1.0).contains(&marble.spin));
    }

    #[test]
    fn reset_returns_marble_to_grid() {
        let mut marble = Marble::new(4, "Amber".into(), 40.0, 0.5);
        marble.racer.current_position = 300.0;
        marble.racer.current_checkpoint_index = 2;
        marble.current_speed = 12.0;

        marble.reset(-3.0);

        assert_eq!(marble.racer, Racer::at(4, -3.0));
        assert_eq!(marble.current_speed, 0.0);
    }
}
