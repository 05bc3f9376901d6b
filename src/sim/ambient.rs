//! Decorative background motes shown behind the menu
//!
//! Lives outside the session: updating motes never touches score, lives or
//! any gameplay entity.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

/// A glowing background particle
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mote {
    pub pos: Vec2,
    pub size: f32,
    /// 0-1
    pub opacity: f32,
    /// Degrees, warm orange to red band
    pub hue: f32,
    /// Drift per frame
    pub vel: Vec2,
}

#[derive(Debug, Clone)]
pub struct Ambient {
    motes: Vec<Mote>,
    field: Vec2,
    rng: Pcg32,
}

impl Ambient {
    pub fn new(seed: u64, field: Vec2, count: usize) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let motes = (0..count)
            .map(|_| Mote {
                pos: Vec2::new(
                    rng.random_range(0.0..field.x),
                    rng.random_range(0.0..field.y),
                ),
                size: rng.random_range(1.0..4.0),
                opacity: rng.random_range(0.2..0.8),
                hue: rng.random_range(10.0..70.0),
                vel: Vec2::new(rng.random_range(-0.6..-0.1), rng.random_range(-0.15..0.15)),
            })
            .collect();
        Self { motes, field, rng }
    }

    pub fn motes(&self) -> &[Mote] {
        &self.motes
    }

    /// Drift every mote one frame, wrapping at the field edges
    pub fn update(&mut self) {
        for mote in &mut self.motes {
            mote.pos += mote.vel;
            if mote.pos.x < -mote.size {
                mote.pos.x = self.field.x + mote.size;
                mote.pos.y = self.rng.random_range(0.0..self.field.y);
            }
            if mote.pos.y < -mote.size {
                mote.pos.y += self.field.y + mote.size * 2.0;
            } else if mote.pos.y > self.field.y + mote.size {
                mote.pos.y -= self.field.y + mote.size * 2.0;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motes_stay_near_field() {
        let field = Vec2::new(800.0, 500.0);
        let mut ambient = Ambient::new(9, field, 80);
        assert_eq!(ambient.motes().len(), 80);
        for _ in 0..5000 {
            ambient.update();
        }
        for mote in ambient.motes() {
            assert!(mote.pos.x >= -mote.size - 1.0 && mote.pos.x <= field.x + mote.size + 1.0);
            assert!(mote.pos.y >= -mote.size - 1.0 && mote.pos.y <= field.y + mote.size + 1.0);
        }
    }

    #[test]
    fn test_motes_drift_left() {
        let mut ambient = Ambient::new(1, Vec2::new(800.0, 500.0), 1);
        let before = ambient.motes()[0].pos.x;
        ambient.update();
        assert!(ambient.motes()[0].pos.x < before);
    }
}
