//! Time-gated obstacle factory
//!
//! Cadence is driven by wall-clock timestamps rather than frame counts, so
//! spawn rate does not depend on the display refresh rate.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::entity::{IdAllocator, Obstacle, ObstacleKind, Rect};
use crate::tuning::SpawnTuning;

#[derive(Debug, Clone)]
pub struct Spawner {
    last_spawn_at: f64,
    rng: Pcg32,
    spawned: u64,
}

impl Spawner {
    /// Create a spawner whose first spawn is one interval after `now`
    pub fn new(seed: u64, now: f64) -> Self {
        Self {
            last_spawn_at: now,
            rng: Pcg32::seed_from_u64(seed),
            spawned: 0,
        }
    }

    pub fn last_spawn_at(&self) -> f64 {
        self.last_spawn_at
    }

    /// Obstacles created over this spawner's lifetime
    pub fn total_spawned(&self) -> u64 {
        self.spawned
    }

    /// Minimum time between spawns; shrinks with difficulty down to the floor
    pub fn interval_ms(policy: &SpawnTuning, difficulty: u32) -> f64 {
        (policy.base_interval_ms - policy.interval_step_ms * difficulty as f64)
            .max(policy.min_interval_ms)
    }

    /// Horizontal obstacle speed; grows in magnitude with difficulty up to the cap
    pub fn speed_x(policy: &SpawnTuning, difficulty: u32) -> f32 {
        -(policy.base_speed + policy.speed_step * difficulty as f32).min(policy.max_speed)
    }

    /// Obstacles emitted per spawn
    pub fn burst_size(policy: &SpawnTuning, difficulty: u32) -> u32 {
        (1 + difficulty / policy.burst_every.max(1)).min(policy.max_burst.max(1))
    }

    /// Emit this frame's obstacles, if the interval has elapsed
    ///
    /// New obstacles enter just past the right edge of `field`. Siblings of a
    /// burst are pushed further right by the sibling stride so they never
    /// stack on the same column.
    pub fn poll(
        &mut self,
        now: f64,
        difficulty: u32,
        policy: &SpawnTuning,
        field: Vec2,
        ids: &mut IdAllocator,
    ) -> Vec<Obstacle> {
        if now - self.last_spawn_at < Self::interval_ms(policy, difficulty) {
            return Vec::new();
        }
        self.last_spawn_at = now;

        let count = Self::burst_size(policy, difficulty);
        let speed_x = Self::speed_x(policy, difficulty);
        let (w, h) = (policy.obstacle_width, policy.obstacle_height);
        let half_h = h / 2.0;
        let max_top = (field.y - h).max(0.0);

        let mut spawned = Vec::with_capacity(count as usize);
        for i in 0..count {
            let center_y = self.rng.random_range(half_h..=(field.y - half_h).max(half_h));
            let kind = if self.rng.random_bool(0.5) {
                ObstacleKind::Web
            } else {
                ObstacleKind::Wind
            };
            let x = field.x + i as f32 * policy.sibling_stride;
            let top = (center_y - half_h).clamp(0.0, max_top);
            spawned.push(Obstacle {
                id: ids.next_id(),
                rect: Rect::new(x, top, w, h),
                speed_x,
                kind,
            });
        }

        self.spawned += spawned.len() as u64;
        log::debug!(
            "Spawned {} obstacle(s) at t={:.0}ms (difficulty {}, speed {:.1})",
            spawned.len(),
            now,
            difficulty,
            speed_x
        );
        spawned
    }
}
