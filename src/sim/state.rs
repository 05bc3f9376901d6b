//! Session state and core simulation types
//!
//! A `Session` holds everything one run needs. It is rebuilt from scratch on
//! every start and exclusively owned by whoever steps it.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entity::{IdAllocator, Lamp, Obstacle, ObstacleKind, Player, Projectile, Rect};
use super::spawner::Spawner;
use crate::consts::MAX_LIVES;
use crate::tuning::Tuning;

/// Which screen the game is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, ambient background only
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Run ended, final score frozen
    GameOver,
}

/// Something noteworthy that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    ProjectileFired { id: u32 },
    ObstaclesSpawned { count: usize },
    ObstacleDestroyed { obstacle: u32, projectile: u32 },
    PlayerHit { obstacle: u32, lives_left: u8 },
    LampReached { bonus: u64, level: u32 },
    GameOver { final_score: u64 },
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct Session {
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Current score, never negative
    pub score: u64,
    /// Remaining lives, 0..=3
    pub lives: u8,
    /// Lamp rule set level, starts at 1
    pub level: u32,
    /// Frames left in the invulnerability window (0 = vulnerable)
    pub invulnerable_frames: u32,
    /// Steps simulated so far
    pub frame: u64,
    /// Timestamp the run started at (ms)
    pub started_at: f64,
    /// Latest timestamp seen, never moves backward (ms)
    pub clock: f64,
    pub last_fire_at: Option<f64>,
    pub last_score_tick_at: f64,
    pub player: Player,
    /// Live obstacles in spawn order
    pub obstacles: Vec<Obstacle>,
    /// Live projectiles in firing order
    pub projectiles: Vec<Projectile>,
    pub lamp: Option<Lamp>,
    /// Set exactly once, when lives reach zero
    pub final_score: Option<u64>,
    pub spawner: Spawner,
    pub ids: IdAllocator,
}

impl Session {
    /// Fresh run starting at `now` in the given phase
    pub fn new(tuning: Tuning, seed: u64, now: f64, phase: GamePhase) -> Self {
        let now = if now.is_finite() { now.max(0.0) } else { 0.0 };
        let player = Player::new(Self::player_start(&tuning));
        let lamp = tuning.lamp.as_ref().map(|l| Lamp {
            rect: Rect::new(l.x, l.y, l.width, l.height),
        });

        Self {
            phase,
            score: 0,
            lives: MAX_LIVES,
            level: 1,
            invulnerable_frames: 0,
            frame: 0,
            started_at: now,
            clock: now,
            last_fire_at: None,
            last_score_tick_at: now,
            player,
            obstacles: Vec::new(),
            projectiles: Vec::new(),
            lamp,
            final_score: None,
            spawner: Spawner::new(seed, now),
            ids: IdAllocator::default(),
            tuning,
        }
    }

    fn player_start(tuning: &Tuning) -> Rect {
        let p = &tuning.player;
        Rect::new(p.start_x, p.start_y, p.width, p.height)
    }

    /// Play field size
    pub fn field(&self) -> Vec2 {
        Vec2::new(self.tuning.field_width, self.tuning.field_height)
    }

    /// Move the session clock to `now`, ignoring non-finite or backward time
    ///
    /// Returns the clamped timestamp so elapsed deltas are never negative.
    pub fn advance_clock(&mut self, now: f64) -> f64 {
        if now.is_finite() && now > self.clock {
            self.clock = now;
        }
        self.clock
    }

    /// Milliseconds survived so far
    pub fn survival_ms(&self) -> f64 {
        self.clock - self.started_at
    }

    /// Difficulty signal fed to the spawner
    pub fn difficulty(&self) -> u32 {
        let ramp = (self.survival_ms() / self.tuning.spawn.ramp_ms.max(1.0)).floor() as u32;
        ramp + self.level.saturating_sub(1)
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_frames > 0
    }

    /// Put the player back at the start position
    pub fn reset_player(&mut self) {
        self.player = Player::new(Self::player_start(&self.tuning));
    }

    /// Insert an obstacle directly (scripted scenarios, autopilot drills)
    pub fn place_obstacle(&mut self, rect: Rect, speed_x: f32, kind: ObstacleKind) -> u32 {
        let id = self.ids.next_id();
        self.obstacles.push(Obstacle {
            id,
            rect,
            speed_x,
            kind,
        });
        id
    }
}
