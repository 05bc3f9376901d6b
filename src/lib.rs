//! Moth Flight - a side-scrolling arcade survival game
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (entities, spawning, collisions, scoring)
//! - `engine`: Game state machine wired to its collaborators
//! - `input`: Input flag store and command queue
//! - `scheduler`: Cancellable animation-frame loop
//! - `render`: Read-only snapshot handed to render sinks
//! - `leaderboard`: Score reporting and the local leaderboard
//! - `persistence`: Best-effort key-value storage for the player profile
//! - `tuning`: Data-driven game balance

pub mod engine;
pub mod error;
pub mod input;
pub mod leaderboard;
pub mod persistence;
pub mod render;
pub mod scheduler;
pub mod sim;
pub mod tuning;

pub use engine::Engine;
pub use error::{ConfigError, RenderError, ReportError, StoreError};
pub use input::{Command, InputQueue, SharedInput};
pub use leaderboard::{LeaderboardEntry, LeaderboardSource, LocalLeaderboard, ScoreReporter};
pub use render::{RenderSink, Snapshot};
pub use scheduler::{CancelToken, FrameLoop, LoopControl};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Nominal display refresh interval in milliseconds (60 Hz)
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Play field dimensions (canvas pixels)
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Lives at session start (also the maximum)
    pub const MAX_LIVES: u8 = 3;
    /// Frames of invulnerability after a hit (2 seconds at 60 Hz)
    pub const INVULNERABILITY_FRAMES: u32 = 120;

    /// Player defaults
    pub const PLAYER_START_X: f32 = 50.0;
    pub const PLAYER_START_Y: f32 = 250.0;
    pub const PLAYER_WIDTH: f32 = 30.0;
    pub const PLAYER_HEIGHT: f32 = 20.0;
    /// Vertical movement per frame (pixels)
    pub const PLAYER_SPEED: f32 = 4.0;

    /// Projectile defaults
    pub const PROJECTILE_WIDTH: f32 = 12.0;
    pub const PROJECTILE_HEIGHT: f32 = 4.0;
    pub const PROJECTILE_SPEED: f32 = 9.0;
    pub const FIRE_COOLDOWN_MS: f64 = 250.0;

    /// Obstacle defaults
    pub const OBSTACLE_WIDTH: f32 = 50.0;
    pub const OBSTACLE_HEIGHT: f32 = 40.0;
}
