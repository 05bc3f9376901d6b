//! Frame-stepped simulation module
//!
//! All gameplay logic lives here. This module must stay pure:
//! - One step per animation frame, timestamps only feed timers
//! - Seeded RNG only
//! - Stable iteration order (collection insertion order)
//! - No rendering, storage or platform dependencies

pub mod ambient;
pub mod collision;
pub mod entity;
pub mod spawner;
pub mod state;
pub mod tick;

pub use ambient::{Ambient, Mote};
pub use collision::{first_overlap, overlaps};
pub use entity::{Bounds, Lamp, Obstacle, ObstacleKind, Player, Projectile, Rect};
pub use spawner::Spawner;
pub use state::{GameEvent, GamePhase, Session};
pub use tick::{TickInput, tick};
