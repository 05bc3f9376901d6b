//! Entity records
//!
//! Plain data: the simulation step owns all behavior. Every entity is an
//! axis-aligned rectangle anchored at its top-left corner.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in canvas pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    /// Width and height, both strictly positive
    pub size: Vec2,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        debug_assert!(width > 0.0 && height > 0.0, "entity size must be positive");
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }
}

/// Anything that occupies a rectangle on the field
pub trait Bounds {
    fn bounds(&self) -> Rect;
}

impl Bounds for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// The moth
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub rect: Rect,
    /// Movement intent applied this frame (derived from input, not momentum)
    pub vel: Vec2,
}

impl Player {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            vel: Vec2::ZERO,
        }
    }
}

impl Bounds for Player {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Obstacle look. Only render sinks branch on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ObstacleKind {
    #[default]
    Web,
    Wind,
}

/// An obstacle scrolling toward the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: u32,
    pub rect: Rect,
    /// Horizontal movement per frame (negative = leftward)
    pub speed_x: f32,
    pub kind: ObstacleKind,
}

impl Bounds for Obstacle {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// A shot fired by the player
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    pub rect: Rect,
    /// Horizontal movement per frame (positive = rightward)
    pub speed_x: f32,
}

impl Bounds for Projectile {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Goal object of the lamp rule set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lamp {
    pub rect: Rect,
}

impl Bounds for Lamp {
    fn bounds(&self) -> Rect {
        self.rect
    }
}

/// Hands out entity ids, unique within one session
#[derive(Debug, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdAllocator {
    pub fn next_id(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_edges() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert_eq!(r.left(), 10.0);
        assert_eq!(r.right(), 40.0);
        assert_eq!(r.top(), 20.0);
        assert_eq!(r.bottom(), 60.0);
        assert_eq!(r.center(), Vec2::new(25.0, 40.0));
    }

    #[test]
    fn test_ids_are_unique() {
        let mut ids = IdAllocator::default();
        let a = ids.next_id();
        let b = ids.next_id();
        assert_ne!(a, b);
        assert_eq!(a, 1);
    }
}
