//! Data-driven game balance
//!
//! Every gameplay constant the simulation reads lives here so that a run can
//! be rebalanced from a JSON file without touching code. Missing fields fall
//! back to the defaults in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::ConfigError;

/// Player sprite tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub start_x: f32,
    pub start_y: f32,
    pub width: f32,
    pub height: f32,
    /// Movement per frame (pixels)
    pub speed: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            start_x: PLAYER_START_X,
            start_y: PLAYER_START_Y,
            width: PLAYER_WIDTH,
            height: PLAYER_HEIGHT,
            speed: PLAYER_SPEED,
        }
    }
}

/// Projectile tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub width: f32,
    pub height: f32,
    /// Horizontal movement per frame (pixels, positive = rightward)
    pub speed: f32,
    /// Minimum time between two shots
    pub cooldown_ms: f64,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self {
            width: PROJECTILE_WIDTH,
            height: PROJECTILE_HEIGHT,
            speed: PROJECTILE_SPEED,
            cooldown_ms: FIRE_COOLDOWN_MS,
        }
    }
}

/// Score sources and sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringTuning {
    /// Survival scoring period
    pub tick_ms: f64,
    /// Points per survival tick
    pub survival_bonus: u64,
    /// Points per obstacle shot down
    pub kill_bonus: u64,
    /// Points lost when the player is hit (clamped at zero)
    pub hit_penalty: u64,
}

impl Default for ScoringTuning {
    fn default() -> Self {
        Self {
            tick_ms: 100.0,
            survival_bonus: 1,
            kill_bonus: 25,
            hit_penalty: 50,
        }
    }
}

/// Obstacle spawn policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Interval between spawns at difficulty 0
    pub base_interval_ms: f64,
    /// Interval reduction per difficulty level
    pub interval_step_ms: f64,
    /// Interval floor (bounds worst-case density)
    pub min_interval_ms: f64,
    /// Survival time per difficulty level
    pub ramp_ms: f64,
    /// Obstacle speed magnitude at difficulty 0 (pixels/frame)
    pub base_speed: f32,
    /// Speed magnitude added per difficulty level
    pub speed_step: f32,
    /// Speed magnitude cap
    pub max_speed: f32,
    /// Difficulty levels per extra obstacle in a burst
    pub burst_every: u32,
    /// Largest burst in a single spawn
    pub max_burst: u32,
    /// Horizontal offset between siblings of one burst
    pub sibling_stride: f32,
    pub obstacle_width: f32,
    pub obstacle_height: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            base_interval_ms: 1600.0,
            interval_step_ms: 100.0,
            min_interval_ms: 500.0,
            ramp_ms: 8000.0,
            base_speed: 3.0,
            speed_step: 0.5,
            max_speed: 9.0,
            burst_every: 6,
            max_burst: 3,
            sibling_stride: 90.0,
            obstacle_width: OBSTACLE_WIDTH,
            obstacle_height: OBSTACLE_HEIGHT,
        }
    }
}

/// Lamp goal rule set (opt-in)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LampTuning {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Flat bonus for reaching the lamp
    pub base_bonus: u64,
    /// Bonus per current level
    pub level_bonus: u64,
    /// Bonus per remaining life
    pub life_bonus: u64,
}

impl Default for LampTuning {
    fn default() -> Self {
        Self {
            x: 750.0,
            y: 220.0,
            width: 40.0,
            height: 60.0,
            base_bonus: 100,
            level_bonus: 50,
            life_bonus: 25,
        }
    }
}

/// Complete game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,
    pub invulnerability_frames: u32,
    pub player: PlayerTuning,
    pub projectile: ProjectileTuning,
    pub scoring: ScoringTuning,
    pub spawn: SpawnTuning,
    /// Present only for the lamp rule set
    pub lamp: Option<LampTuning>,
    /// Decorative motes drifting behind the menu
    pub ambient_motes: usize,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            invulnerability_frames: INVULNERABILITY_FRAMES,
            player: PlayerTuning::default(),
            projectile: ProjectileTuning::default(),
            scoring: ScoringTuning::default(),
            spawn: SpawnTuning::default(),
            lamp: None,
            ambient_motes: 80,
        }
    }
}

impl Tuning {
    /// Lamp rule set: free movement toward a goal, levels instead of pure survival
    pub fn lamp_run() -> Self {
        Self {
            lamp: Some(LampTuning::default()),
            ..Self::default()
        }
    }

    /// Switch an existing balance to the lamp rule set
    ///
    /// A lamp already configured is kept as is. The result is revalidated
    /// since the default lamp may not fit a custom field.
    pub fn with_lamp(mut self) -> Result<Self, ConfigError> {
        if self.lamp.is_none() {
            self.lamp = Some(LampTuning::default());
        }
        self.validate()?;
        Ok(self)
    }

    /// Whether the player may move horizontally
    pub fn free_movement(&self) -> bool {
        self.lamp.is_some()
    }

    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Reject balance values the simulation cannot honor
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;

        let p = &self.player;
        positive("player.width", p.width)?;
        positive("player.height", p.height)?;
        non_negative("player.speed", p.speed)?;
        if p.width > self.field_width || p.height > self.field_height {
            return Err(invalid("player", "sprite larger than the field"));
        }
        if p.start_x < 0.0
            || p.start_y < 0.0
            || p.start_x + p.width > self.field_width
            || p.start_y + p.height > self.field_height
        {
            return Err(invalid("player", "start position outside the field"));
        }

        let pr = &self.projectile;
        positive("projectile.width", pr.width)?;
        positive("projectile.height", pr.height)?;
        positive("projectile.speed", pr.speed)?;
        positive("projectile.cooldown_ms", pr.cooldown_ms as f32)?;

        positive("scoring.tick_ms", self.scoring.tick_ms as f32)?;

        let s = &self.spawn;
        positive("spawn.min_interval_ms", s.min_interval_ms as f32)?;
        positive("spawn.ramp_ms", s.ramp_ms as f32)?;
        non_negative("spawn.interval_step_ms", s.interval_step_ms as f32)?;
        if s.min_interval_ms > s.base_interval_ms {
            return Err(invalid("spawn.min_interval_ms", "above base_interval_ms"));
        }
        positive("spawn.base_speed", s.base_speed)?;
        non_negative("spawn.speed_step", s.speed_step)?;
        if s.max_speed < s.base_speed {
            return Err(invalid("spawn.max_speed", "below base_speed"));
        }
        if s.burst_every == 0 {
            return Err(invalid("spawn.burst_every", "must be at least 1"));
        }
        if s.max_burst == 0 {
            return Err(invalid("spawn.max_burst", "must be at least 1"));
        }
        positive("spawn.obstacle_width", s.obstacle_width)?;
        positive("spawn.obstacle_height", s.obstacle_height)?;
        if s.obstacle_height > self.field_height {
            return Err(invalid("spawn.obstacle_height", "taller than the field"));
        }
        if s.sibling_stride < s.obstacle_width {
            return Err(invalid(
                "spawn.sibling_stride",
                "narrower than an obstacle, siblings would overlap",
            ));
        }

        if let Some(lamp) = &self.lamp {
            positive("lamp.width", lamp.width)?;
            positive("lamp.height", lamp.height)?;
            if lamp.x < 0.0
                || lamp.y < 0.0
                || lamp.x + lamp.width > self.field_width
                || lamp.y + lamp.height > self.field_height
            {
                return Err(invalid("lamp", "outside the field"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("expected a positive number, got {value}")))
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(invalid(field, &format!("expected a non-negative number, got {value}")))
    }
}
