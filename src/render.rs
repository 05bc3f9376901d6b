//! Render sink contract
//!
//! Sinks only ever see a borrowed, read-only view of the session. Drawing is
//! pure presentation and cannot influence the simulation.

use serde::Serialize;

use crate::error::RenderError;
use crate::sim::{GamePhase, Lamp, Mote, Obstacle, Player, Projectile, Session};

/// Everything a sink needs to draw one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Snapshot<'a> {
    pub phase: GamePhase,
    pub field: (f32, f32),
    pub player: &'a Player,
    pub obstacles: &'a [Obstacle],
    pub projectiles: &'a [Projectile],
    pub lamp: Option<&'a Lamp>,
    pub motes: &'a [Mote],
    pub score: u64,
    pub lives: u8,
    pub level: u32,
    /// Player sprite should blink while invulnerable
    pub invulnerable: bool,
    pub final_score: Option<u64>,
}

impl<'a> Snapshot<'a> {
    pub fn new(session: &'a Session, motes: &'a [Mote]) -> Self {
        Self {
            phase: session.phase,
            field: (session.tuning.field_width, session.tuning.field_height),
            player: &session.player,
            obstacles: &session.obstacles,
            projectiles: &session.projectiles,
            lamp: session.lamp.as_ref(),
            motes,
            score: session.score,
            lives: session.lives,
            level: session.level,
            invulnerable: session.is_invulnerable(),
            final_score: session.final_score,
        }
    }

    /// JSON form for sinks living on the other side of an FFI boundary
    pub fn to_json(&self) -> Result<String, RenderError> {
        serde_json::to_string(self).map_err(|e| RenderError::Draw(e.to_string()))
    }
}

/// Consumer of per-frame snapshots
pub trait RenderSink {
    /// Whether a drawing surface exists right now. When it does not, the
    /// whole frame is skipped and the session is left untouched.
    fn is_available(&self) -> bool {
        true
    }

    fn draw(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError>;
}

/// Headless sink that logs HUD changes
#[derive(Debug, Default)]
pub struct LogSink {
    last_hud: Option<(u64, u8, GamePhase)>,
    pub frames_drawn: u64,
}

impl RenderSink for LogSink {
    fn draw(&mut self, snapshot: &Snapshot<'_>) -> Result<(), RenderError> {
        self.frames_drawn += 1;
        let hud = (snapshot.score / 100, snapshot.lives, snapshot.phase);
        if self.last_hud != Some(hud) {
            log::debug!(
                "[{:?}] score {} lives {} level {} obstacles {} projectiles {}",
                snapshot.phase,
                snapshot.score,
                snapshot.lives,
                snapshot.level,
                snapshot.obstacles.len(),
                snapshot.projectiles.len()
            );
            self.last_hud = Some(hud);
        }
        Ok(())
    }
}
