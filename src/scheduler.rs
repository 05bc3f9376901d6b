//! Cancellable animation-frame loop
//!
//! Platform drivers call [`FrameLoop::run_frame`] once per display refresh.
//! Each frame samples input once, applies queued commands, steps the engine
//! and hands a snapshot to the render sink.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::engine::Engine;
use crate::input::InputSource;
use crate::leaderboard::ScoreReporter;
use crate::render::RenderSink;
use crate::sim::GamePhase;

/// Shared stop flag for a running loop
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the driver should do after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopControl {
    /// Schedule the next frame
    Continue,
    /// Nothing is simulating; keep scheduling only to receive commands
    Idle,
    /// Cancelled, do not schedule again
    Stop,
}

#[derive(Debug, Default)]
pub struct FrameLoop {
    cancel: CancelToken,
    frames: u64,
    skipped: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle that stops this loop from anywhere
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Frames that reached the engine
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Frames dropped because no drawing surface was available
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Run one frame at timestamp `now` (ms)
    pub fn run_frame<R, I, S>(
        &mut self,
        engine: &mut Engine<R>,
        input: &mut I,
        sink: &mut S,
        now: f64,
    ) -> LoopControl
    where
        R: ScoreReporter,
        I: InputSource + ?Sized,
        S: RenderSink + ?Sized,
    {
        if self.cancel.is_cancelled() {
            return LoopControl::Stop;
        }

        // Without a surface the frame is dropped before input is consumed
        if !sink.is_available() {
            self.skipped += 1;
            return LoopControl::Continue;
        }

        let sample = input.sample();
        for command in sample.commands {
            engine.handle_command(command, now);
        }
        engine.step(&sample.flags, now);
        self.frames += 1;

        if let Err(e) = sink.draw(&engine.snapshot()) {
            log::warn!("Frame {} not drawn: {}", self.frames, e);
        }

        match engine.phase() {
            GamePhase::GameOver => LoopControl::Idle,
            _ => LoopControl::Continue,
        }
    }
}
