//! Input flag store and command queue
//!
//! Device callbacks write here at any time; the frame loop drains it once at
//! the start of each step, so a step always sees one consistent sample.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::sim::TickInput;

/// Discrete state-machine commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    Restart,
    QuitToMenu,
}

/// What the loop reads at the start of a frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InputSample {
    pub flags: TickInput,
    pub commands: Vec<Command>,
}

/// Held flags plus queued commands
#[derive(Debug, Default)]
pub struct InputQueue {
    flags: TickInput,
    commands: VecDeque<Command>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn flags(&self) -> TickInput {
        self.flags
    }

    pub fn set_flags(&mut self, flags: TickInput) {
        self.flags = flags;
    }

    pub fn push_command(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Clear held flags (e.g. the page lost focus mid key-press)
    pub fn release_all(&mut self) {
        self.flags = TickInput::default();
    }

    /// Apply a keyboard event using `KeyboardEvent.key` names
    ///
    /// Returns true if the key is bound.
    pub fn on_key(&mut self, key: &str, pressed: bool) -> bool {
        match key {
            "ArrowUp" | "w" | "W" => self.flags.move_up = pressed,
            "ArrowDown" | "s" | "S" => self.flags.move_down = pressed,
            "ArrowLeft" | "a" | "A" => self.flags.move_left = pressed,
            "ArrowRight" | "d" | "D" => self.flags.move_right = pressed,
            " " | "f" | "F" => self.flags.fire = pressed,
            "Enter" => {
                if pressed {
                    self.push_command(Command::Start);
                }
            }
            "r" | "R" => {
                if pressed {
                    self.push_command(Command::Restart);
                }
            }
            "Escape" => {
                if pressed {
                    self.push_command(Command::QuitToMenu);
                }
            }
            _ => return false,
        }
        true
    }

    /// Read the held flags and drain queued commands
    pub fn sample(&mut self) -> InputSample {
        InputSample {
            flags: self.flags,
            commands: self.commands.drain(..).collect(),
        }
    }
}

/// Anything the frame loop can sample input from
pub trait InputSource {
    fn sample(&mut self) -> InputSample;
}

impl InputSource for InputQueue {
    fn sample(&mut self) -> InputSample {
        InputQueue::sample(self)
    }
}

/// Input store shared with a capture thread
///
/// Flags and commands are read under one lock, so a sample can never mix
/// half of an update with the previous state.
#[derive(Debug, Clone, Default)]
pub struct SharedInput {
    inner: Arc<Mutex<InputQueue>>,
}

impl SharedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` with exclusive access to the queue
    pub fn with<T>(&self, f: impl FnOnce(&mut InputQueue) -> T) -> T {
        // A panicking writer cannot leave the flag set half-written
        let mut guard = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    pub fn on_key(&self, key: &str, pressed: bool) -> bool {
        self.with(|q| q.on_key(key, pressed))
    }

    pub fn push_command(&self, command: Command) {
        self.with(|q| q.push_command(command));
    }
}

impl InputSource for SharedInput {
    fn sample(&mut self) -> InputSample {
        self.with(InputQueue::sample)
    }
}
