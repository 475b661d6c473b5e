//! Input commands and the buffered command queue
//!
//! Host event handlers translate keys and swipes into `Command`s; the
//! simulation pops at most one per frame.

use std::collections::VecDeque;

use glam::Vec2;

use crate::consts::{INPUT_THROTTLE_MS, SWIPE_THRESHOLD};

/// A player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Queue a direction change (unit step on one axis)
    Move { dx: i32, dy: i32 },
    /// Toggle pause
    Pause,
}

impl Command {
    pub const UP: Command = Command::Move { dx: 0, dy: -1 };
    pub const DOWN: Command = Command::Move { dx: 0, dy: 1 };
    pub const LEFT: Command = Command::Move { dx: -1, dy: 0 };
    pub const RIGHT: Command = Command::Move { dx: 1, dy: 0 };
}

/// Map a `KeyboardEvent.code` to a command (strict whitelist)
pub fn command_for_key(code: &str) -> Option<Command> {
    match code {
        "ArrowUp" | "KeyW" => Some(Command::UP),
        "ArrowDown" | "KeyS" => Some(Command::DOWN),
        "ArrowLeft" | "KeyA" => Some(Command::LEFT),
        "ArrowRight" | "KeyD" => Some(Command::RIGHT),
        "Escape" | "Space" => Some(Command::Pause),
        _ => None,
    }
}

/// Map a completed swipe (screen coordinates, y down) to a move
pub fn command_for_swipe(start: Vec2, end: Vec2) -> Option<Command> {
    let delta = end - start;
    let (abs_x, abs_y) = (delta.x.abs(), delta.y.abs());

    if abs_x > abs_y && abs_x > SWIPE_THRESHOLD {
        Some(if delta.x > 0.0 { Command::RIGHT } else { Command::LEFT })
    } else if abs_y > abs_x && abs_y > SWIPE_THRESHOLD {
        Some(if delta.y > 0.0 { Command::DOWN } else { Command::UP })
    } else {
        // Tap or diagonal
        None
    }
}

/// FIFO of pending commands
#[derive(Debug, Default)]
pub struct InputQueue {
    queue: VecDeque<Command>,
    /// Timestamp of the last accepted key, if any
    last_input_ms: Option<f64>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cmd: Command) {
        self.queue.push_back(cmd);
    }

    /// Next command, oldest first
    pub fn pop(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Handle a key press. Movement keys arriving within the throttle window
    /// are dropped; pause always goes through. Returns whether a command was
    /// queued.
    pub fn key_down(&mut self, code: &str, now_ms: f64) -> bool {
        let Some(cmd) = command_for_key(code) else {
            return false;
        };

        let throttled = self
            .last_input_ms
            .is_some_and(|last| now_ms - last < INPUT_THROTTLE_MS);
        if throttled && cmd != Command::Pause {
            return false;
        }

        self.last_input_ms = Some(now_ms);
        self.push(cmd);
        true
    }

    /// Handle a finished touch gesture. Returns whether a command was queued.
    pub fn swipe(&mut self, start: Vec2, end: Vec2) -> bool {
        match command_for_swipe(start, end) {
            Some(cmd) => {
                self.push(cmd);
                true
            }
            None => false,
        }
    }

    /// Drop everything (run start)
    pub fn reset(&mut self) {
        self.queue.clear();
        self.last_input_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_whitelist() {
        assert_eq!(command_for_key("KeyW"), Some(Command::UP));
        assert_eq!(command_for_key("ArrowRight"), Some(Command::RIGHT));
        assert_eq!(command_for_key("Space"), Some(Command::Pause));
        assert_eq!(command_for_key("KeyQ"), None);
    }

    #[test]
    fn test_fifo_order() {
        let mut q = InputQueue::new();
        q.push(Command::UP);
        q.push(Command::Pause);
        assert_eq!(q.pop(), Some(Command::UP));
        assert_eq!(q.pop(), Some(Command::Pause));
        assert_eq!(q.pop(), None);
    }

    #[test]
    fn test_movement_throttle() {
        let mut q = InputQueue::new();
        assert!(q.key_down("ArrowUp", 1000.0));
        // Too soon
        assert!(!q.key_down("ArrowLeft", 1020.0));
        // Pause ignores the throttle
        assert!(q.key_down("Escape", 1030.0));
        assert!(q.key_down("ArrowLeft", 1100.0));
        assert_eq!(q.len(), 3);
    }

    #[test]
    fn test_swipe_mapping() {
        let o = Vec2::ZERO;
        assert_eq!(command_for_swipe(o, Vec2::new(80.0, 10.0)), Some(Command::RIGHT));
        assert_eq!(command_for_swipe(o, Vec2::new(-80.0, 10.0)), Some(Command::LEFT));
        assert_eq!(command_for_swipe(o, Vec2::new(5.0, 60.0)), Some(Command::DOWN));
        assert_eq!(command_for_swipe(o, Vec2::new(5.0, -60.0)), Some(Command::UP));
        // Tap
        assert_eq!(command_for_swipe(o, Vec2::new(3.0, 2.0)), None);
    }

    #[test]
    fn test_reset_clears_queue_and_throttle() {
        let mut q = InputQueue::new();
        q.key_down("KeyD", 10.0);
        q.reset();
        assert!(q.is_empty());
        assert!(q.key_down("KeyS", 20.0));
    }
}
