//! The player's head, trail and direction state machine

use std::collections::VecDeque;

use glam::IVec2;

/// The player trail
#[derive(Debug, Clone)]
pub struct Player {
    pub pos: IVec2,
    /// Previous head positions, newest first
    pub tail: VecDeque<IVec2>,
    /// Maximum tail length; grows by one per fragment
    pub len: usize,
    /// Direction in effect for the current tick
    dir: IVec2,
    /// Direction to commit on the next tick
    next_dir: IVec2,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            pos: IVec2::ZERO,
            tail: VecDeque::new(),
            len: 1,
            dir: IVec2::ZERO,
            next_dir: IVec2::X,
        }
    }
}

impl Player {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset for a new run at `(x, y)`, heading right
    pub fn init(&mut self, x: i32, y: i32) {
        self.pos = IVec2::new(x, y);
        self.tail.clear();
        self.len = 1;
        self.dir = IVec2::X;
        self.next_dir = IVec2::X;
    }

    pub fn dir(&self) -> IVec2 {
        self.dir
    }

    pub fn next_dir(&self) -> IVec2 {
        self.next_dir
    }

    /// Buffer a direction change. Reversals of the direction in effect are
    /// ignored, so a double-tap within one tick can't fold the head back
    /// onto the trail.
    pub fn queue_direction(&mut self, dx: i32, dy: i32) {
        if dx != 0 && self.dir.x == -dx {
            return;
        }
        if dy != 0 && self.dir.y == -dy {
            return;
        }
        self.next_dir = IVec2::new(dx, dy);
    }

    /// Commit the pending direction, record the trail and step the head
    pub fn tick(&mut self) {
        self.dir = self.next_dir;
        self.tail.push_front(self.pos);
        self.tail.truncate(self.len);
        self.pos += self.dir;
    }

    /// Whether `cell` is any trail segment
    pub fn tail_contains(&self, cell: IVec2) -> bool {
        self.tail.iter().any(|&t| t == cell)
    }

    /// Whether `cell` is the head or any trail segment
    pub fn occupies(&self, cell: IVec2) -> bool {
        self.pos == cell || self.tail_contains(cell)
    }
}
