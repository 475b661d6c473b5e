//! Grid collision, enemy pursuit and placement helpers

use glam::{IVec2, Vec2};
use rand::Rng;

use super::player::Player;
use crate::consts::ENEMY_MIN_STEER_DIST;
use crate::dist_sq;

/// Whether `cell` lies inside a `w` x `h` grid
#[inline]
pub fn in_bounds(cell: IVec2, w: i32, h: i32) -> bool {
    cell.x >= 0 && cell.x < w && cell.y >= 0 && cell.y < h
}

/// Step `pos` toward `target` by `step` units along the raw direction vector.
/// Pure pursuit: no lead, no path finding.
pub fn pursue(pos: Vec2, target: Vec2, step: f32) -> Vec2 {
    let delta = target - pos;
    let dist = delta.length();
    if dist > ENEMY_MIN_STEER_DIST {
        pos + delta / dist * step
    } else {
        pos
    }
}

/// Whether an enemy at `pos` touches the head at `head`
#[inline]
pub fn enemy_hits(pos: Vec2, head: IVec2, hit_dist_sq: f32) -> bool {
    dist_sq(head.x as f32, head.y as f32, pos.x, pos.y) < hit_dist_sq
}

/// Pick a fragment cell clear of the player by rejection sampling.
///
/// After `retries` misses the last sample is returned anyway: on a nearly
/// full board a free cell may not exist.
pub fn place_fragment<R: Rng>(rng: &mut R, player: &Player, w: i32, h: i32, retries: u32) -> IVec2 {
    let mut cell = IVec2::ZERO;
    for _ in 0..retries.max(1) {
        cell = IVec2::new(rng.random_range(0..w), rng.random_range(0..h));
        if !player.occupies(cell) {
            return cell;
        }
    }
    log::debug!("Fragment placement budget exhausted, accepting {cell}");
    cell
}

/// Random spawn point on the grid border
pub fn edge_spawn<R: Rng>(rng: &mut R, w: i32, h: i32) -> Vec2 {
    if rng.random_bool(0.5) {
        // Left or right column
        let x = if rng.random_bool(0.5) { 0 } else { w - 1 };
        Vec2::new(x as f32, rng.random_range(0..h) as f32)
    } else {
        // Top or bottom row
        let y = if rng.random_bool(0.5) { 0 } else { h - 1 };
        Vec2::new(rng.random_range(0..w) as f32, y as f32)
    }
}
