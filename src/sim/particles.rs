//! Fixed-capacity particle buffer
//!
//! Structure-of-arrays sized once at construction. A slot is free when its
//! life is <= 0; nothing is ever allocated or reclaimed after `new`.

use rand::Rng;

/// Visual-only particle storage
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    x: Box<[f32]>,
    y: Box<[f32]>,
    vx: Box<[f32]>,
    vy: Box<[f32]>,
    life: Box<[f32]>,
    max_life: Box<[f32]>,
    color: Box<[&'static str]>,
}

/// A live particle, as handed to the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParticleView {
    pub x: f32,
    pub y: f32,
    /// Remaining life (also used as alpha)
    pub life: f32,
    /// Size factor in [0, 1]
    pub scale: f32,
    pub color: &'static str,
}

impl ParticleSystem {
    pub fn new(capacity: usize) -> Self {
        let zeros = || vec![0.0; capacity].into_boxed_slice();
        Self {
            x: zeros(),
            y: zeros(),
            vx: zeros(),
            vy: zeros(),
            life: zeros(),
            max_life: zeros(),
            color: vec![""; capacity].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.life.len()
    }

    /// Number of occupied slots
    pub fn live_count(&self) -> usize {
        self.life.iter().filter(|&&l| l > 0.0).count()
    }

    /// Burst up to `amount` particles at `(x, y)`. Fills free slots in index
    /// order and returns how many were actually spawned, which is less than
    /// `amount` when the buffer is busy.
    pub fn emit<R: Rng>(
        &mut self,
        rng: &mut R,
        x: f32,
        y: f32,
        color: &'static str,
        amount: usize,
    ) -> usize {
        let mut spawned = 0;
        for i in 0..self.capacity() {
            if spawned >= amount {
                break;
            }
            if self.life[i] > 0.0 {
                continue;
            }

            let angle: f32 = rng.random_range(0.0..std::f32::consts::TAU);
            let speed: f32 = rng.random_range(2.0..7.0);

            self.x[i] = x;
            self.y[i] = y;
            self.vx[i] = angle.cos() * speed;
            self.vy[i] = angle.sin() * speed;
            self.life[i] = 1.0;
            self.max_life[i] = rng.random_range(0.5f32..1.0);
            self.color[i] = color;

            spawned += 1;
        }
        spawned
    }

    /// Age and integrate every live slot
    pub fn update(&mut self, dt: f32) {
        for i in 0..self.capacity() {
            if self.life[i] > 0.0 {
                self.life[i] -= dt;
                self.x[i] += self.vx[i] * dt;
                self.y[i] += self.vy[i] * dt;
            }
        }
    }

    /// Iterate live particles
    pub fn live(&self) -> impl Iterator<Item = ParticleView> + '_ {
        (0..self.capacity())
            .filter(|&i| self.life[i] > 0.0)
            .map(|i| ParticleView {
                x: self.x[i],
                y: self.y[i],
                life: self.life[i],
                scale: (self.life[i] / self.max_life[i]).min(1.0),
                color: self.color[i],
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_emit_fills_free_slots() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut ps = ParticleSystem::new(16);
        assert_eq!(ps.emit(&mut rng, 1.0, 2.0, "#fff", 10), 10);
        assert_eq!(ps.live_count(), 10);
        for p in ps.live() {
            assert_eq!((p.x, p.y), (1.0, 2.0));
            assert_eq!(p.life, 1.0);
        }
    }

    #[test]
    fn test_emit_partial_when_full() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut ps = ParticleSystem::new(8);
        ps.emit(&mut rng, 0.0, 0.0, "#fff", 5);
        // Only 3 slots left
        assert_eq!(ps.emit(&mut rng, 0.0, 0.0, "#fff", 10), 3);
        assert_eq!(ps.live_count(), 8);
        assert_eq!(ps.emit(&mut rng, 0.0, 0.0, "#fff", 4), 0);
        assert_eq!(ps.capacity(), 8);
    }

    #[test]
    fn test_zero_capacity_is_inert() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut ps = ParticleSystem::new(0);
        assert_eq!(ps.emit(&mut rng, 0.0, 0.0, "#fff", 4), 0);
        ps.update(0.1);
        assert_eq!(ps.live().count(), 0);
    }

    #[test]
    fn test_update_moves_and_expires() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut ps = ParticleSystem::new(4);
        ps.emit(&mut rng, 5.0, 5.0, "#fff", 1);

        ps.update(0.25);
        let p = ps.live().next().unwrap();
        assert!((p.life - 0.75).abs() < 1e-6);
        assert!((p.x, p.y) != (5.0, 5.0));

        ps.update(1.0);
        assert_eq!(ps.live_count(), 0);

        // Expired slot is reused by the next scan
        assert_eq!(ps.emit(&mut rng, 0.0, 0.0, "#fff", 4), 4);
    }
}
