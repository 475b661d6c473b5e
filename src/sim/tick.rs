//! Frame-driven simulation
//!
//! `advance(dt)` is the single entry point per display frame. Player movement
//! is gated by a fixed move interval (at most one cell per frame), enemies
//! move every frame, and the score is integrity-checked before any gameplay.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::{edge_spawn, enemy_hits, in_bounds, place_fragment, pursue};
use super::particles::ParticleSystem;
use super::player::Player;
use super::pool::Pool;
use super::score::ScoreTracker;
use super::state::{Crash, Enemy, Fragment, GameEvent, RunState};
use crate::audio::{AudioSink, SoundEffect};
use crate::consts::{COLLECT_BURST, CRASH_BURST, ENEMY_POOL_PREWARM, FRAGMENT_PULSE_RATE, colors};
use crate::error::TuningError;
use crate::highscores::HighScore;
use crate::input::{Command, InputQueue};
use crate::persistence::SecureStorage;
use crate::renderer::{Renderer, Shape};
use crate::settings::Settings;
use crate::tuning::Tuning;

/// Owns all game state and advances it once per frame
pub struct Simulation {
    pub tuning: Tuning,
    state: RunState,
    pub player: Player,
    /// Enemies in play (sorted by spawn order)
    pub enemies: Vec<Enemy>,
    pool: Pool<Enemy>,
    pub fragment: Fragment,
    pub particles: ParticleSystem,
    pub score: ScoreTracker,
    high_score: HighScore,
    input: InputQueue,
    rng: Pcg32,
    move_timer: f32,
    spawn_timer: f32,
    /// Seconds of unpaused play this run (drives the fragment pulse)
    global_time: f32,
    storage: SecureStorage,
    audio: Box<dyn AudioSink>,
    events: Vec<GameEvent>,
}

impl Simulation {
    /// Build the simulation in the `Menu` state. The high score is read from
    /// `storage` immediately. Fails if `tuning` does not validate.
    pub fn new(
        tuning: Tuning,
        settings: &Settings,
        seed: u64,
        storage: SecureStorage,
        audio: Box<dyn AudioSink>,
    ) -> Result<Self, TuningError> {
        tuning.validate()?;

        let mut next_id = 0;
        let pool = Pool::new(
            move || {
                next_id += 1;
                Enemy::new(next_id)
            },
            Enemy::reactivate,
            ENEMY_POOL_PREWARM,
        );

        let high_score = HighScore::load(&storage, tuning.salt);
        let score = ScoreTracker::new(tuning.salt, tuning.score_value);

        log::info!(
            "Simulation ready: {}x{} grid, seed {seed}",
            tuning.grid_w,
            tuning.grid_h
        );

        Ok(Self {
            state: RunState::Menu,
            player: Player::new(),
            enemies: Vec::new(),
            pool,
            fragment: Fragment::default(),
            particles: ParticleSystem::new(settings.max_particles()),
            score,
            high_score,
            input: InputQueue::new(),
            rng: Pcg32::seed_from_u64(seed),
            move_timer: 0.0,
            spawn_timer: 0.0,
            global_time: 0.0,
            storage,
            audio,
            events: Vec::new(),
            tuning,
        })
    }

    // === Host-facing surface ===

    /// Begin a fresh run from any state
    pub fn start(&mut self) {
        self.state = RunState::Playing;
        self.score.reset();
        self.global_time = 0.0;
        self.move_timer = 0.0;
        self.spawn_timer = 0.0;

        self.input.reset();

        let (cx, cy) = self.tuning.center();
        self.player.init(cx, cy);

        for mut enemy in self.enemies.drain(..) {
            enemy.active = false;
            self.pool.release(enemy);
        }
        self.spawn_fragment();

        log::info!("Run started");
        self.events.push(GameEvent::RunStarted);
    }

    /// Playing <-> Paused; ignored in other states
    pub fn toggle_pause(&mut self) {
        match self.state {
            RunState::Playing => {
                self.state = RunState::Paused;
                self.events.push(GameEvent::Paused);
            }
            RunState::Paused => {
                self.state = RunState::Playing;
                self.events.push(GameEvent::Resumed);
            }
            _ => {}
        }
    }

    /// Advance by one display frame of `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() {
            crate::clamp(dt, 0.0, self.tuning.max_dt)
        } else {
            0.0
        };

        match self.state {
            RunState::Playing => {
                if !self.score.verify() {
                    self.integrity_violation();
                } else {
                    self.update(dt);
                }
            }
            RunState::Paused => {
                // Only a pause command can wake a paused run
                if let Some(Command::Pause) = self.input.pop() {
                    self.toggle_pause();
                }
            }
            RunState::Menu | RunState::GameOver | RunState::IntegrityViolation => {}
        }

        if self.state != RunState::Paused {
            self.particles.update(dt);
        }
    }

    /// Draw the current state
    pub fn render(&self, r: &mut dyn Renderer) {
        r.clear();

        if self.fragment.active {
            let phase = self.global_time * FRAGMENT_PULSE_RATE;
            let pos = self.fragment.pos.as_vec2();
            r.draw_entity(pos.x, pos.y, colors::FRAGMENT, Shape::Circle, phase);
        }

        for t in &self.player.tail {
            r.draw_entity(t.x as f32, t.y as f32, colors::PLAYER, Shape::Rect, 0.0);
        }
        let head = self.player.pos.as_vec2();
        r.draw_entity(head.x, head.y, colors::PLAYER, Shape::Rect, 0.0);

        for e in &self.enemies {
            r.draw_entity(e.pos.x, e.pos.y, colors::ENEMY, Shape::Rect, 0.0);
        }

        for p in self.particles.live() {
            r.draw_particle(p.x, p.y, p.scale, p.life, p.color);
        }
    }

    /// Adopt changed settings. The particle buffer is reallocated only when
    /// its capacity changes, which drops any live particles.
    pub fn apply_settings(&mut self, settings: &Settings) {
        let capacity = settings.max_particles();
        if capacity != self.particles.capacity() {
            self.particles = ParticleSystem::new(capacity);
            log::info!("Particle capacity now {capacity}");
        }
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    pub fn score(&self) -> u32 {
        self.score.score
    }

    pub fn high_score(&self) -> u32 {
        self.high_score.best
    }

    pub fn global_time(&self) -> f32 {
        self.global_time
    }

    pub fn input_mut(&mut self) -> &mut InputQueue {
        &mut self.input
    }

    pub fn push_command(&mut self, cmd: Command) {
        self.input.push(cmd);
    }

    /// Take all events recorded since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn storage(&self) -> &SecureStorage {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut SecureStorage {
        &mut self.storage
    }

    /// Idle enemies waiting in the pool
    pub fn pooled_enemies(&self) -> usize {
        self.pool.idle()
    }

    // === Internals ===

    fn update(&mut self, dt: f32) {
        self.global_time += dt;

        match self.input.pop() {
            Some(Command::Move { dx, dy }) => self.player.queue_direction(dx, dy),
            Some(Command::Pause) => {
                self.toggle_pause();
                return;
            }
            None => {}
        }

        // Fixed-step player movement: one cell per frame at most
        self.move_timer += dt;
        if self.move_timer >= self.tuning.move_interval {
            self.move_timer -= self.tuning.move_interval;
            self.player.tick();

            let head = self.player.pos;
            if !in_bounds(head, self.tuning.grid_w, self.tuning.grid_h) {
                return self.game_over(Crash::Bounds);
            }
            if self.player.tail_contains(head) {
                return self.game_over(Crash::SelfHit);
            }
            if self.fragment.active && head == self.fragment.pos {
                self.collect_fragment();
            }
        }

        // Enemies pursue the head every frame. All move before any contact
        // check; a hit ends the run either way.
        let head = self.player.pos;
        let target = head.as_vec2();
        let step = self.tuning.enemy_speed * dt;
        for enemy in &mut self.enemies {
            enemy.pos = pursue(enemy.pos, target, step);
        }
        let hit_dist_sq = self.tuning.enemy_hit_dist_sq;
        if self.enemies.iter().any(|e| enemy_hits(e.pos, head, hit_dist_sq)) {
            return self.game_over(Crash::Enemy);
        }

        self.spawn_timer += dt;
        if self.spawn_timer >= self.tuning.spawn_interval {
            self.spawn_timer = 0.0;
            self.spawn_enemy();
        }
    }

    fn collect_fragment(&mut self) {
        self.score.add(self.tuning.score_value);
        self.player.len += 1;

        let burst = self.fragment.pos.as_vec2() + 0.5;
        self.particles
            .emit(&mut self.rng, burst.x, burst.y, colors::FRAGMENT, COLLECT_BURST);
        self.audio.play(SoundEffect::Collect);

        self.spawn_fragment();
        self.events.push(GameEvent::FragmentCollected {
            score: self.score.score,
        });
    }

    fn spawn_fragment(&mut self) {
        self.fragment.pos = place_fragment(
            &mut self.rng,
            &self.player,
            self.tuning.grid_w,
            self.tuning.grid_h,
            self.tuning.fragment_retries,
        );
        self.fragment.active = true;
    }

    fn spawn_enemy(&mut self) {
        let mut enemy = self.pool.get();
        enemy.pos = edge_spawn(&mut self.rng, self.tuning.grid_w, self.tuning.grid_h);
        log::debug!("Enemy {} spawned at {}", enemy.id, enemy.pos);
        self.enemies.push(enemy);
    }

    fn game_over(&mut self, cause: Crash) {
        self.state = RunState::GameOver;
        let score = self.score.score;

        let new_high_score = self.high_score.submit(score);
        if new_high_score {
            self.high_score.save(&mut self.storage);
        }

        let burst = self.player.pos.as_vec2() + 0.5;
        self.particles
            .emit(&mut self.rng, burst.x, burst.y, colors::PLAYER, CRASH_BURST);
        self.audio.play(SoundEffect::Crash);

        log::info!("Game over ({cause:?}), score {score}");
        self.events.push(GameEvent::GameOver {
            score,
            cause,
            new_high_score,
        });
    }

    fn integrity_violation(&mut self) {
        self.state = RunState::IntegrityViolation;
        let score = self.score.score;
        log::error!("Score integrity violation (score {score}), run voided");
        self.audio.play(SoundEffect::Crash);
        self.events.push(GameEvent::IntegrityViolation { score });
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("state", &self.state)
            .field("player", &self.player)
            .field("enemies", &self.enemies.len())
            .field("fragment", &self.fragment)
            .field("score", &self.score.score)
            .field("high_score", &self.high_score.best)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::tests::RecordingAudio;
    use crate::persistence::MemoryStorage;
    use crate::renderer::tests::{DrawCall, RecordingRenderer};
    use glam::{IVec2, Vec2};

    /// Slightly over one move interval
    const STEP: f32 = 0.09;

    fn sim_with(tuning: Tuning) -> (Simulation, RecordingAudio) {
        let audio = RecordingAudio::default();
        let storage = SecureStorage::new(Box::new(MemoryStorage::new()));
        let sim = Simulation::new(
            tuning,
            &Settings::default(),
            12345,
            storage,
            Box::new(audio.clone()),
        )
        .unwrap();
        (sim, audio)
    }

    fn started() -> (Simulation, RecordingAudio) {
        let (mut sim, audio) = sim_with(Tuning::default());
        sim.start();
        (sim, audio)
    }

    fn cell_ahead(player: &Player) -> IVec2 {
        player.pos + player.dir()
    }

    /// Park the fragment where the player won't reach it
    fn park_fragment(sim: &mut Simulation) {
        sim.fragment.pos = IVec2::new(0, 0);
    }

    #[test]
    fn test_new_starts_in_menu() {
        let (mut sim, _) = sim_with(Tuning::default());
        assert_eq!(sim.run_state(), RunState::Menu);
        sim.advance(0.1);
        assert_eq!(sim.player.pos, IVec2::ZERO);
        assert_eq!(sim.pooled_enemies(), ENEMY_POOL_PREWARM);
    }

    #[test]
    fn test_start_places_player_at_center() {
        let (mut sim, _) = started();
        assert_eq!(sim.run_state(), RunState::Playing);
        assert_eq!(sim.player.pos, IVec2::new(20, 15));
        assert_eq!(sim.player.len, 1);
        assert!(sim.player.tail.is_empty());
        assert!(sim.fragment.active);
        assert_ne!(sim.fragment.pos, sim.player.pos);
        assert_eq!(sim.score(), 0);
        assert_eq!(sim.drain_events(), vec![GameEvent::RunStarted]);
    }

    #[test]
    fn test_collecting_fragment() {
        let (mut sim, audio) = started();
        let target = cell_ahead(&sim.player);
        sim.fragment.pos = target;

        sim.advance(STEP);

        assert_eq!(sim.player.pos, target);
        assert_eq!(sim.score(), 100);
        assert_eq!(sim.player.len, 2);
        assert!(sim.score.verify());
        assert_ne!(sim.fragment.pos, target);
        assert!(!sim.player.occupies(sim.fragment.pos));
        assert!(sim.particles.live_count() > 0);
        assert_eq!(*audio.0.borrow(), vec![SoundEffect::Collect]);
        assert!(
            sim.drain_events()
                .contains(&GameEvent::FragmentCollected { score: 100 })
        );
    }

    #[test]
    fn test_tail_grows_after_collection() {
        let (mut sim, _) = started();
        sim.fragment.pos = cell_ahead(&sim.player);
        sim.advance(STEP);
        park_fragment(&mut sim);

        assert_eq!(sim.player.tail.len(), 1);
        sim.advance(STEP);
        assert_eq!(sim.player.tail.len(), 2);
        sim.advance(STEP);
        assert_eq!(sim.player.tail.len(), 2);
    }

    #[test]
    fn test_direct_score_write_voids_run() {
        let (mut sim, _) = started();
        sim.score.add(100);
        sim.score.score = 50_000;
        let pos = sim.player.pos;

        sim.advance(STEP);

        assert_eq!(sim.run_state(), RunState::IntegrityViolation);
        // Gameplay did not run this frame
        assert_eq!(sim.player.pos, pos);
        assert_eq!(sim.high_score(), 0);
        assert!(sim.storage().load_raw(HighScore::STORAGE_KEY).is_none());
        assert!(
            sim.drain_events()
                .contains(&GameEvent::IntegrityViolation { score: 50_000 })
        );

        // Only start() leaves the terminal state
        sim.advance(STEP);
        assert_eq!(sim.run_state(), RunState::IntegrityViolation);
        sim.start();
        assert_eq!(sim.run_state(), RunState::Playing);
        assert!(sim.score.verify());
    }

    #[test]
    fn test_huge_dt_moves_one_cell() {
        let (mut sim, _) = started();
        park_fragment(&mut sim);
        let start = sim.player.pos;
        sim.advance(10.0);
        assert_eq!(sim.player.pos, start + IVec2::X);
    }

    #[test]
    fn test_one_tick_per_frame_even_with_surplus() {
        let tuning = Tuning {
            move_interval: 0.01,
            ..Tuning::default()
        };
        let (mut sim, _) = sim_with(tuning);
        sim.start();
        park_fragment(&mut sim);
        let start = sim.player.pos;
        sim.advance(0.1);
        assert_eq!(sim.player.pos, start + IVec2::X);
        sim.advance(0.0);
        // Surplus drains one interval per frame
        assert_eq!(sim.player.pos, start + IVec2::new(2, 0));
    }

    #[test]
    fn test_negative_and_nan_dt_ignored() {
        let (mut sim, _) = started();
        let start = sim.player.pos;
        sim.advance(-5.0);
        sim.advance(f32::NAN);
        assert_eq!(sim.player.pos, start);
        assert_eq!(sim.global_time(), 0.0);
    }

    #[test]
    fn test_leaving_grid_ends_run() {
        let (mut sim, audio) = started();
        sim.score.add(100);
        sim.player.pos = IVec2::new(39, 15);
        park_fragment(&mut sim);

        sim.advance(STEP);

        assert_eq!(sim.run_state(), RunState::GameOver);
        assert_eq!(sim.high_score(), 100);
        assert_eq!(
            HighScore::load(sim.storage(), sim.tuning.salt).best,
            100
        );
        assert!(audio.0.borrow().contains(&SoundEffect::Crash));
        assert!(sim.drain_events().contains(&GameEvent::GameOver {
            score: 100,
            cause: Crash::Bounds,
            new_high_score: true,
        }));
    }

    #[test]
    fn test_self_collision_ends_run() {
        let (mut sim, _) = started();
        park_fragment(&mut sim);
        sim.player.len = 5;

        for _ in 0..4 {
            sim.advance(STEP);
        }
        for cmd in [Command::DOWN, Command::LEFT, Command::UP] {
            sim.push_command(cmd);
            sim.advance(STEP);
        }

        assert_eq!(sim.run_state(), RunState::GameOver);
        assert!(sim.drain_events().iter().any(|e| matches!(
            e,
            GameEvent::GameOver {
                cause: Crash::SelfHit,
                ..
            }
        )));
    }

    #[test]
    fn test_reverse_command_ignored() {
        let (mut sim, _) = started();
        park_fragment(&mut sim);
        let start = sim.player.pos;
        sim.advance(STEP);
        sim.push_command(Command::LEFT);
        sim.advance(STEP);
        assert_eq!(sim.run_state(), RunState::Playing);
        assert_eq!(sim.player.pos, start + IVec2::new(2, 0));
    }

    #[test]
    fn test_enemy_pursues_and_catches() {
        let (mut sim, _) = started();
        let head = sim.player.pos.as_vec2();

        let mut far = Enemy::new(100);
        far.pos = Vec2::new(0.0, head.y);
        sim.enemies.push(far);
        sim.advance(0.05);
        let moved = sim.enemies[0].pos;
        assert!((moved.x - 0.25).abs() < 1e-5);
        assert_eq!(moved.y, head.y);

        let mut near = Enemy::new(101);
        near.pos = head + Vec2::new(0.0, 0.7);
        sim.enemies.push(near);
        sim.advance(0.02);
        assert_eq!(sim.run_state(), RunState::GameOver);
    }

    #[test]
    fn test_enemies_spawn_and_return_to_pool() {
        let tuning = Tuning {
            spawn_interval: 0.25,
            ..Tuning::default()
        };
        let (mut sim, _) = sim_with(tuning);
        sim.start();
        park_fragment(&mut sim);

        for _ in 0..3 {
            sim.advance(0.1);
        }
        assert_eq!(sim.enemies.len(), 1);
        assert!(sim.enemies[0].active);
        assert_eq!(sim.pooled_enemies(), ENEMY_POOL_PREWARM - 1);

        sim.start();
        assert!(sim.enemies.is_empty());
        assert_eq!(sim.pooled_enemies(), ENEMY_POOL_PREWARM);
    }

    #[test]
    fn test_pause_freezes_and_resumes() {
        let (mut sim, _) = started();
        park_fragment(&mut sim);
        sim.push_command(Command::Pause);
        sim.advance(STEP);
        assert_eq!(sim.run_state(), RunState::Paused);

        let pos = sim.player.pos;
        sim.push_command(Command::DOWN);
        for _ in 0..5 {
            sim.advance(0.1);
        }
        assert_eq!(sim.player.pos, pos);

        sim.push_command(Command::Pause);
        sim.advance(0.0);
        assert_eq!(sim.run_state(), RunState::Playing);

        // The move sent while paused was dropped
        sim.advance(STEP);
        assert_eq!(sim.player.pos, pos + IVec2::X);
        assert_eq!(
            sim.drain_events(),
            vec![GameEvent::RunStarted, GameEvent::Paused, GameEvent::Resumed]
        );
    }

    #[test]
    fn test_invalid_tuning_refused() {
        let storage = || SecureStorage::new(Box::new(MemoryStorage::new()));
        for tuning in [
            Tuning {
                grid_w: 0,
                ..Tuning::default()
            },
            Tuning {
                grid_h: 1,
                ..Tuning::default()
            },
            Tuning {
                max_dt: f32::NAN,
                ..Tuning::default()
            },
        ] {
            let result = Simulation::new(
                tuning,
                &Settings::default(),
                1,
                storage(),
                Box::new(RecordingAudio::default()),
            );
            assert!(result.is_err());
        }
    }

    #[test]
    fn test_particles_freeze_while_paused() {
        let (mut sim, _) = started();
        sim.fragment.pos = cell_ahead(&sim.player);
        sim.advance(STEP);
        assert!(sim.particles.live_count() > 0);

        sim.toggle_pause();
        let before: Vec<_> = sim.particles.live().collect();
        for _ in 0..5 {
            sim.advance(0.1);
        }
        let after: Vec<_> = sim.particles.live().collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_crash_burst_plays_on_end_screen() {
        let (mut sim, _) = started();
        sim.player.pos = IVec2::new(39, 15);
        park_fragment(&mut sim);
        sim.advance(STEP);
        assert_eq!(sim.run_state(), RunState::GameOver);

        let live = sim.particles.live_count();
        assert!(live > 0);
        assert!(sim.particles.live().all(|p| p.color == colors::PLAYER));
        let life_before: f32 = sim.particles.live().map(|p| p.life).sum();

        sim.advance(0.05);
        let life_after: f32 = sim.particles.live().map(|p| p.life).sum();
        assert!(life_after < life_before);
    }

    #[test]
    fn test_apply_settings_resizes_particles() {
        let (mut sim, _) = started();
        let mut settings = Settings::default();
        settings.particles = false;
        sim.apply_settings(&settings);
        assert_eq!(sim.particles.capacity(), 0);

        settings.particles = true;
        settings.apply_preset(crate::settings::QualityPreset::High);
        sim.apply_settings(&settings);
        assert_eq!(sim.particles.capacity(), 1024);
    }

    #[test]
    fn test_toggle_pause_outside_run_is_noop() {
        let (mut sim, _) = sim_with(Tuning::default());
        sim.toggle_pause();
        assert_eq!(sim.run_state(), RunState::Menu);
    }

    #[test]
    fn test_render_order() {
        let (sim, _) = started();
        let mut r = RecordingRenderer::default();
        sim.render(&mut r);

        assert_eq!(r.calls[0], DrawCall::Clear);
        assert!(matches!(
            r.calls[1],
            DrawCall::Entity {
                shape: Shape::Circle,
                ..
            }
        ));
        assert_eq!(r.entities(colors::PLAYER), 1);
        assert_eq!(r.entities(colors::ENEMY), 0);
    }

    #[test]
    fn test_same_seed_same_run() {
        let (mut a, _) = started();
        let (mut b, _) = started();
        for _ in 0..10 {
            a.advance(STEP);
            b.advance(STEP);
        }
        assert_eq!(a.fragment.pos, b.fragment.pos);
        assert_eq!(a.player.pos, b.player.pos);
    }
}
