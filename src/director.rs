/// Wave scheduling: when to spawn, what to spawn, when a wave is over, and how
/// difficulty ratchets between waves.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::combatant::{Boss, Combatant, CombatantId, CombatantKind, Locomotion, Melee, Ranged};
use crate::config::{GameConfig, WaveConfig};
use crate::geometry::{Ellipse, Rect, Vec2};
use crate::projectile::FlightLimits;

// ── Difficulty ───────────────────────────────────────────────────────────────

/// Global multipliers applied to ranged and boss stats at spawn time.
/// They only ever go up, and only after a boss wave.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Difficulty {
    pub damage_multiplier: f32,
    pub attack_speed_multiplier: f32,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            damage_multiplier: 1.0,
            attack_speed_multiplier: 1.0,
        }
    }
}

impl Difficulty {
    pub fn ratchet(&mut self, cfg: &WaveConfig) {
        self.damage_multiplier =
            (self.damage_multiplier + cfg.damage_multiplier_step).min(cfg.damage_multiplier_cap);
        self.attack_speed_multiplier = (self.attack_speed_multiplier + cfg.attack_speed_multiplier_step)
            .min(cfg.attack_speed_multiplier_cap);
    }
}

// ── Spawning ─────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnKind {
    Melee,
    Ranged,
    Boss,
}

/// Uniform point along a uniformly chosen edge of `arena`, pushed outward by
/// `radius` so a body of that radius starts fully off-screen.
pub fn spawn_position<R: Rng + ?Sized>(rng: &mut R, arena: &Rect, radius: f32) -> Vec2 {
    let edge = rng.gen_range(0..4);
    let along_x = arena.left + rng.gen::<f32>() * arena.width;
    let along_y = arena.bottom + rng.gen::<f32>() * arena.height;
    match edge {
        0 => Vec2::new(along_x, arena.top() + radius),
        1 => Vec2::new(arena.right() + radius, along_y),
        2 => Vec2::new(along_x, arena.bottom - radius),
        _ => Vec2::new(arena.left - radius, along_y),
    }
}

/// Build a combatant of `kind` scaled to `wave`.
pub fn build_combatant(
    id: CombatantId,
    kind: SpawnKind,
    at: Vec2,
    wave: u32,
    config: &GameConfig,
    difficulty: &Difficulty,
    limits: FlightLimits,
) -> Combatant {
    let enemies = &config.enemies;
    let levels = wave.saturating_sub(1) as i32;
    let w = wave as f32;
    match kind {
        SpawnKind::Melee => {
            let cfg = &enemies.melee;
            let health = cfg.base_health + cfg.health_per_wave * levels;
            let speed = cfg.base_speed + cfg.speed_per_wave * w;
            Combatant::new(
                id,
                Ellipse::circle(at, enemies.radius),
                health,
                Locomotion::new(speed, cfg.preferred_distance, enemies),
                CombatantKind::Melee(Melee::new(cfg, health)),
                limits,
            )
        }
        SpawnKind::Ranged => {
            let cfg = &enemies.ranged;
            let health = cfg.base_health + cfg.health_per_wave * levels;
            let speed = cfg.base_speed + cfg.speed_per_wave * w;
            Combatant::new(
                id,
                Ellipse::circle(at, enemies.radius),
                health,
                Locomotion::new(speed, cfg.preferred_distance, enemies),
                CombatantKind::Ranged(Ranged::new(cfg, difficulty)),
                limits,
            )
        }
        SpawnKind::Boss => {
            let cfg = &enemies.boss;
            let health = cfg.base_health + cfg.health_per_wave * levels;
            let speed = cfg.base_speed + cfg.speed_per_wave * w;
            Combatant::new(
                id,
                Ellipse::circle(at, cfg.radius),
                health,
                Locomotion::new(speed, cfg.preferred_distance, enemies),
                CombatantKind::Boss(Boss::for_wave(cfg, wave, config.waves.boss_every, difficulty)),
                limits,
            )
        }
    }
}

// ── Wave state ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveState {
    pub wave: u32,
    pub required: u32,
    pub spawned: u32,
    pub killed: u32,
    pub spawn_timer: f32,
    pub spawn_interval: f32,
    pub max_concurrent: usize,
    pub boss_every: u32,
    pub boss_spawned: bool,
    next_id: u64,
}

impl WaveState {
    /// Wave 1.
    pub fn new(cfg: &WaveConfig) -> Self {
        let mut state = Self {
            wave: 1,
            required: 0,
            spawned: 0,
            killed: 0,
            spawn_timer: 0.0,
            spawn_interval: 0.0,
            max_concurrent: cfg.max_concurrent,
            boss_every: cfg.boss_every.max(1),
            boss_spawned: false,
            next_id: 0,
        };
        state.configure(cfg);
        state
    }

    fn configure(&mut self, cfg: &WaveConfig) {
        let levels = self.wave.saturating_sub(1);
        self.required = cfg.initial_required + cfg.required_per_wave * levels;
        self.spawn_interval =
            (cfg.initial_spawn_interval - cfg.spawn_interval_step * levels as f32).max(cfg.min_spawn_interval);
        self.spawned = 0;
        self.killed = 0;
        self.spawn_timer = 0.0;
        self.boss_spawned = false;
    }

    pub fn is_boss_wave(&self) -> bool {
        self.wave % self.boss_every == 0
    }

    /// Wave quota and concurrency cap; the timer is checked separately.
    pub fn has_room(&self, living: usize) -> bool {
        self.spawned < self.required && living < self.max_concurrent
    }

    pub fn choose_kind<R: Rng + ?Sized>(&self, rng: &mut R, ranged_chance: u32) -> SpawnKind {
        if self.is_boss_wave() && !self.boss_spawned {
            SpawnKind::Boss
        } else if rng.gen_range(0..100) < ranged_chance {
            SpawnKind::Ranged
        } else {
            SpawnKind::Melee
        }
    }

    fn next_id(&mut self) -> CombatantId {
        let id = CombatantId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Advance the spawn timer and spawn at most one combatant.
    pub fn update<R: Rng + ?Sized>(
        &mut self,
        dt: f32,
        living: usize,
        rng: &mut R,
        arena: &Rect,
        config: &GameConfig,
        difficulty: &Difficulty,
        limits: FlightLimits,
    ) -> Option<Combatant> {
        self.spawn_timer += dt;
        if !self.has_room(living) || self.spawn_timer < self.spawn_interval {
            return None;
        }

        let kind = self.choose_kind(rng, config.waves.ranged_chance);
        let radius = match kind {
            SpawnKind::Boss => config.enemies.boss.radius,
            _ => config.enemies.radius,
        };
        let at = spawn_position(rng, arena, radius);
        let id = self.next_id();
        let combatant = build_combatant(id, kind, at, self.wave, config, difficulty, limits);

        self.spawned += 1;
        self.spawn_timer = 0.0;
        if kind == SpawnKind::Boss {
            self.boss_spawned = true;
            log::info!("wave {}: boss {:?} enters with {} hp", self.wave, id, combatant.max_health);
        } else {
            log::debug!(
                "wave {}: spawned {} {:?} ({}/{})",
                self.wave,
                combatant.kind.name(),
                id,
                self.spawned,
                self.required
            );
        }
        Some(combatant)
    }

    pub fn record_kill(&mut self) {
        self.killed += 1;
    }

    /// Everything spawned, everything killed, nothing left standing.
    pub fn is_complete(&self, living: usize) -> bool {
        self.spawned >= self.required && self.killed >= self.required && living == 0
    }

    /// Move on to the next wave.  Clearing a boss wave ratchets `difficulty`.
    pub fn advance(&mut self, cfg: &WaveConfig, difficulty: &mut Difficulty) {
        if self.is_boss_wave() {
            difficulty.ratchet(cfg);
            log::info!(
                "boss wave {} cleared: enemy damage x{:.2}, attack speed x{:.2}",
                self.wave,
                difficulty.damage_multiplier,
                difficulty.attack_speed_multiplier
            );
        }
        self.wave += 1;
        self.configure(cfg);
        log::info!(
            "wave {} begins: {} enemies, spawn every {:.2}s{}",
            self.wave,
            self.required,
            self.spawn_interval,
            if self.is_boss_wave() { " (boss wave)" } else { "" }
        );
    }
}
