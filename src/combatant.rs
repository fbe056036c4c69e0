/// Enemy combatants: one struct for the shared body, one enum payload per
/// variant for the attack state.
///
/// Lifecycle: spawned off-screen → advancing ⇄ engaging → dead.  `alive`
/// flips to false exactly once; the controller then removes the combatant.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::{BossConfig, EnemyConfig, MeleeConfig, RangedConfig};
use crate::director::Difficulty;
use crate::geometry::{Ellipse, Vec2};
use crate::projectile::{FlightLimits, Projectile};

/// Stable handle, unique for the lifetime of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u64);

/// Distance a boss aims its shots along, before jitter.
const BOSS_AIM_REACH: f32 = 500.0;

/// Max-health points per melee power level.
const MELEE_POWER_STEP: i32 = 10;

// ── Variant payloads ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Melee {
    pub contact_margin: f32,
    pub contact_damage: i32,
    pub contact_cooldown: f32,
    pub cooldown_left: f32,
    pub power_level: u32,
}

impl Melee {
    /// Contact damage grows with the health the combatant spawned with.
    pub fn new(cfg: &MeleeConfig, max_health: i32) -> Self {
        let power_level = 1 + (max_health.max(0) / MELEE_POWER_STEP) as u32;
        Self {
            contact_margin: cfg.contact_margin,
            contact_damage: cfg.contact_damage * power_level as i32,
            contact_cooldown: cfg.contact_cooldown,
            cooldown_left: 0.0,
            power_level,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ranged {
    pub attack_range: f32,
    /// Shots per second.
    pub attack_speed: f32,
    pub attack_timer: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
}

impl Ranged {
    pub fn new(cfg: &RangedConfig, difficulty: &Difficulty) -> Self {
        Self {
            attack_range: cfg.attack_range,
            attack_speed: cfg.attack_speed * difficulty.attack_speed_multiplier,
            attack_timer: 0.0,
            projectile_damage: (cfg.projectile_damage * difficulty.damage_multiplier).round() as i32,
            projectile_speed: cfg.projectile_speed,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Boss {
    /// Bursts per second.
    pub attack_speed: f32,
    pub attack_timer: f32,
    pub projectile_damage: i32,
    pub projectile_speed: f32,
    pub burst_count: u32,
    /// Shots still owed by the current burst; 0 while idle.
    pub bursts_left: u32,
    pub burst_delay: f32,
    pub burst_timer: f32,
    /// Full width of the aim jitter in radians.
    pub jitter: f32,
    pub power_level: u32,
}

impl Boss {
    /// Stats for a boss appearing on `wave`.
    pub fn for_wave(cfg: &BossConfig, wave: u32, boss_every: u32, difficulty: &Difficulty) -> Self {
        let power_level = 1 + wave / boss_every.max(1);
        let power = power_level as f32;
        let extra = power - 1.0;
        Self {
            attack_speed: cfg.attack_speed * (1.0 + 0.1 * extra) * difficulty.attack_speed_multiplier,
            attack_timer: 0.0,
            projectile_damage: (cfg.projectile_damage * power * difficulty.damage_multiplier).round() as i32,
            projectile_speed: cfg.projectile_speed + 20.0 * extra,
            burst_count: cfg.burst_count + power_level - 1,
            bursts_left: 0,
            burst_delay: cfg.burst_delay,
            burst_timer: 0.0,
            jitter: cfg.jitter / power,
            power_level,
        }
    }

    pub fn is_bursting(&self) -> bool {
        self.bursts_left > 0
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CombatantKind {
    Melee(Melee),
    Ranged(Ranged),
    Boss(Boss),
}

impl CombatantKind {
    pub fn name(&self) -> &'static str {
        match self {
            CombatantKind::Melee(_) => "melee",
            CombatantKind::Ranged(_) => "ranged",
            CombatantKind::Boss(_) => "boss",
        }
    }

    /// Ranged and boss combatants back off when crowded.
    fn kites(&self) -> bool {
        !matches!(self, CombatantKind::Melee(_))
    }
}

/// Shared movement tuning.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Locomotion {
    pub speed: f32,
    pub preferred_distance: f32,
    pub retreat_factor: f32,
    pub kite_tolerance: f32,
}

impl Locomotion {
    pub fn new(speed: f32, preferred_distance: f32, enemies: &EnemyConfig) -> Self {
        Self {
            speed,
            preferred_distance,
            retreat_factor: enemies.retreat_factor,
            kite_tolerance: enemies.kite_tolerance,
        }
    }
}

// ── Combatant ────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub shape: Ellipse,
    pub health: i32,
    pub max_health: i32,
    pub locomotion: Locomotion,
    pub kind: CombatantKind,
    /// Shots in flight.  Always empty for melee.
    pub projectiles: Vec<Projectile>,
    limits: FlightLimits,
    alive: bool,
}

impl Combatant {
    pub fn new(
        id: CombatantId,
        shape: Ellipse,
        max_health: i32,
        locomotion: Locomotion,
        kind: CombatantKind,
        limits: FlightLimits,
    ) -> Self {
        let max_health = max_health.max(1);
        Self {
            id,
            shape,
            health: max_health,
            max_health,
            locomotion,
            kind,
            projectiles: Vec::new(),
            limits,
            alive: true,
        }
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn center(&self) -> Vec2 {
        self.shape.center
    }

    pub fn distance_to(&self, target: Vec2) -> f32 {
        self.shape.center.distance(target)
    }

    /// Returns true only on the call that kills.  Dead combatants and
    /// non-positive amounts are no-ops.
    pub fn take_damage(&mut self, amount: i32) -> bool {
        if !self.alive || amount <= 0 {
            return false;
        }
        self.health = (self.health - amount).max(0);
        if self.health == 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Move relative to `target` and fly any shots in the air.
    pub fn tick(&mut self, target: Vec2, dt: f32) {
        for p in &mut self.projectiles {
            p.advance(dt);
        }
        self.projectiles.retain(Projectile::is_active);

        if !self.alive {
            return;
        }

        let to_target = target - self.shape.center;
        let distance = to_target.length();
        let heading = to_target.normalized();
        let loco = self.locomotion;

        if distance > loco.preferred_distance {
            let step = (loco.speed * dt).min(distance - loco.preferred_distance);
            self.shape.center += heading * step;
        } else if self.kind.kites() && distance < loco.preferred_distance - loco.kite_tolerance {
            let step = loco.speed * loco.retreat_factor * dt;
            self.shape.center += -heading * step;
        }
    }

    /// Run the variant's attack logic against `target`.
    ///
    /// Melee returns the contact damage dealt this tick; ranged and boss
    /// combatants push shots onto `projectiles` and return `None`.
    pub fn attack<R: Rng + ?Sized>(&mut self, target: Vec2, dt: f32, rng: &mut R) -> Option<i32> {
        if !self.alive {
            return None;
        }
        let origin = self.shape.center;
        let distance = origin.distance(target);
        let preferred = self.locomotion.preferred_distance;
        let limits = self.limits;

        match &mut self.kind {
            CombatantKind::Melee(melee) => {
                melee.cooldown_left = (melee.cooldown_left - dt).max(0.0);
                if distance <= preferred + melee.contact_margin && melee.cooldown_left <= 0.0 {
                    melee.cooldown_left = melee.contact_cooldown;
                    return Some(melee.contact_damage);
                }
                None
            }
            CombatantKind::Ranged(ranged) => {
                ranged.attack_timer = (ranged.attack_timer - dt).max(0.0);
                if distance <= ranged.attack_range && ranged.attack_timer <= 0.0 {
                    ranged.attack_timer = 1.0 / ranged.attack_speed;
                    self.projectiles.push(
                        Projectile::new(origin, target, ranged.projectile_speed, ranged.projectile_damage, limits)
                            .with_hits(1),
                    );
                }
                None
            }
            CombatantKind::Boss(boss) => {
                if distance > preferred * 1.5 {
                    return None;
                }
                if boss.is_bursting() {
                    boss.burst_timer += dt;
                    if boss.burst_timer >= boss.burst_delay {
                        let offset = (rng.gen::<f32>() - 0.5) * boss.jitter;
                        let angle = (target.y - origin.y).atan2(target.x - origin.x) + offset;
                        let aim = origin + Vec2::from_angle(angle) * BOSS_AIM_REACH;
                        self.projectiles.push(
                            Projectile::new(origin, aim, boss.projectile_speed, boss.projectile_damage, limits)
                                .with_hits(1),
                        );
                        boss.bursts_left -= 1;
                        boss.burst_timer = 0.0;
                    }
                } else {
                    boss.attack_timer += dt;
                    if boss.attack_timer >= 1.0 / boss.attack_speed {
                        boss.bursts_left = boss.burst_count;
                        boss.burst_timer = 0.0;
                        boss.attack_timer = 0.0;
                    }
                }
                None
            }
        }
    }

    /// Hand over every shot still in flight (used when this combatant dies).
    pub fn take_projectiles(&mut self) -> Vec<Projectile> {
        std::mem::take(&mut self.projectiles)
    }
}
