/// The stationary defender.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::config::TowerConfig;
use crate::geometry::{Ellipse, Rect, Vec2};
use crate::projectile::{FlightLimits, Projectile};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tower {
    pub rect: Rect,
    pub damage: f32,
    pub range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    /// Seconds until the next shot is allowed.
    pub attack_cooldown: f32,
    pub ricochet_count: u32,
    pub health: i32,
    pub max_health: i32,
    pub projectile_speed: f32,
    pub projectiles: Vec<Projectile>,
    limits: FlightLimits,
}

impl Tower {
    /// A tower centred on `center`.
    pub fn new(center: Vec2, cfg: &TowerConfig, limits: FlightLimits) -> Self {
        Self {
            rect: Rect::centered(center, cfg.width, cfg.height),
            damage: cfg.damage,
            range: cfg.range,
            attack_speed: cfg.attack_speed,
            attack_cooldown: 1.0 / cfg.attack_speed,
            ricochet_count: cfg.ricochet_count,
            health: cfg.max_health,
            max_health: cfg.max_health,
            projectile_speed: cfg.projectile_speed,
            projectiles: Vec::new(),
            limits,
        }
    }

    pub fn center(&self) -> Vec2 {
        self.rect.center()
    }

    /// Ellipse approximation of the tower body used for incoming hits.
    pub fn hitbox(&self) -> Ellipse {
        Ellipse::inscribed(&self.rect)
    }

    pub fn is_destroyed(&self) -> bool {
        self.health <= 0
    }

    /// Nearest living combatant within range; the first one found wins ties.
    pub fn select_target<'a>(&self, combatants: &'a [Combatant]) -> Option<&'a Combatant> {
        let center = self.center();
        let mut best: Option<(&Combatant, f32)> = None;
        for c in combatants.iter().filter(|c| c.is_alive()) {
            let d = c.distance_to(center);
            if d > self.range {
                continue;
            }
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((c, d));
            }
        }
        best.map(|(c, _)| c)
    }

    /// [`advance`](Self::advance) then [`fire`](Self::fire) against the same
    /// positions.  Returns true when a shot was fired.
    pub fn tick(&mut self, dt: f32, combatants: &[Combatant]) -> bool {
        self.advance(dt);
        self.fire(combatants)
    }

    /// Run the cooldown down and fly existing shots.  Overshoot past zero is
    /// dropped, so the tower stays ready but never banks shots.
    pub fn advance(&mut self, dt: f32) {
        self.attack_cooldown = (self.attack_cooldown - dt).max(0.0);

        for p in &mut self.projectiles {
            p.advance(dt);
        }
        self.projectiles.retain(Projectile::is_active);
    }

    /// Shoot at the nearest combatant in range if the cooldown has run out.
    pub fn fire(&mut self, combatants: &[Combatant]) -> bool {
        if self.attack_cooldown > 0.0 {
            return false;
        }
        let Some(target) = self.select_target(combatants).map(Combatant::center) else {
            return false;
        };
        let shot = Projectile::new(
            self.center(),
            target,
            self.projectile_speed,
            self.damage.round() as i32,
            self.limits,
        )
        .with_ricochet(self.ricochet_count);
        self.projectiles.push(shot);
        self.attack_cooldown = 1.0 / self.attack_speed;
        true
    }

    pub fn take_damage(&mut self, amount: i32) {
        if amount > 0 {
            self.health = (self.health - amount).max(0);
        }
    }

    pub fn heal(&mut self, amount: i32) {
        if amount > 0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    // ── Upgrades (additive, never reducing) ─────────────────────────────────

    pub fn upgrade_damage(&mut self, amount: f32) {
        if amount > 0.0 {
            self.damage += amount;
        }
    }

    pub fn upgrade_attack_speed(&mut self, amount: f32) {
        if amount > 0.0 {
            self.attack_speed += amount;
        }
    }

    pub fn upgrade_range(&mut self, amount: f32) {
        if amount > 0.0 {
            self.range += amount;
        }
    }

    /// Raises max health and heals by the same amount.
    pub fn upgrade_max_health(&mut self, amount: i32) {
        if amount > 0 {
            self.max_health += amount;
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn upgrade_ricochet(&mut self, amount: u32) {
        self.ricochet_count += amount;
    }
}
