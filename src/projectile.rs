/// Moving damage-dealing points.
///
/// A projectile only ever changes its own state.  Applying damage to whatever
/// it hit is the collision resolver's job (see `compute`).

use serde::{Deserialize, Serialize};

use crate::combatant::CombatantId;
use crate::geometry::{is_point_in_ellipse, is_point_in_rect, Ellipse, Rect, Vec2};

/// Where a projectile may live and for how long.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlightLimits {
    /// Leaving this rect deactivates the projectile.
    pub bounds: Rect,
    /// Seconds of flight before the projectile times out.
    pub lifetime: f32,
}

impl FlightLimits {
    /// The playfield grown by `padding` on every side.
    pub fn for_arena(arena: &Rect, padding: f32, lifetime: f32) -> Self {
        Self {
            bounds: arena.expanded(padding),
            lifetime,
        }
    }
}

/// What happens when the projectile connects.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum Impact {
    /// Deactivates on the first hit; with charges left a child projectile
    /// chains to the next target.
    Ricochet { charges: u32 },
    /// Absorbs `hits_left` hits before deactivating.
    MultiHit { hits_left: u32 },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Projectile {
    pub position: Vec2,
    /// Unit vector, or zero when fired at its own origin.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    pub impact: Impact,
    /// The combatant most recently hit; never hit twice in a row.
    pub last_hit: Option<CombatantId>,
    limits: FlightLimits,
    age: f32,
    active: bool,
}

impl Projectile {
    /// A single-impact projectile from `origin` toward `target`.
    pub fn new(origin: Vec2, target: Vec2, speed: f32, damage: i32, limits: FlightLimits) -> Self {
        Self {
            position: origin,
            direction: (target - origin).normalized(),
            speed,
            damage,
            impact: Impact::Ricochet { charges: 0 },
            last_hit: None,
            limits,
            age: 0.0,
            active: true,
        }
    }

    pub fn with_ricochet(mut self, charges: u32) -> Self {
        self.impact = Impact::Ricochet { charges };
        self
    }

    pub fn with_hits(mut self, hits: u32) -> Self {
        self.impact = Impact::MultiHit { hits_left: hits.max(1) };
        self
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn limits(&self) -> &FlightLimits {
        &self.limits
    }

    pub fn ricochet_charges(&self) -> u32 {
        match self.impact {
            Impact::Ricochet { charges } => charges,
            Impact::MultiHit { .. } => 0,
        }
    }

    /// Move along `direction`; deactivate when out of bounds or out of time.
    pub fn advance(&mut self, dt: f32) {
        if !self.active {
            return;
        }
        self.position += self.direction * (self.speed * dt);
        self.age += dt;
        if !is_point_in_rect(self.position, &self.limits.bounds) || self.age >= self.limits.lifetime {
            self.active = false;
        }
    }

    pub fn check_hit(&self, target: &Ellipse) -> bool {
        self.active && is_point_in_ellipse(self.position, target)
    }

    /// Same as `check_hit`, but refuses to hit `id` twice in a row.
    pub fn check_hit_on(&self, id: CombatantId, target: &Ellipse) -> bool {
        self.last_hit != Some(id) && self.check_hit(target)
    }

    /// Re-aim from the current position.
    pub fn retarget(&mut self, target: Vec2) {
        self.direction = (target - self.position).normalized();
    }

    /// Consume one impact.  `victim` is `None` when the tower was hit.
    pub fn register_hit(&mut self, victim: Option<CombatantId>) {
        if !self.active {
            return;
        }
        self.last_hit = victim;
        match &mut self.impact {
            Impact::Ricochet { .. } => self.active = false,
            Impact::MultiHit { hits_left } => {
                *hits_left = hits_left.saturating_sub(1);
                if *hits_left == 0 {
                    self.active = false;
                }
            }
        }
    }

    /// The chained projectile fired at `target` after hitting `victim`, if any
    /// charges remain.  Call before `register_hit`.
    pub fn spawn_ricochet(&self, victim: CombatantId, target: Vec2, falloff: f32) -> Option<Projectile> {
        let charges = self.ricochet_charges();
        if !self.active || charges == 0 {
            return None;
        }
        let mut child = self.clone();
        child.retarget(target);
        child.damage = ((self.damage as f32 * falloff).round() as i32).max(1);
        child.impact = Impact::Ricochet { charges: charges - 1 };
        child.last_hit = Some(victim);
        child.age = 0.0;
        Some(child)
    }
}
