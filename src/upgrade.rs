/// Between-wave upgrade cards.

use serde::{Deserialize, Serialize};

use crate::config::UpgradeConfig;
use crate::geometry::{is_point_in_rect, Rect, Vec2};
use crate::tower::Tower;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UpgradeKind {
    Damage,
    AttackSpeed,
    Range,
    MaxHealth,
    Ricochet,
}

impl UpgradeKind {
    pub const ALL: [UpgradeKind; 5] = [
        UpgradeKind::Damage,
        UpgradeKind::AttackSpeed,
        UpgradeKind::Range,
        UpgradeKind::MaxHealth,
        UpgradeKind::Ricochet,
    ];

    pub fn name(self) -> &'static str {
        match self {
            UpgradeKind::Damage => "Damage Up",
            UpgradeKind::AttackSpeed => "Attack Speed Up",
            UpgradeKind::Range => "Range Up",
            UpgradeKind::MaxHealth => "Max Health Up",
            UpgradeKind::Ricochet => "Ricochet",
        }
    }

    pub fn describe(self, amount: f32) -> String {
        match self {
            UpgradeKind::Damage => format!("Increase tower damage by {}", amount.round() as i32),
            UpgradeKind::AttackSpeed => format!("Increase attack speed by {amount:.1}"),
            UpgradeKind::Range => format!("Increase tower range by {}", amount.round() as i32),
            UpgradeKind::MaxHealth => format!("Increase max tower health by {}", amount.round() as i32),
            UpgradeKind::Ricochet => {
                let n = amount.round() as i32;
                format!("Bullets ricochet to {n} more {}", if n == 1 { "enemy" } else { "enemies" })
            }
        }
    }
}

/// Apply one upgrade of `kind` with magnitude `amount`.  Always additive.
pub fn apply(tower: &mut Tower, kind: UpgradeKind, amount: f32) {
    match kind {
        UpgradeKind::Damage => tower.upgrade_damage(amount),
        UpgradeKind::AttackSpeed => tower.upgrade_attack_speed(amount),
        UpgradeKind::Range => tower.upgrade_range(amount),
        UpgradeKind::MaxHealth => tower.upgrade_max_health(amount.round().max(0.0) as i32),
        UpgradeKind::Ricochet => tower.upgrade_ricochet(amount.round().max(0.0) as u32),
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Upgrade {
    pub kind: UpgradeKind,
    pub name: String,
    pub description: String,
    pub amount: f32,
}

impl Upgrade {
    pub fn new(kind: UpgradeKind, amount: f32) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            description: kind.describe(amount),
            amount,
        }
    }

    pub fn apply(&self, tower: &mut Tower) {
        apply(tower, self.kind, self.amount);
    }
}

/// The menu offered after a wave: one card per kind, in a fixed order.
pub fn offer(cfg: &UpgradeConfig) -> Vec<Upgrade> {
    UpgradeKind::ALL
        .iter()
        .map(|&kind| {
            let amount = match kind {
                UpgradeKind::Damage => cfg.damage,
                UpgradeKind::AttackSpeed => cfg.attack_speed,
                UpgradeKind::Range => cfg.range,
                UpgradeKind::MaxHealth => cfg.max_health,
                UpgradeKind::Ricochet => cfg.ricochet,
            };
            Upgrade::new(kind, amount)
        })
        .collect()
}

// ── Card layout ──────────────────────────────────────────────────────────────

const CARD_GAP: f32 = 12.0;
const CARD_MAX_WIDTH: f32 = 140.0;
const CARD_ASPECT: f32 = 1.4;

/// Card rectangles for `count` cards, in a centred row across `arena`.
/// Shared by drawing and mouse hit-testing.
pub fn card_rects(arena: &Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    let n = count as f32;
    let width = ((arena.width * 0.9 - CARD_GAP * (n - 1.0)) / n).min(CARD_MAX_WIDTH).max(1.0);
    let height = (width * CARD_ASPECT).min(arena.height * 0.5);
    let row_width = width * n + CARD_GAP * (n - 1.0);
    let left = arena.left + (arena.width - row_width) / 2.0;
    let bottom = arena.center().y - height / 2.0;
    (0..count)
        .map(|i| Rect::new(left + i as f32 * (width + CARD_GAP), bottom, width, height))
        .collect()
}

/// Index of the card under `point`, if any.
pub fn card_at(arena: &Rect, count: usize, point: Vec2) -> Option<usize> {
    card_rects(arena, count)
        .iter()
        .position(|r| is_point_in_rect(point, r))
}
