/// Match-wide state and input types: pure data, no logic.

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::config::GameConfig;
use crate::director::{Difficulty, WaveState};
use crate::geometry::{Rect, Vec2};
use crate::projectile::{FlightLimits, Projectile};
use crate::tower::Tower;
use crate::upgrade::Upgrade;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    UpgradeMenu,
    GameOver,
}

// ── Input ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Enter,
    Space,
    Escape,
    Char(char),
}

/// Platform input, already translated into playfield coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum InputEvent {
    KeyDown(Key),
    KeyUp(Key),
    MouseMotion { at: Vec2 },
    /// `clicks` is 2 for the second press of a double click.
    MouseDown { at: Vec2, clicks: u8 },
    MouseUp { at: Vec2 },
}

// ── Master match state ───────────────────────────────────────────────────────

/// Everything the simulation owns.  Cloneable so the controller's update
/// functions can return a new copy without mutating the original.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchState {
    pub arena: Rect,
    pub limits: FlightLimits,
    pub tower: Tower,
    pub combatants: Vec<Combatant>,
    /// Shots whose shooter has died; they keep flying at the tower.
    pub stray_projectiles: Vec<Projectile>,
    pub wave: WaveState,
    pub difficulty: Difficulty,
    pub status: GameStatus,
    /// Cards offered in the upgrade menu; empty while playing.
    pub upgrades: Vec<Upgrade>,
    pub selected_upgrade: usize,
    pub total_kills: u32,
    /// Best wave reached, including this match.
    pub high_score: u32,
    pub config: GameConfig,
}

impl MatchState {
    pub fn living_count(&self) -> usize {
        self.combatants.iter().filter(|c| c.is_alive()).count()
    }
}
