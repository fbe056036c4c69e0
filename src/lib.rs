//! Tower defence simulation core.
//!
//! A single stationary tower in the middle of a rectangular arena fends off
//! waves of melee, ranged and boss combatants.  Between waves the player
//! picks one upgrade card.  Everything here is presentation-agnostic: the
//! binary supplies a [`render::Canvas`], real time and input events.

pub mod combatant;
pub mod compute;
pub mod config;
pub mod director;
pub mod entities;
pub mod geometry;
pub mod highscore;
pub mod projectile;
pub mod render;
pub mod tower;
pub mod upgrade;
