/// Game tunables, loadable from TOML.
///
/// Every section is `#[serde(default)]`, so a file only needs the keys it
/// changes.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Configuration errors
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value outside its allowed range
    #[error("Invalid value for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub arena: ArenaConfig,
    pub tower: TowerConfig,
    pub waves: WaveConfig,
    pub enemies: EnemyConfig,
    pub upgrades: UpgradeConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    pub width: f32,
    pub height: f32,
    /// Margin beyond the playfield before a projectile is discarded.
    pub projectile_padding: f32,
    /// Seconds a projectile may fly before it times out.
    pub projectile_lifetime: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 846.0,
            height: 500.0,
            projectile_padding: 50.0,
            projectile_lifetime: 8.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TowerConfig {
    pub width: f32,
    pub height: f32,
    pub damage: f32,
    pub range: f32,
    /// Attacks per second.
    pub attack_speed: f32,
    pub max_health: i32,
    pub projectile_speed: f32,
    pub ricochet_count: u32,
    /// Damage multiplier applied to each chained projectile.
    pub ricochet_falloff: f32,
    /// Chain search radius as a multiple of the tower's range.
    pub ricochet_range_factor: f32,
}

impl Default for TowerConfig {
    fn default() -> Self {
        Self {
            width: 30.0,
            height: 50.0,
            damage: 5.0,
            range: 150.0,
            attack_speed: 1.0,
            max_health: 100,
            projectile_speed: 300.0,
            ricochet_count: 0,
            ricochet_falloff: 0.8,
            ricochet_range_factor: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    pub initial_required: u32,
    pub required_per_wave: u32,
    pub initial_spawn_interval: f32,
    pub spawn_interval_step: f32,
    pub min_spawn_interval: f32,
    pub max_concurrent: usize,
    /// Every n-th wave is a boss wave.
    pub boss_every: u32,
    /// Percent chance a regular spawn is ranged.
    pub ranged_chance: u32,
    /// Tower heal granted when a wave is cleared.
    pub wave_clear_heal: i32,
    pub damage_multiplier_step: f32,
    pub damage_multiplier_cap: f32,
    pub attack_speed_multiplier_step: f32,
    pub attack_speed_multiplier_cap: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            initial_required: 5,
            required_per_wave: 2,
            initial_spawn_interval: 2.0,
            spawn_interval_step: 0.1,
            min_spawn_interval: 0.5,
            max_concurrent: 10,
            boss_every: 5,
            ranged_chance: 30,
            wave_clear_heal: 20,
            damage_multiplier_step: 0.2,
            damage_multiplier_cap: 3.0,
            attack_speed_multiplier_step: 0.15,
            attack_speed_multiplier_cap: 2.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub radius: f32,
    /// Fraction of walking speed used when backing off.
    pub retreat_factor: f32,
    /// Slack below the preferred distance before a kiting enemy backs off.
    pub kite_tolerance: f32,
    pub melee: MeleeConfig,
    pub ranged: RangedConfig,
    pub boss: BossConfig,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            radius: 15.0,
            retreat_factor: 0.5,
            kite_tolerance: 5.0,
            melee: MeleeConfig::default(),
            ranged: RangedConfig::default(),
            boss: BossConfig::default(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeleeConfig {
    pub base_health: i32,
    pub health_per_wave: i32,
    pub base_speed: f32,
    pub speed_per_wave: f32,
    pub preferred_distance: f32,
    /// Extra reach beyond the preferred distance that still counts as contact.
    pub contact_margin: f32,
    pub contact_damage: i32,
    pub contact_cooldown: f32,
}

impl Default for MeleeConfig {
    fn default() -> Self {
        Self {
            base_health: 3,
            health_per_wave: 1,
            base_speed: 40.0,
            speed_per_wave: 5.0,
            preferred_distance: 30.0,
            contact_margin: 10.0,
            contact_damage: 5,
            contact_cooldown: 1.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangedConfig {
    pub base_health: i32,
    pub health_per_wave: i32,
    pub base_speed: f32,
    pub speed_per_wave: f32,
    pub preferred_distance: f32,
    pub attack_range: f32,
    pub attack_speed: f32,
    pub projectile_damage: f32,
    pub projectile_speed: f32,
}

impl Default for RangedConfig {
    fn default() -> Self {
        Self {
            base_health: 2,
            health_per_wave: 1,
            base_speed: 35.0,
            speed_per_wave: 4.0,
            preferred_distance: 120.0,
            attack_range: 150.0,
            attack_speed: 0.67,
            projectile_damage: 5.0,
            projectile_speed: 200.0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossConfig {
    pub radius: f32,
    pub base_health: i32,
    pub health_per_wave: i32,
    pub base_speed: f32,
    pub speed_per_wave: f32,
    pub preferred_distance: f32,
    pub attack_speed: f32,
    pub projectile_damage: f32,
    pub projectile_speed: f32,
    pub burst_count: u32,
    pub burst_delay: f32,
    /// Full width of the aim jitter in radians at power level 1.
    pub jitter: f32,
}

impl Default for BossConfig {
    fn default() -> Self {
        Self {
            radius: 30.0,
            base_health: 40,
            health_per_wave: 10,
            base_speed: 20.0,
            speed_per_wave: 2.0,
            preferred_distance: 100.0,
            attack_speed: 0.5,
            projectile_damage: 4.0,
            projectile_speed: 250.0,
            burst_count: 3,
            burst_delay: 0.2,
            jitter: 0.3,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeConfig {
    pub damage: f32,
    pub attack_speed: f32,
    pub range: f32,
    pub max_health: f32,
    pub ricochet: f32,
}

impl Default for UpgradeConfig {
    fn default() -> Self {
        Self {
            damage: 2.0,
            attack_speed: 0.2,
            range: 25.0,
            max_health: 20.0,
            ricochet: 1.0,
        }
    }
}

// ── Loading ──────────────────────────────────────────────────────────────────

fn positive(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("must be a positive number, got {value}"),
        })
    }
}

fn unit_interval(key: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            reason: format!("must lie in 0..=1, got {value}"),
        })
    }
}

impl GameConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Missing file → defaults.  Unreadable or invalid file → warning + defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => {
                log::info!("loaded config from {}", path.display());
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("ignoring config at {}: {e}", path.display());
                Self::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("arena.width", self.arena.width)?;
        positive("arena.height", self.arena.height)?;
        positive("arena.projectile_lifetime", self.arena.projectile_lifetime)?;
        if self.arena.projectile_padding < 0.0 {
            return Err(ConfigError::Invalid {
                key: "arena.projectile_padding",
                reason: "must not be negative".to_string(),
            });
        }

        positive("tower.width", self.tower.width)?;
        positive("tower.height", self.tower.height)?;
        positive("tower.range", self.tower.range)?;
        positive("tower.attack_speed", self.tower.attack_speed)?;
        positive("tower.projectile_speed", self.tower.projectile_speed)?;
        positive("tower.max_health", self.tower.max_health as f32)?;
        unit_interval("tower.ricochet_falloff", self.tower.ricochet_falloff)?;
        positive("tower.ricochet_range_factor", self.tower.ricochet_range_factor)?;

        positive("waves.initial_spawn_interval", self.waves.initial_spawn_interval)?;
        positive("waves.min_spawn_interval", self.waves.min_spawn_interval)?;
        positive("waves.initial_required", self.waves.initial_required as f32)?;
        positive("waves.max_concurrent", self.waves.max_concurrent as f32)?;
        positive("waves.boss_every", self.waves.boss_every as f32)?;
        if self.waves.ranged_chance > 100 {
            return Err(ConfigError::Invalid {
                key: "waves.ranged_chance",
                reason: format!("is a percentage, got {}", self.waves.ranged_chance),
            });
        }

        positive("enemies.radius", self.enemies.radius)?;
        positive("enemies.boss.radius", self.enemies.boss.radius)?;
        positive("enemies.melee.contact_cooldown", self.enemies.melee.contact_cooldown)?;
        positive("enemies.ranged.attack_speed", self.enemies.ranged.attack_speed)?;
        positive("enemies.boss.attack_speed", self.enemies.boss.attack_speed)?;
        positive("enemies.boss.burst_delay", self.enemies.boss.burst_delay)?;
        unit_interval("enemies.retreat_factor", self.enemies.retreat_factor)?;
        Ok(())
    }
}
