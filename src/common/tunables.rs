//! Tunable gameplay constants.
//!
//! Loaded once before the pools are initialized and never written afterwards.
//! Every section falls back to its defaults, so a balance file only needs the values
//! it changes:
//!
//! ```ron
//! (
//!     enemy: (min_health: 3, can_fire_chance: 0.6),
//!     power_ups: (drop_weights: [(FireRate, 2.0), (Health, 1.0)]),
//! )
//! ```

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

use super::kinds::{EffectKind, PowerUpKind};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read balance file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse balance file: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid balance value: {0}")]
    Invalid(String),
}

#[derive(Resource, Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Tunables {
    pub world: WorldTuning,
    pub game: GameTuning,
    pub director: DirectorTuning,
    pub player: PlayerTuning,
    pub enemy: EnemyTuning,
    pub projectiles: ProjectileTuning,
    pub power_ups: PowerUpTuning,
    pub effects: EffectsTuning,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WorldTuning {
    pub pixels_per_meter: f32,
    /// Half extents of the visible play area, in pixels.
    pub half_size: [f32; 2],
    /// Tolerance past the edge, as a fraction of the full play area size.
    pub margin: f32,
}

impl Default for WorldTuning {
    fn default() -> Self {
        Self { pixels_per_meter: 20.0, half_size: [640.0, 360.0], margin: 0.1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GameTuning {
    pub score_per_kill: u32,
    /// Award kill score for enemies destroyed by ramming the player.
    pub score_on_collision: bool,
}

impl Default for GameTuning {
    fn default() -> Self {
        Self { score_per_kill: 10, score_on_collision: false }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    pub enemy_spawn_interval: f32,
    pub spawn_origin: [f32; 2],
    /// Uniform random offset range on each axis around `spawn_origin`.
    pub spawn_jitter: [f32; 2],
    /// Simulation speed of the player's death explosion.
    pub death_explosion_speed: f32,
    /// Idle instances built per pool at startup.
    pub prewarm: usize,
}

impl Default for DirectorTuning {
    fn default() -> Self {
        Self {
            enemy_spawn_interval: 1.5,
            spawn_origin: [0.0, 400.0],
            spawn_jitter: [560.0, 30.0],
            death_explosion_speed: 0.1,
            prewarm: 16,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlayerTuning {
    pub max_health: i32,
    pub max_shield: u8,
    pub move_speed: f32,
    pub fire_interval: f32,
    pub spawn_position: [f32; 2],
    /// Highest y the player may move to.
    pub ceiling: f32,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            max_health: 3,
            max_shield: 2,
            move_speed: 420.0,
            fire_interval: 0.35,
            spawn_position: [0.0, -260.0],
            ceiling: 0.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyTuning {
    pub min_health: i32,
    pub max_health: i32,
    /// Seconds of play per extra point of spawn health.
    pub health_ramp_interval: f32,
    pub speed: f32,
    pub fire_interval: f32,
    pub can_fire_chance: f32,
    pub projectile_speed: f32,
    pub power_up_drop_chance: f32,
    /// Damage dealt to the player when rammed.
    pub contact_damage: i32,
}

impl Default for EnemyTuning {
    fn default() -> Self {
        Self {
            min_health: 2,
            max_health: 5,
            health_ramp_interval: 15.0,
            speed: 90.0,
            fire_interval: 2.5,
            can_fire_chance: 0.4,
            projectile_speed: 220.0,
            power_up_drop_chance: 0.1,
            contact_damage: 1,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProjectileTuning {
    pub player_speed: f32,
    pub player_damage: i32,
    pub enemy_damage: i32,
}

impl Default for ProjectileTuning {
    fn default() -> Self {
        Self { player_speed: 600.0, player_damage: 1, enemy_damage: 1 }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub fall_speed: f32,
    /// Fire interval multiplier applied once per fire-rate pickup.
    pub fire_rate_factor: f32,
    /// Relative drop weights. Kinds missing here never drop.
    pub drop_weights: Vec<(PowerUpKind, f32)>,
    /// Kinds the power-up pool can build. A drop of any other kind is skipped.
    pub factories: Vec<PowerUpKind>,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            fall_speed: 120.0,
            fire_rate_factor: 0.85,
            drop_weights: vec![
                (PowerUpKind::FireRate, 1.0),
                (PowerUpKind::Health, 1.0),
                (PowerUpKind::Shield, 0.5),
            ],
            factories: PowerUpKind::ALL.to_vec(),
        }
    }
}

impl PowerUpTuning {
    /// Weighted pick over `drop_weights`; `roll` is uniform in `[0, 1)`.
    pub fn pick(&self, roll: f32) -> Option<PowerUpKind> {
        let total: f32 = self.drop_weights.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let mut remaining = roll * total;
        for (kind, weight) in &self.drop_weights {
            remaining -= weight.max(0.0);
            if remaining < 0.0 {
                return Some(*kind);
            }
        }
        None
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmitterTuning {
    pub count: u32,
    /// Per-particle lifetime range in simulated seconds.
    pub lifetime: [f32; 2],
}

#[derive(Debug, Clone, Deserialize)]
pub struct EffectTuning {
    /// Minimum simulated time before the effect may finish.
    pub duration: f32,
    pub emitters: Vec<EmitterTuning>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EffectsTuning {
    pub explosion: EffectTuning,
    pub impact: EffectTuning,
}

impl Default for EffectsTuning {
    fn default() -> Self {
        Self {
            explosion: EffectTuning {
                duration: 1.0,
                emitters: vec![
                    EmitterTuning { count: 24, lifetime: [0.4, 1.2] },
                    EmitterTuning { count: 8, lifetime: [0.8, 1.6] },
                ],
            },
            impact: EffectTuning {
                duration: 0.25,
                emitters: vec![EmitterTuning { count: 6, lifetime: [0.1, 0.3] }],
            },
        }
    }
}

impl EffectsTuning {
    pub fn get(&self, kind: EffectKind) -> &EffectTuning {
        match kind {
            EffectKind::Explosion => &self.explosion,
            EffectKind::Impact => &self.impact,
        }
    }
}

impl Tunables {
    pub fn from_ron_str(src: &str) -> Result<Self, ConfigError> {
        let tunables: Self = ron::from_str(src)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let src = std::fs::read_to_string(path)?;
        Self::from_ron_str(&src)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let e = &self.enemy;
        if e.min_health > e.max_health {
            return Err(ConfigError::Invalid(format!(
                "enemy.min_health ({}) exceeds enemy.max_health ({})",
                e.min_health, e.max_health
            )));
        }
        let positive = [
            ("enemy.health_ramp_interval", e.health_ramp_interval),
            ("enemy.fire_interval", e.fire_interval),
            ("player.fire_interval", self.player.fire_interval),
            ("director.enemy_spawn_interval", self.director.enemy_spawn_interval),
            ("director.death_explosion_speed", self.director.death_explosion_speed),
            ("power_ups.fire_rate_factor", self.power_ups.fire_rate_factor),
        ];
        // Negated so NaN fails too.
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")));
        }

        for kind in EffectKind::ALL {
            let effect = self.effects.get(kind);
            if !(effect.duration >= 0.0 && effect.duration.is_finite()) {
                return Err(ConfigError::Invalid(format!(
                    "effects.{kind:?}.duration must be finite and non-negative, got {}",
                    effect.duration
                )));
            }
            for emitter in &effect.emitters {
                let [lo, hi] = emitter.lifetime;
                if !(lo >= 0.0 && lo <= hi && hi.is_finite()) {
                    return Err(ConfigError::Invalid(format!(
                        "effects.{kind:?} emitter lifetime must be a finite range [lo, hi] with 0 <= lo <= hi, got [{lo}, {hi}]"
                    )));
                }
            }
        }
        Ok(())
    }

    #[inline]
    pub fn player_spawn(&self) -> Vec2 {
        Vec2::from_array(self.player.spawn_position)
    }
}
