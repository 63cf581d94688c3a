//! Closed variant sets of the keyed pools.

use serde::Deserialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum PowerUpKind {
    FireRate,
    Health,
    Shield,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [PowerUpKind::FireRate, PowerUpKind::Health, PowerUpKind::Shield];
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
pub enum EffectKind {
    /// Enemy or player death.
    Explosion,
    /// Projectile hit that did not kill.
    Impact,
}

impl EffectKind {
    pub const ALL: [EffectKind; 2] = [EffectKind::Explosion, EffectKind::Impact];
}
