use bevy::prelude::*;

use crate::common::kinds::EffectKind;

/// Request to play a pooled effect.
#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnEffect {
    pub kind: EffectKind,
    pub position: Vec2,
    pub sim_speed: f32,
    pub notify: bool,
}

impl SpawnEffect {
    pub fn at(kind: EffectKind, position: Vec2) -> Self {
        Self { kind, position, sim_speed: 1.0, notify: false }
    }
}

/// An effect played with `notify` has completed its finish protocol.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EffectFinished {
    pub entity: Entity,
    pub kind: EffectKind,
}
