//! Effect pool: one lane per `EffectKind`, all prewarmed at startup.

use bevy::prelude::*;

use crate::common::kinds::EffectKind;
use crate::common::tunables::Tunables;
use crate::plugins::core::{GameRng, SceneEpoch};
use crate::pooling::{Factory, KeyedPool, PoolDiagnostics, PoolError};

use super::components::Effect;
use super::messages::SpawnEffect;

pub type EffectPool = KeyedPool<Effect>;

pub struct EffectFactory {
    pub kind: EffectKind,
}

impl EffectFactory {
    fn look(&self) -> (Color, f32) {
        match self.kind {
            EffectKind::Explosion => (Color::srgb(1.0, 0.55, 0.15), 48.0),
            EffectKind::Impact => (Color::srgb(0.9, 0.9, 1.0), 14.0),
        }
    }
}

impl Factory for EffectFactory {
    fn create_new(&self, commands: &mut Commands) -> Entity {
        let (color, size) = self.look();
        commands
            .spawn((
                Name::new(format!("{:?}(Pooled)", self.kind)),
                Effect::idle(self.kind),
                Sprite { color, custom_size: Some(Vec2::splat(size)), ..default() },
                Transform::from_xyz(0.0, 0.0, 5.0),
                Visibility::Hidden,
            ))
            .id()
    }
}

pub fn build_pool() -> EffectPool {
    EffectKind::ALL
        .into_iter()
        .fold(EffectPool::new(), |pool, kind| pool.with_factory(kind, EffectFactory { kind }))
}

pub fn init_effect_pool(
    mut commands: Commands,
    mut pool: ResMut<EffectPool>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    tunables: Res<Tunables>,
) {
    pool.initialize();
    for kind in EffectKind::ALL {
        if let Err(err) = pool.prewarm(&mut commands, kind, tunables.director.prewarm) {
            diagnostics.record(&err);
        }
    }
}

/// Acquire and start an effect. The wait it starts is bound to the current scene epoch.
pub fn play_effect(
    commands: &mut Commands,
    pool: &mut EffectPool,
    rng: &mut GameRng,
    tunables: &Tunables,
    epoch: &SceneEpoch,
    req: &SpawnEffect,
) -> Result<Entity, PoolError> {
    let e = pool.acquire(commands, req.kind)?;
    let effect = Effect::play(
        req.kind,
        tunables.effects.get(req.kind),
        req.sim_speed,
        req.notify,
        epoch.token(),
        rng,
    );
    commands.entity(e).insert((
        effect,
        Transform::from_translation(req.position.extend(5.0)),
        Visibility::Visible,
    ));
    Ok(e)
}
