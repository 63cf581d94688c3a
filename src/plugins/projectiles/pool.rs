use std::marker::PhantomData;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::pooling::{Factory, Pool, PoolDiagnostics};

use super::components::{Projectile, Side};

const RADIUS: f32 = 4.0;

pub struct ShotFactory<S: Side>(PhantomData<fn() -> S>);

impl<S: Side> Default for ShotFactory<S> {
    fn default() -> Self {
        Self(PhantomData)
    }
}

/// Idle shots keep their physics components; empty collision layers keep them out
/// of every contact.
impl<S: Side> Factory for ShotFactory<S> {
    fn create_new(&self, commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Name::new(format!("{}(Pooled)", S::KIND)),
                Projectile::<S>::idle(),
                Sprite {
                    color: S::COLOR,
                    custom_size: Some(Vec2::new(RADIUS * 1.5, RADIUS * 4.0)),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 2.0),
                Visibility::Hidden,
                RigidBody::Dynamic,
                Sensor,
                Collider::circle(RADIUS),
                CollisionLayers::NONE,
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ))
            .id()
    }
}

pub fn build_pool<S: Side>() -> Pool<Projectile<S>> {
    Pool::new(ShotFactory::<S>::default())
}

pub fn init_shot_pool<S: Side>(
    mut commands: Commands,
    mut pool: ResMut<Pool<Projectile<S>>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    tunables: Res<Tunables>,
) {
    pool.initialize();
    if let Err(err) = pool.prewarm(&mut commands, tunables.director.prewarm) {
        diagnostics.record(&err);
    }
}
