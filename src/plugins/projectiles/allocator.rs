//! Spawn consumer: activate shots from the pool of their side.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::pooling::{Pool, PoolDiagnostics};

use super::components::{Projectile, Side};
use super::messages::SpawnProjectile;

pub fn allocate_shots<S: Side>(
    mut commands: Commands,
    mut pool: ResMut<Pool<Projectile<S>>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut reader: MessageReader<SpawnProjectile>,
) {
    for req in reader.read().filter(|req| req.side == S::SIDE) {
        let e = match pool.acquire(&mut commands) {
            Ok(e) => e,
            Err(err) => {
                diagnostics.record(&err);
                continue;
            }
        };
        commands.entity(e).insert((
            Projectile::<S>::armed(req.damage),
            Transform::from_translation(req.position.extend(2.0)),
            LinearVelocity(req.velocity),
            Visibility::Visible,
            S::active_layers(),
        ));
    }
}
