//! Release path shared by every pool.
//!
//! Entities only ever flip themselves to `PendingReturn`. These systems are the single
//! place that writes the *idle invariants* and touches pool collections on release:
//!
//! Idle instances must be:
//! - `Lifecycle::Idle`, with per-activation state cleared
//! - hidden
//! - velocity = 0 (bodies only)
//! - colliding with nothing (bodies only)
//!
//! The commit systems run after every listener of the tick, so listeners always see
//! a dying instance in its final active state.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::contract::{Keyed, Lifecycle, Poolable};
use super::diagnostics::PoolDiagnostics;
use super::keyed::KeyedPool;
use super::pool::Pool;

/// Write the idle invariants onto one instance.
pub fn deactivate<T: Poolable>(
    item: &mut T,
    vis: &mut Visibility,
    vel: Option<&mut LinearVelocity>,
    layers: Option<&mut CollisionLayers>,
) {
    item.clear();
    item.set_lifecycle(Lifecycle::Idle);
    *vis = Visibility::Hidden;
    if let Some(vel) = vel {
        vel.0 = Vec2::ZERO;
    }
    if let Some(layers) = layers {
        *layers = CollisionLayers::NONE;
    }
}

/// Components written on release. Effects carry no physics body.
type IdleParts = (
    &'static mut Visibility,
    Option<&'static mut LinearVelocity>,
    Option<&'static mut CollisionLayers>,
);

/// Release every `PendingReturn` instance of `T` back to `Pool<T>`.
pub fn commit_returns<T: Poolable>(
    mut pool: ResMut<Pool<T>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q: Query<(Entity, &mut T, IdleParts)>,
) {
    for (e, mut item, (mut vis, mut vel, mut layers)) in &mut q {
        if item.lifecycle() != Lifecycle::PendingReturn {
            continue;
        }
        deactivate(&mut *item, &mut vis, vel.as_deref_mut(), layers.as_deref_mut());
        if let Err(err) = pool.release(e) {
            diagnostics.record(&err);
        }
    }
}

/// Keyed counterpart of [`commit_returns`]: releases under the key each instance
/// was acquired with.
pub fn commit_keyed_returns<T: Keyed>(
    mut pool: ResMut<KeyedPool<T>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q: Query<(Entity, &mut T, IdleParts)>,
) {
    for (e, mut item, (mut vis, mut vel, mut layers)) in &mut q {
        if item.lifecycle() != Lifecycle::PendingReturn {
            continue;
        }
        let key = item.pool_key();
        deactivate(&mut *item, &mut vis, vel.as_deref_mut(), layers.as_deref_mut());
        if let Err(err) = pool.release(e, key) {
            diagnostics.record(&err);
        }
    }
}

/// Bulk reclaim of `Pool<T>`: every active instance runs its own return path
/// (`return_to_pool` then the release commit) exactly once.
pub fn reclaim_pool<T: Poolable>(
    mut pool: ResMut<Pool<T>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q: Query<(&mut T, IdleParts)>,
) {
    let report = pool.return_all_active(|pool, e| {
        let Ok((mut item, (mut vis, mut vel, mut layers))) = q.get_mut(e) else {
            return;
        };
        item.return_to_pool();
        deactivate(&mut *item, &mut vis, vel.as_deref_mut(), layers.as_deref_mut());
        if let Err(err) = pool.release(e) {
            diagnostics.record(&err);
        }
    });
    diagnostics.forced_reclaims += report.forced as u32;
    if report.reclaimed > 0 {
        debug!("reclaimed {} {} instances", report.reclaimed, T::KIND);
    }
}

/// Bulk reclaim of `KeyedPool<T>`.
pub fn reclaim_keyed_pool<T: Keyed>(
    mut pool: ResMut<KeyedPool<T>>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q: Query<(&mut T, IdleParts)>,
) {
    let report = pool.return_all_active(|pool, e| {
        let Ok((mut item, (mut vis, mut vel, mut layers))) = q.get_mut(e) else {
            return;
        };
        item.return_to_pool();
        let key = item.pool_key();
        deactivate(&mut *item, &mut vis, vel.as_deref_mut(), layers.as_deref_mut());
        if let Err(err) = pool.release(e, key) {
            diagnostics.record(&err);
        }
    });
    diagnostics.forced_reclaims += report.forced as u32;
    if report.reclaimed > 0 {
        debug!("reclaimed {} {} instances", report.reclaimed, T::KIND);
    }
}
