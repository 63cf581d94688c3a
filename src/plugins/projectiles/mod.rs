//! Projectiles plugin: two simple pools, one per side, fed by buffered requests.
//!
//! # Data flow
//! ```text
//! FixedUpdate / Simulate
//!   player auto-fire, enemy fire timers  --> SpawnProjectile
//!   return_out_of_bounds::<PlayerShot|EnemyShot>
//!
//! (physics step emits CollisionStart)
//!
//! FixedPostUpdate
//!   Resolve  resolve_player_shots: damage enemy, ShotHit, shot -> PendingReturn
//!            resolve_enemy_shots:  damage player,          shot -> PendingReturn
//!   Notify   allocate_shots::<Friendly|Hostile>: pool.acquire + activate
//!   Commit   commit_returns::<PlayerShot|EnemyShot>: idle invariants + release
//! ```
//!
//! Producers never borrow a pool. The allocator of each side is the single writer
//! of that side's pool during play; the commit system and the scene reclaim are the
//! only other places that touch it.

pub mod allocator;
pub mod collision;
pub mod components;
pub mod messages;
pub mod pool;

use bevy::prelude::*;

use crate::common::bounds::return_out_of_bounds;
use crate::plugins::core::{FrameSet, ResolveStep};
use crate::pooling::systems::commit_returns;

use components::{EnemyShot, Friendly, Hostile, PlayerShot};

pub struct ProjectilesPlugin;

impl Plugin for ProjectilesPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(pool::build_pool::<Friendly>())
            .insert_resource(pool::build_pool::<Hostile>())
            .add_message::<messages::SpawnProjectile>()
            .add_message::<messages::ShotHit>()
            .add_systems(
                Startup,
                (pool::init_shot_pool::<Friendly>, pool::init_shot_pool::<Hostile>),
            );

        app.add_systems(
            FixedUpdate,
            (return_out_of_bounds::<PlayerShot>, return_out_of_bounds::<EnemyShot>)
                .in_set(FrameSet::Simulate),
        );

        app.add_systems(
            FixedPostUpdate,
            (
                (collision::resolve_player_shots, collision::resolve_enemy_shots)
                    .in_set(ResolveStep::Shots),
                (allocator::allocate_shots::<Friendly>, allocator::allocate_shots::<Hostile>)
                    .in_set(FrameSet::Notify),
                (commit_returns::<PlayerShot>, commit_returns::<EnemyShot>)
                    .in_set(FrameSet::Commit),
            ),
        );
    }
}
