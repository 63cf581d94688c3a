//! Visual effects (particles), pooled per `EffectKind`.
//!
//! An effect is released only after its minimum duration has elapsed *and* its last
//! particle has died. Both are measured in simulated time, so a slowed effect
//! (`sim_speed < 1`) takes proportionally longer in real time.
//!
//! ```text
//! SpawnEffect --allocate_effects--> Active (wait started, token = SceneEpoch)
//!   advance_effects each fixed tick:
//!     Pending   -> keep waiting
//!     Finished  -> EffectFinished (if notify), return_to_pool
//!     Cancelled -> return_to_pool, no EffectFinished
//! ```

pub mod components;
pub mod messages;
pub mod pool;
pub mod systems;

use bevy::prelude::*;

use crate::plugins::core::FrameSet;
use crate::pooling::systems::commit_keyed_returns;

use components::Effect;

pub fn plugin(app: &mut App) {
    app.insert_resource(pool::build_pool())
        .add_message::<messages::SpawnEffect>()
        .add_message::<messages::EffectFinished>()
        .add_systems(Startup, pool::init_effect_pool)
        .add_systems(FixedUpdate, systems::advance_effects.in_set(FrameSet::Simulate))
        .add_systems(FixedPostUpdate, (
            systems::allocate_effects.in_set(FrameSet::Notify),
            commit_keyed_returns::<Effect>.in_set(FrameSet::Commit),
        ))
        .add_systems(Update, systems::fade_effects);
}
