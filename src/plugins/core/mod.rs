//! Core plugin: shared resources, randomness, the attempt clock and the frame order.
//!
//! # Frame order
//! ```text
//! FixedUpdate      Clock -> Spawn -> Simulate
//! (physics step, CollisionStart messages)
//! FixedPostUpdate  Resolve -> Death -> Notify -> Commit -> Reclaim -> Aftermath
//!   Resolve        Shots -> Contacts -> Pickups
//! ```
//!
//! Within `Resolve`, shots land before body contacts. An enemy killed by a shot and
//! touched by the player in the same tick dies of the shot; the contact is stale and
//! the player takes no contact damage.
//!
//! `Death` is where entities detect their own terminal condition and mark themselves
//! `PendingReturn`. Every listener lives in `Notify`, strictly before `Commit` releases
//! anything, so listeners always read a dying entity's final state.

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::ecs::schedule::{InternedSystemSet, ScheduleConfigs};
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::pooling::PoolDiagnostics;

#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameSet {
    Clock,
    /// Orchestrator acquires new enemies.
    Spawn,
    /// Movement, timers, firing, bounds checks, effect waits.
    Simulate,
    /// Collision notifications turned into damage and pickups.
    Resolve,
    /// Terminal conditions detected, death events raised.
    Death,
    /// Listeners and spawn-request consumers.
    Notify,
    /// `PendingReturn` instances released to their pools.
    Commit,
    /// Bulk reclaim after the player died.
    Reclaim,
    Aftermath,
}

/// Collision outcomes of one tick, in precedence order.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResolveStep {
    /// Player and enemy shots.
    Shots,
    /// Player touching an enemy.
    Contacts,
    Pickups,
}

impl ResolveStep {
    pub fn order() -> ScheduleConfigs<InternedSystemSet> {
        (Self::Shots, Self::Contacts, Self::Pickups).chain()
    }
}

/// Seconds of play in the current attempt. Frozen once the player dies.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct GameClock {
    pub elapsed: f32,
    pub running: bool,
}

impl Default for GameClock {
    fn default() -> Self {
        Self { elapsed: 0.0, running: true }
    }
}

impl GameClock {
    pub fn stop(&mut self) {
        self.running = false;
    }
}

/// Single source of gameplay randomness. Seed it to make a run reproducible.
#[derive(Resource, Debug, Clone)]
pub struct GameRng(pub fastrand::Rng);

impl Default for GameRng {
    fn default() -> Self {
        Self(fastrand::Rng::new())
    }
}

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(fastrand::Rng::with_seed(seed))
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn unit(&mut self) -> f32 {
        self.0.f32()
    }

    #[inline]
    pub fn chance(&mut self, p: f32) -> bool {
        self.0.f32() < p
    }

    /// Uniform in `[lo, hi]`; `lo` when the range is empty.
    #[inline]
    pub fn range(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo { lo } else { lo + self.0.f32() * (hi - lo) }
    }

    /// Uniform offset in `[-extent, extent]` on each axis.
    pub fn jitter(&mut self, extent: Vec2) -> Vec2 {
        Vec2::new(self.range(-extent.x, extent.x), self.range(-extent.y, extent.y))
    }
}

/// Scene generation counter. Bumped on every scene reset.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SceneEpoch(pub u32);

impl SceneEpoch {
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Token for a wait started now.
    #[inline]
    pub fn token(&self) -> CancelToken {
        CancelToken { epoch: self.0 }
    }
}

/// Cancellation token of a cooperative wait.
///
/// A wait is abandoned once the scene it was started in has been reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CancelToken {
    epoch: u32,
}

impl CancelToken {
    #[inline]
    pub fn is_cancelled(&self, current: &SceneEpoch) -> bool {
        self.epoch != current.0
    }
}

pub fn plugin(app: &mut App) {
    if !app.world().contains_resource::<Tunables>() {
        app.insert_resource(Tunables::default());
    }
    if !app.world().contains_resource::<GameRng>() {
        app.insert_resource(GameRng::default());
    }
    app.insert_resource(ClearColor(Color::srgb(0.02, 0.02, 0.05)))
        .init_resource::<PoolDiagnostics>()
        .init_resource::<GameClock>()
        .init_resource::<SceneEpoch>();

    app.configure_sets(
        FixedUpdate,
        (FrameSet::Clock, FrameSet::Spawn, FrameSet::Simulate)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
    app.configure_sets(
        FixedPostUpdate,
        (
            FrameSet::Resolve,
            FrameSet::Death,
            FrameSet::Notify,
            FrameSet::Commit,
            FrameSet::Reclaim,
            FrameSet::Aftermath,
        )
            .chain()
            .after(CollisionEventSystems),
    );
    app.configure_sets(FixedPostUpdate, ResolveStep::order().in_set(FrameSet::Resolve));
    app.configure_sets(
        FixedPostUpdate,
        (FrameSet::Resolve, FrameSet::Death).run_if(in_state(GameState::InGame)),
    );
}
