//! Test helpers.
//!
//! Unit tests drive systems directly against a bare `World` instead of building an `App`.
//! `run_system_once` flushes afterwards so queued commands are visible to assertions.
//! Pool calls outside a system go through [`with_commands`], which applies its queue the
//! same way a system's commands are applied when the system ends.

use avian2d::prelude::*;
use bevy::ecs::message::{Message, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::ecs::world::CommandQueue;
use bevy::prelude::*;

use crate::common::bounds::PlayArea;
use crate::common::tunables::Tunables;
use crate::plugins::core::{GameClock, GameRng, SceneEpoch};
use crate::pooling::PoolDiagnostics;

/// Run a system once on the given world, then flush deferred commands.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// Run `f` with a `Commands` bound to `world`, then apply what it queued.
pub fn with_commands<T>(world: &mut World, f: impl FnOnce(&mut Commands) -> T) -> T {
    let mut queue = CommandQueue::default();
    let result = {
        let mut commands = Commands::new(&mut queue, world);
        f(&mut commands)
    };
    queue.apply(world);
    result
}

/// Register the message buffer for `M` if the world lacks one.
pub fn ensure_messages<M: Message>(world: &mut World) {
    if world.get_resource::<Messages<M>>().is_none() {
        world.init_resource::<Messages<M>>();
    }
}

pub fn send<M: Message>(world: &mut World, msg: M) {
    ensure_messages::<M>(world);
    world.write_message(msg);
}

/// Every message of type `M` currently buffered, oldest first.
pub fn drain<M: Message + Clone>(world: &mut World) -> Vec<M> {
    ensure_messages::<M>(world);
    world.resource_mut::<Messages<M>>().drain().collect()
}

/// Inject a physics contact between two bodies, as the collision pipeline reports it.
pub fn touch(world: &mut World, a: Entity, b: Entity) {
    send(world, CollisionStart { collider1: a, collider2: b, body1: Some(a), body2: Some(b) });
}

/// A world holding the shared resources every gameplay system reads.
pub fn gameplay_world() -> World {
    let mut world = World::new();
    world.insert_resource(Tunables::default());
    world.insert_resource(PlayArea::default());
    world.insert_resource(PoolDiagnostics::default());
    world.insert_resource(GameClock::default());
    world.insert_resource(GameRng::seeded(7));
    world.insert_resource(SceneEpoch::default());
    world.insert_resource(Time::<()>::default());
    world
}

/// Advance the generic clock by `secs` so `Res<Time>` reports it as the last delta.
pub fn advance(world: &mut World, secs: f32) {
    world
        .resource_mut::<Time>()
        .advance_by(std::time::Duration::from_secs_f32(secs));
}
