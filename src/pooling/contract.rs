//! The two capabilities every pooled entity kind provides.

use std::fmt::Debug;
use std::hash::Hash;

use bevy::ecs::component::Mutable;
use bevy::prelude::*;

/// Where a pooled instance is in its life.
///
/// `Idle` instances sit on a free-list. `Active` instances are in play.
/// `PendingReturn` instances have reached their terminal condition this tick and
/// will be released by the commit system once every listener has seen them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Idle,
    Active,
    PendingReturn,
}

/// Capability of a recyclable entity: "return myself to my pool".
///
/// Implemented by the gameplay component of every pooled kind. The pool resource that
/// owns the instance is `Pool<Self>` (or `KeyedPool<Self>`), so the type itself is the
/// bound return path; instances never hold pool internals.
pub trait Poolable: Component<Mutability = Mutable> + Sized {
    /// Human-readable kind name used in diagnostics.
    const KIND: &'static str;

    fn lifecycle(&self) -> Lifecycle;

    fn set_lifecycle(&mut self, lifecycle: Lifecycle);

    /// Drop everything bound to the previous active period (timers, listener
    /// subscriptions). Called by the release path just before the instance goes idle.
    fn clear(&mut self);

    #[inline]
    fn is_active(&self) -> bool {
        self.lifecycle() == Lifecycle::Active
    }

    /// End the current active period.
    ///
    /// Only the first call per active period has an effect; later calls (or calls on an
    /// idle instance) return `false` and leave the instance untouched.
    fn return_to_pool(&mut self) -> bool {
        if self.lifecycle() != Lifecycle::Active {
            return false;
        }
        self.set_lifecycle(Lifecycle::PendingReturn);
        true
    }
}

/// Closed set of type tags for a keyed pool.
pub trait PoolKey: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<K> PoolKey for K where K: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// Pooled kinds with several visually distinct variants.
pub trait Keyed: Poolable {
    type Key: PoolKey;

    /// The key this instance was acquired under.
    fn pool_key(&self) -> Self::Key;
}

/// Builds a brand-new, inactive instance when a free-list is empty.
///
/// Construction cannot fail in this domain. The spawned entity must carry the pooled
/// component in the `Idle` state and be invisible with collisions disabled.
pub trait Factory: Send + Sync + 'static {
    fn create_new(&self, commands: &mut Commands) -> Entity;
}
