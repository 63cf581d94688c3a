//! Single-type pool: one free-list, one active-set, one factory.

use std::marker::PhantomData;

use bevy::platform::collections::HashSet;
use bevy::prelude::*;

use super::contract::{Factory, Poolable};
use super::error::PoolError;

/// Outcome of a bulk reclaim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReclaimReport {
    /// Instances that were active when the reclaim started.
    pub reclaimed: usize,
    /// Instances the pool had to release itself.
    pub forced: usize,
}

#[derive(Resource)]
pub struct Pool<T: Poolable> {
    free: Vec<Entity>,
    active: HashSet<Entity>,
    factory: Box<dyn Factory>,
    created: usize,
    initialized: bool,
    _kind: PhantomData<fn() -> T>,
}

impl<T: Poolable> Pool<T> {
    pub fn new(factory: impl Factory) -> Self {
        Self {
            free: Vec::new(),
            active: HashSet::default(),
            factory: Box::new(factory),
            created: 0,
            initialized: false,
            _kind: PhantomData,
        }
    }

    /// Create the empty free-list and active-set. Later calls are no-ops so that
    /// instances already produced stay tracked.
    pub fn initialize(&mut self) {
        if self.initialized {
            debug!("{} pool already initialized", T::KIND);
            return;
        }
        self.free.clear();
        self.active.clear();
        self.initialized = true;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Build `count` idle instances up front.
    pub fn prewarm(&mut self, commands: &mut Commands, count: usize) -> Result<(), PoolError> {
        self.ensure_initialized()?;
        self.free.reserve(count);
        for _ in 0..count {
            let e = self.factory.create_new(commands);
            self.created += 1;
            self.free.push(e);
        }
        Ok(())
    }

    /// Hand out an idle instance, constructing one if the free-list is empty.
    ///
    /// The caller activates the returned entity.
    pub fn acquire(&mut self, commands: &mut Commands) -> Result<Entity, PoolError> {
        self.ensure_initialized()?;
        let e = match self.free.pop() {
            Some(e) => e,
            None => {
                self.created += 1;
                self.factory.create_new(commands)
            }
        };
        let inserted = self.active.insert(e);
        debug_assert!(inserted, "{} pool handed out an already active instance", T::KIND);
        Ok(e)
    }

    /// Move an active instance back onto the free-list.
    pub fn release(&mut self, entity: Entity) -> Result<(), PoolError> {
        self.ensure_initialized()?;
        if self.active.remove(&entity) {
            self.free.push(entity);
            return Ok(());
        }
        if self.free.contains(&entity) {
            Err(PoolError::DoubleRelease { kind: T::KIND, entity })
        } else {
            Err(PoolError::NotTracked { kind: T::KIND, entity })
        }
    }

    /// Reclaim every active instance.
    ///
    /// The active-set is snapshotted first. `return_one` is invoked once for each
    /// snapshot member that is still active when its turn comes; it is expected to run
    /// the instance's own return path, which may release other instances as well.
    /// Anything the callbacks left active is force-released afterwards.
    pub fn return_all_active(
        &mut self,
        mut return_one: impl FnMut(&mut Self, Entity),
    ) -> ReclaimReport {
        let snapshot: Vec<Entity> = self.active.iter().copied().collect();
        let reclaimed = snapshot.len();

        for e in snapshot {
            if self.active.contains(&e) {
                return_one(self, e);
            }
        }

        let forced = self.active.len();
        if forced > 0 {
            warn!("{} pool force-releasing {forced} instances left active by their return path", T::KIND);
            self.free.extend(self.active.drain());
        }

        debug_assert_eq!(self.created, self.free.len(), "{} pool partition broken", T::KIND);
        ReclaimReport { reclaimed, forced }
    }

    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    /// Total instances ever produced by the factory.
    #[inline]
    pub fn created(&self) -> usize {
        self.created
    }

    #[inline]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains(&entity)
    }

    #[inline]
    pub fn is_free(&self, entity: Entity) -> bool {
        self.free.contains(&entity)
    }

    pub fn active(&self) -> impl Iterator<Item = Entity> + '_ {
        self.active.iter().copied()
    }

    fn ensure_initialized(&self) -> Result<(), PoolError> {
        if self.initialized {
            Ok(())
        } else {
            Err(PoolError::Uninitialized { kind: T::KIND })
        }
    }
}
