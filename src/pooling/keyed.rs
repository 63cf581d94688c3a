//! Multi-variant pool: one free-list and factory per key, one shared active-set.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use super::contract::{Factory, Keyed};
use super::error::PoolError;
use super::pool::ReclaimReport;

struct Lane {
    free: Vec<Entity>,
    factory: Box<dyn Factory>,
    created: usize,
}

#[derive(Resource)]
pub struct KeyedPool<T: Keyed> {
    lanes: HashMap<T::Key, Lane>,
    /// Active instance -> key it was acquired under.
    active: HashMap<Entity, T::Key>,
    initialized: bool,
}

impl<T: Keyed> Default for KeyedPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Keyed> KeyedPool<T> {
    pub fn new() -> Self {
        Self {
            lanes: HashMap::default(),
            active: HashMap::default(),
            initialized: false,
        }
    }

    /// Register the factory for `key`. Replaces an earlier factory for the same key.
    pub fn with_factory(mut self, key: T::Key, factory: impl Factory) -> Self {
        self.lanes.insert(
            key,
            Lane {
                free: Vec::new(),
                factory: Box::new(factory),
                created: 0,
            },
        );
        self
    }

    pub fn initialize(&mut self) {
        if self.initialized {
            debug!("{} pool already initialized", T::KIND);
            return;
        }
        for lane in self.lanes.values_mut() {
            lane.free.clear();
        }
        self.active.clear();
        self.initialized = true;
    }

    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn has_factory(&self, key: T::Key) -> bool {
        self.lanes.contains_key(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = T::Key> + '_ {
        self.lanes.keys().copied()
    }

    pub fn prewarm(
        &mut self,
        commands: &mut Commands,
        key: T::Key,
        count: usize,
    ) -> Result<(), PoolError> {
        self.ensure_initialized()?;
        let lane = self.lane_mut(key)?;
        lane.free.reserve(count);
        for _ in 0..count {
            let e = lane.factory.create_new(commands);
            lane.created += 1;
            lane.free.push(e);
        }
        Ok(())
    }

    /// Hand out an idle instance of variant `key`.
    ///
    /// A key without a registered factory is a configuration fault: nothing is
    /// constructed and the caller must skip the spawn.
    pub fn acquire(&mut self, commands: &mut Commands, key: T::Key) -> Result<Entity, PoolError> {
        self.ensure_initialized()?;
        let lane = self.lane_mut(key)?;
        let e = match lane.free.pop() {
            Some(e) => e,
            None => {
                lane.created += 1;
                lane.factory.create_new(commands)
            }
        };
        let previous = self.active.insert(e, key);
        debug_assert!(previous.is_none(), "{} pool handed out an already active instance", T::KIND);
        Ok(e)
    }

    /// Return an active instance to the free-list of `key`.
    ///
    /// The key must match the one used at acquisition; a mismatch is rejected rather
    /// than letting a foreign variant into another free-list.
    pub fn release(&mut self, entity: Entity, key: T::Key) -> Result<(), PoolError> {
        self.ensure_initialized()?;
        match self.active.get(&entity).copied() {
            Some(acquired) if acquired == key => {
                self.active.remove(&entity);
                self.lane_mut(key)?.free.push(entity);
                Ok(())
            }
            Some(acquired) => Err(PoolError::KeyMismatch {
                kind: T::KIND,
                entity,
                acquired: format!("{acquired:?}"),
                released: format!("{key:?}"),
            }),
            None if self.lanes.values().any(|lane| lane.free.contains(&entity)) => {
                Err(PoolError::DoubleRelease { kind: T::KIND, entity })
            }
            None => Err(PoolError::NotTracked { kind: T::KIND, entity }),
        }
    }

    /// Same contract as [`Pool::return_all_active`](super::Pool::return_all_active).
    /// Force-released leftovers go back to the free-list of the key they were
    /// acquired under.
    pub fn return_all_active(
        &mut self,
        mut return_one: impl FnMut(&mut Self, Entity),
    ) -> ReclaimReport {
        let snapshot: Vec<Entity> = self.active.keys().copied().collect();
        let reclaimed = snapshot.len();

        for e in snapshot {
            if self.active.contains_key(&e) {
                return_one(self, e);
            }
        }

        let forced = self.active.len();
        if forced > 0 {
            warn!("{} pool force-releasing {forced} instances left active by their return path", T::KIND);
            let leftovers: Vec<(Entity, T::Key)> = self.active.drain().collect();
            for (e, key) in leftovers {
                if let Some(lane) = self.lanes.get_mut(&key) {
                    lane.free.push(e);
                }
            }
        }

        ReclaimReport { reclaimed, forced }
    }

    #[inline]
    pub fn active_len(&self) -> usize {
        self.active.len()
    }

    pub fn free_len(&self) -> usize {
        self.lanes.values().map(|lane| lane.free.len()).sum()
    }

    pub fn free_len_of(&self, key: T::Key) -> usize {
        self.lanes.get(&key).map_or(0, |lane| lane.free.len())
    }

    pub fn created(&self) -> usize {
        self.lanes.values().map(|lane| lane.created).sum()
    }

    pub fn created_of(&self, key: T::Key) -> usize {
        self.lanes.get(&key).map_or(0, |lane| lane.created)
    }

    #[inline]
    pub fn is_active(&self, entity: Entity) -> bool {
        self.active.contains_key(&entity)
    }

    /// Key an active instance was acquired under.
    #[inline]
    pub fn active_key(&self, entity: Entity) -> Option<T::Key> {
        self.active.get(&entity).copied()
    }

    pub fn is_free(&self, entity: Entity) -> bool {
        self.lanes.values().any(|lane| lane.free.contains(&entity))
    }

    fn lane_mut(&mut self, key: T::Key) -> Result<&mut Lane, PoolError> {
        self.lanes.get_mut(&key).ok_or_else(|| PoolError::MissingFactory {
            kind: T::KIND,
            key: format!("{key:?}"),
        })
    }

    fn ensure_initialized(&self) -> Result<(), PoolError> {
        if self.initialized {
            Ok(())
        } else {
            Err(PoolError::Uninitialized { kind: T::KIND })
        }
    }
}
