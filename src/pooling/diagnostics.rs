use bevy::prelude::*;

use super::error::PoolError;

/// Running tally of recovered pool faults.
///
/// Every fault is logged where it happens; this resource keeps counts so tests and the
/// debug HUD can see that a fault occurred without scraping logs.
#[derive(Resource, Debug, Default, Clone, PartialEq, Eq)]
pub struct PoolDiagnostics {
    pub uninitialized: u32,
    pub missing_factory: u32,
    pub double_release: u32,
    pub not_tracked: u32,
    pub key_mismatch: u32,
    /// Hit or pickup notifications that arrived for an instance no longer active.
    pub stale_callbacks: u32,
    /// Instances force-released by a bulk reclaim because their own return path did not release them.
    pub forced_reclaims: u32,
}

impl PoolDiagnostics {
    pub fn record(&mut self, err: &PoolError) {
        warn!("{err}");
        match err {
            PoolError::Uninitialized { .. } => self.uninitialized += 1,
            PoolError::MissingFactory { .. } => self.missing_factory += 1,
            PoolError::DoubleRelease { .. } => self.double_release += 1,
            PoolError::NotTracked { .. } => self.not_tracked += 1,
            PoolError::KeyMismatch { .. } => self.key_mismatch += 1,
        }
    }

    pub fn record_stale(&mut self, what: &str, entity: Entity) {
        debug!("stale {what} notification for inactive {entity}");
        self.stale_callbacks += 1;
    }

    pub fn total_faults(&self) -> u32 {
        self.uninitialized
            + self.missing_factory
            + self.double_release
            + self.not_tracked
            + self.key_mismatch
    }
}
