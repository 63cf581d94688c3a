//! Entity pooling: recycle transient entities instead of spawning and despawning them.
//!
//! # Lifecycle
//! ```text
//!   Idle (free-list) --acquire--> Active --return_to_pool()--> PendingReturn
//!        ^                                                          |
//!        +---------------- commit (release + idle invariants) ------+
//! ```
//!
//! - A pool owns its free-list and active-set. Every instance the factory ever built
//!   is in exactly one of the two.
//! - Only the instance itself decides when it is done (`Poolable::return_to_pool`).
//!   The commit systems in [`systems`] perform the actual release at the end of the
//!   tick, after death listeners have run.
//! - Bulk reclaim (`return_all_active`) snapshots the active-set before iterating, so a
//!   return path that releases other instances cannot corrupt the walk.
//!
//! Faults (double release, foreign instance, wrong key, missing factory) are returned
//! as [`PoolError`], logged, and counted in [`PoolDiagnostics`]. None of them panic.

pub mod contract;
pub mod diagnostics;
pub mod error;
pub mod keyed;
pub mod pool;
pub mod systems;

pub use contract::{Factory, Keyed, Lifecycle, PoolKey, Poolable};
pub use diagnostics::PoolDiagnostics;
pub use error::PoolError;
pub use keyed::KeyedPool;
pub use pool::{Pool, ReclaimReport};
