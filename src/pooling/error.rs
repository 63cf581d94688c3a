use bevy::prelude::Entity;
use thiserror::Error;

/// Recoverable pool failures. None of these mutate the pool that reports them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    #[error("{kind} pool used before initialize()")]
    Uninitialized { kind: &'static str },

    #[error("{kind} pool has no factory for key {key}")]
    MissingFactory { kind: &'static str, key: String },

    #[error("{kind} instance {entity} released while already idle")]
    DoubleRelease { kind: &'static str, entity: Entity },

    #[error("{kind} instance {entity} does not belong to this pool")]
    NotTracked { kind: &'static str, entity: Entity },

    #[error("{kind} instance {entity} acquired as {acquired} but released as {released}")]
    KeyMismatch {
        kind: &'static str,
        entity: Entity,
        acquired: String,
        released: String,
    },
}
