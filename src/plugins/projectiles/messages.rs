//! Buffered projectile traffic.
//!
//! Shooters never touch a projectile pool. They write `SpawnProjectile`, and the
//! allocator of that side is the single writer of its pool.

use bevy::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShotSide {
    Player,
    Enemy,
}

#[derive(Message, Clone, Copy, Debug)]
pub struct SpawnProjectile {
    pub side: ShotSide,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: i32,
}

/// A player shot struck an enemy.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShotHit {
    pub shot: Entity,
    pub target: Entity,
}
