use std::marker::PhantomData;

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::layers::Layer;
use crate::pooling::{Lifecycle, Poolable};

use super::messages::ShotSide;

/// Compile-time side of a projectile. Each side has its own pool.
pub trait Side: Send + Sync + 'static {
    const SIDE: ShotSide;
    const KIND: &'static str;
    const COLOR: Color;

    fn active_layers() -> CollisionLayers;
}

#[derive(Debug, Clone, Copy)]
pub struct Friendly;

#[derive(Debug, Clone, Copy)]
pub struct Hostile;

impl Side for Friendly {
    const SIDE: ShotSide = ShotSide::Player;
    const KIND: &'static str = "player shot";
    const COLOR: Color = Color::srgb(1.0, 0.85, 0.3);

    #[inline]
    fn active_layers() -> CollisionLayers {
        CollisionLayers::new(Layer::PlayerShot, [Layer::Enemy])
    }
}

impl Side for Hostile {
    const SIDE: ShotSide = ShotSide::Enemy;
    const KIND: &'static str = "enemy shot";
    const COLOR: Color = Color::srgb(0.6, 1.0, 0.4);

    #[inline]
    fn active_layers() -> CollisionLayers {
        CollisionLayers::new(Layer::EnemyShot, [Layer::Player])
    }
}

#[derive(Component, Debug)]
pub struct Projectile<S: Side> {
    life: Lifecycle,
    pub damage: i32,
    _side: PhantomData<fn() -> S>,
}

pub type PlayerShot = Projectile<Friendly>;
pub type EnemyShot = Projectile<Hostile>;

impl<S: Side> Projectile<S> {
    pub fn idle() -> Self {
        Self { life: Lifecycle::Idle, damage: 0, _side: PhantomData }
    }

    pub fn armed(damage: i32) -> Self {
        Self { life: Lifecycle::Active, damage, _side: PhantomData }
    }
}

impl<S: Side> Poolable for Projectile<S> {
    const KIND: &'static str = S::KIND;

    fn lifecycle(&self) -> Lifecycle {
        self.life
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.life = lifecycle;
    }

    fn clear(&mut self) {
        self.damage = 0;
    }
}
