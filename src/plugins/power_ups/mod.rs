//! Power-ups: keyed pool over `PowerUpKind`, dropped by enemies shot down.
//!
//! Only the kinds listed in `power_ups.factories` get a factory. A drop of any other
//! kind is a configuration fault: the spawn is skipped and counted, never retried.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::bounds::return_out_of_bounds;
use crate::common::contact::match_pair;
use crate::common::kinds::PowerUpKind;
use crate::common::layers::Layer;
use crate::common::listeners::Listeners;
use crate::common::tunables::Tunables;
use crate::plugins::core::{FrameSet, GameRng, ResolveStep};
use crate::plugins::effects::systems::allocate_effects;
use crate::plugins::enemies::{DeathCause, EnemyDied};
use crate::plugins::player::Player;
use crate::pooling::systems::commit_keyed_returns;
use crate::pooling::{Factory, Keyed, KeyedPool, Lifecycle, PoolDiagnostics, Poolable};

const PREWARM: usize = 4;
const SIZE: f32 = 20.0;

#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct PowerUp {
    kind: PowerUpKind,
    life: Lifecycle,
}

impl PowerUp {
    #[inline]
    pub fn kind(&self) -> PowerUpKind {
        self.kind
    }
}

impl Poolable for PowerUp {
    const KIND: &'static str = "power-up";

    fn lifecycle(&self) -> Lifecycle {
        self.life
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.life = lifecycle;
    }

    // Kind is the pool key and never changes; nothing else outlives an activation.
    fn clear(&mut self) {}
}

impl Keyed for PowerUp {
    type Key = PowerUpKind;

    fn pool_key(&self) -> PowerUpKind {
        self.kind
    }
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct SpawnPowerUp {
    pub kind: PowerUpKind,
    pub position: Vec2,
}

/// The player touched an active power-up.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUpCollected {
    pub kind: PowerUpKind,
    pub entity: Entity,
}

pub type PowerUpPool = KeyedPool<PowerUp>;

pub struct PowerUpFactory {
    pub kind: PowerUpKind,
}

impl Factory for PowerUpFactory {
    fn create_new(&self, commands: &mut Commands) -> Entity {
        let color = match self.kind {
            PowerUpKind::FireRate => Color::srgb(1.0, 0.8, 0.1),
            PowerUpKind::Health => Color::srgb(0.3, 1.0, 0.4),
            PowerUpKind::Shield => Color::srgb(0.4, 0.6, 1.0),
        };
        commands
            .spawn((
                Name::new(format!("{:?}(Pooled)", self.kind)),
                PowerUp { kind: self.kind, life: Lifecycle::Idle },
                Sprite { color, custom_size: Some(Vec2::splat(SIZE)), ..default() },
                Transform::from_xyz(0.0, 0.0, 1.5),
                Visibility::Hidden,
                RigidBody::Dynamic,
                Sensor,
                Collider::circle(SIZE * 0.5),
                CollisionLayers::NONE,
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ))
            .id()
    }
}

#[inline]
fn active_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PowerUp, [Layer::Player])
}

/// Pool with a factory for every kind listed in `kinds`.
pub fn build_pool(kinds: &[PowerUpKind]) -> PowerUpPool {
    kinds
        .iter()
        .fold(PowerUpPool::new(), |pool, &kind| pool.with_factory(kind, PowerUpFactory { kind }))
}

pub fn plugin(app: &mut App) {
    let pool = build_pool(&app.world().resource::<Tunables>().power_ups.factories);
    app.insert_resource(pool)
        .add_message::<SpawnPowerUp>()
        .add_message::<PowerUpCollected>()
        .add_systems(Startup, init_power_up_pool)
        .add_systems(FixedUpdate, return_out_of_bounds::<PowerUp>.in_set(FrameSet::Simulate))
        .add_systems(
            FixedPostUpdate,
            (
                resolve_pickups.in_set(ResolveStep::Pickups),
                // `GameRng` draws in a fixed order: drops, then effects.
                (roll_drops.before(allocate_effects), allocate_power_ups)
                    .chain()
                    .in_set(FrameSet::Notify),
                commit_keyed_returns::<PowerUp>.in_set(FrameSet::Commit),
            ),
        );
}

pub fn init_power_up_pool(
    mut commands: Commands,
    mut pool: ResMut<PowerUpPool>,
    mut diagnostics: ResMut<PoolDiagnostics>,
) {
    pool.initialize();
    let kinds: Vec<PowerUpKind> = pool.keys().collect();
    for kind in kinds {
        if let Err(err) = pool.prewarm(&mut commands, kind, PREWARM) {
            diagnostics.record(&err);
        }
    }
}

/// Drop listener: only enemies shot down and subscribed to drops roll.
fn roll_drops(
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut died: MessageReader<EnemyDied>,
    mut drops: MessageWriter<SpawnPowerUp>,
) {
    for ev in died.read() {
        if ev.cause != DeathCause::Projectile || !ev.listeners.contains(Listeners::DROPS) {
            continue;
        }
        if !rng.chance(tunables.enemy.power_up_drop_chance) {
            continue;
        }
        let roll = rng.unit();
        if let Some(kind) = tunables.power_ups.pick(roll) {
            drops.write(SpawnPowerUp { kind, position: ev.position });
        }
    }
}

fn allocate_power_ups(
    mut commands: Commands,
    mut pool: ResMut<PowerUpPool>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    tunables: Res<Tunables>,
    mut reader: MessageReader<SpawnPowerUp>,
) {
    for req in reader.read() {
        let e = match pool.acquire(&mut commands, req.kind) {
            Ok(e) => e,
            Err(err) => {
                diagnostics.record(&err);
                continue;
            }
        };
        commands.entity(e).insert((
            PowerUp { kind: req.kind, life: Lifecycle::Active },
            Transform::from_translation(req.position.extend(1.5)),
            LinearVelocity(Vec2::new(0.0, -tunables.power_ups.fall_speed)),
            Visibility::Visible,
            active_layers(),
        ));
    }
}

fn resolve_pickups(
    mut started: MessageReader<CollisionStart>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut collected: MessageWriter<PowerUpCollected>,
    mut q_power_ups: Query<&mut PowerUp>,
    q_player: Query<&Player>,
) {
    for ev in started.read() {
        let Some((power_up_e, player_e)) =
            match_pair(ev, |e| q_power_ups.contains(e), |e| q_player.contains(e))
        else {
            continue;
        };
        let Ok(mut power_up) = q_power_ups.get_mut(power_up_e) else {
            continue;
        };
        if !power_up.is_active() {
            diagnostics.record_stale("pickup", power_up_e);
            continue;
        }
        if !q_player.get(player_e).is_ok_and(Player::is_alive) {
            continue;
        }

        collected.write(PowerUpCollected { kind: power_up.kind, entity: power_up_e });
        power_up.return_to_pool();
    }
}

#[cfg(test)]
mod tests;
