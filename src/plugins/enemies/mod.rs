//! Enemies plugin: pooled attackers that descend from the top of the play area.
//!
//! ```text
//! director: Pool<Enemy>::acquire -> spawn_enemy (health from GameClock, can_fire roll)
//! Simulate: fire_enemy_shots, return_out_of_bounds (no death event)
//! Resolve:  projectile hits (projectiles plugin), then resolve_player_contact
//! Death:    resolve_enemy_deaths -> EnemyDied + Explosion, return_to_pool
//! Notify:   score / drop listeners read EnemyDied
//! Commit:   commit_returns::<Enemy>
//! ```
//!
//! Damage only records *why* an enemy is dying. The enemy raises its own death event
//! in the `Death` set, once, however many hits landed in the tick.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::bounds::return_out_of_bounds;
use crate::common::contact::match_pair;
use crate::common::kinds::EffectKind;
use crate::common::layers::Layer;
use crate::common::listeners::Listeners;
use crate::common::tunables::{EnemyTuning, Tunables};
use crate::plugins::core::{FrameSet, GameRng, ResolveStep};
use crate::plugins::effects::messages::SpawnEffect;
use crate::plugins::player::Player;
use crate::plugins::projectiles::messages::{ShotSide, SpawnProjectile};
use crate::pooling::systems::commit_returns;
use crate::pooling::{Factory, Lifecycle, Pool, PoolDiagnostics, PoolError, Poolable};

// -----------------------------------------------------------------------------
// Components / messages
// -----------------------------------------------------------------------------

/// How an enemy died. Scoring treats the two differently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    Projectile,
    PlayerCollision,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct EnemyDied {
    pub enemy: Entity,
    pub cause: DeathCause,
    pub position: Vec2,
    /// Subscribers wired when this enemy was spawned.
    pub listeners: Listeners,
}

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Enemy {
    life: Lifecycle,
    pub health: i32,
    pub can_fire: bool,
    fire_timer: f32,
    pub listeners: Listeners,
    cause: Option<DeathCause>,
}

impl Enemy {
    pub fn idle() -> Self {
        Self {
            life: Lifecycle::Idle,
            health: 0,
            can_fire: false,
            fire_timer: 0.0,
            listeners: Listeners::empty(),
            cause: None,
        }
    }

    pub fn spawned(health: i32, can_fire: bool, listeners: Listeners) -> Self {
        Self { life: Lifecycle::Active, health, can_fire, listeners, ..Self::idle() }
    }

    /// Apply damage. Returns `true` when this hit is the killing one.
    pub fn take_damage(&mut self, amount: i32, cause: DeathCause) -> bool {
        if self.is_dying() {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.cause = Some(cause);
            return true;
        }
        false
    }

    pub fn kill(&mut self, cause: DeathCause) {
        if !self.is_dying() {
            self.health = 0;
            self.cause = Some(cause);
        }
    }

    #[inline]
    pub fn is_dying(&self) -> bool {
        self.cause.is_some()
    }

    #[inline]
    pub fn death_cause(&self) -> Option<DeathCause> {
        self.cause
    }

    /// Advance the fire timer; `true` when a shot is due. The remainder carries over.
    pub fn tick_fire(&mut self, dt: f32, interval: f32) -> bool {
        if !self.can_fire {
            return false;
        }
        self.fire_timer += dt;
        if self.fire_timer >= interval {
            self.fire_timer -= interval;
            return true;
        }
        false
    }
}

impl Poolable for Enemy {
    const KIND: &'static str = "enemy";

    fn lifecycle(&self) -> Lifecycle {
        self.life
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.life = lifecycle;
    }

    fn clear(&mut self) {
        *self = Self { life: self.life, ..Self::idle() };
    }
}

/// Spawn-time health: one extra point per elapsed ramp interval, capped.
pub fn initial_health(elapsed: f32, tuning: &EnemyTuning) -> i32 {
    let steps = (elapsed.max(0.0) / tuning.health_ramp_interval).floor() as i32;
    (tuning.min_health + steps).min(tuning.max_health)
}

// -----------------------------------------------------------------------------
// Pool
// -----------------------------------------------------------------------------

pub type EnemyPool = Pool<Enemy>;

const SIZE: Vec2 = Vec2::new(34.0, 28.0);

pub struct EnemyFactory;

impl Factory for EnemyFactory {
    fn create_new(&self, commands: &mut Commands) -> Entity {
        commands
            .spawn((
                Name::new("Enemy(Pooled)"),
                Enemy::idle(),
                Sprite {
                    color: Color::srgb(0.9, 0.25, 0.3),
                    custom_size: Some(SIZE),
                    ..default()
                },
                Transform::from_xyz(0.0, 0.0, 1.0),
                Visibility::Hidden,
                RigidBody::Dynamic,
                Sensor,
                Collider::rectangle(SIZE.x, SIZE.y),
                CollisionLayers::NONE,
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ))
            .id()
    }
}

#[inline]
pub fn active_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Enemy, [Layer::Player, Layer::PlayerShot])
}

pub fn init_enemy_pool(
    mut commands: Commands,
    mut pool: ResMut<EnemyPool>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    tunables: Res<Tunables>,
) {
    pool.initialize();
    if let Err(err) = pool.prewarm(&mut commands, tunables.director.prewarm) {
        diagnostics.record(&err);
    }
}

/// Acquire an enemy and give it its initial parameters.
pub fn spawn_enemy(
    commands: &mut Commands,
    pool: &mut EnemyPool,
    rng: &mut GameRng,
    tuning: &EnemyTuning,
    elapsed: f32,
    position: Vec2,
    listeners: Listeners,
) -> Result<Entity, PoolError> {
    let e = pool.acquire(commands)?;
    let enemy = Enemy::spawned(
        initial_health(elapsed, tuning),
        rng.chance(tuning.can_fire_chance),
        listeners,
    );
    commands.entity(e).insert((
        enemy,
        Transform::from_translation(position.extend(1.0)),
        LinearVelocity(Vec2::new(0.0, -tuning.speed)),
        Visibility::Visible,
        active_layers(),
    ));
    Ok(e)
}

// -----------------------------------------------------------------------------
// Systems
// -----------------------------------------------------------------------------

pub fn plugin(app: &mut App) {
    app.insert_resource(EnemyPool::new(EnemyFactory))
        .add_message::<EnemyDied>()
        .add_systems(Startup, init_enemy_pool)
        .add_systems(
            FixedUpdate,
            (fire_enemy_shots, return_out_of_bounds::<Enemy>).in_set(FrameSet::Simulate),
        )
        .add_systems(
            FixedPostUpdate,
            (
                resolve_player_contact.in_set(ResolveStep::Contacts),
                resolve_enemy_deaths.in_set(FrameSet::Death),
                commit_returns::<Enemy>.in_set(FrameSet::Commit),
            ),
        );
}

fn fire_enemy_shots(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut q: Query<(&mut Enemy, &Transform)>,
) {
    let dt = time.delta_secs();
    let tuning = &tunables.enemy;
    for (mut enemy, tf) in &mut q {
        if !enemy.is_active() || enemy.is_dying() {
            continue;
        }
        if enemy.tick_fire(dt, tuning.fire_interval) {
            shots.write(SpawnProjectile {
                side: ShotSide::Enemy,
                position: tf.translation.truncate() - Vec2::new(0.0, SIZE.y * 0.5 + 6.0),
                velocity: Vec2::new(0.0, -tuning.projectile_speed),
                damage: tunables.projectiles.enemy_damage,
            });
        }
    }
}

/// Player touched an enemy: the player takes contact damage, the enemy dies.
fn resolve_player_contact(
    mut started: MessageReader<CollisionStart>,
    tunables: Res<Tunables>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q_enemies: Query<&mut Enemy>,
    mut q_player: Query<&mut Player>,
) {
    for ev in started.read() {
        let Some((enemy_e, player_e)) =
            match_pair(ev, |e| q_enemies.contains(e), |e| q_player.contains(e))
        else {
            continue;
        };
        let Ok(mut enemy) = q_enemies.get_mut(enemy_e) else {
            continue;
        };
        if !enemy.is_active() || enemy.is_dying() {
            diagnostics.record_stale("player contact", enemy_e);
            continue;
        }
        let Ok(mut player) = q_player.get_mut(player_e) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }

        enemy.kill(DeathCause::PlayerCollision);
        player.take_hit(tunables.enemy.contact_damage);
    }
}

/// Death protocol: raise the event, request the explosion, then return to pool.
/// Listeners run before the commit releases the instance.
fn resolve_enemy_deaths(
    mut died: MessageWriter<EnemyDied>,
    mut effects: MessageWriter<SpawnEffect>,
    mut q: Query<(Entity, &mut Enemy, &Transform)>,
) {
    for (e, mut enemy, tf) in &mut q {
        if !enemy.is_active() {
            continue;
        }
        let Some(cause) = enemy.death_cause() else {
            continue;
        };
        let position = tf.translation.truncate();

        died.write(EnemyDied { enemy: e, cause, position, listeners: enemy.listeners });
        effects.write(SpawnEffect::at(EffectKind::Explosion, position));
        enemy.return_to_pool();
    }
}

#[cfg(test)]
mod tests;
