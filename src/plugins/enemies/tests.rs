//! Enemy lifecycle tests. Collisions are injected as `CollisionStart` messages rather
//! than produced by the physics pipeline.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{advance, drain, ensure_messages, gameplay_world, run_system_once, send, touch};
use crate::plugins::core::ResolveStep;
use crate::plugins::effects::messages::SpawnEffect;
use crate::plugins::player::Player;
use crate::plugins::projectiles::allocator::allocate_shots;
use crate::plugins::projectiles::collision::resolve_player_shots;
use crate::plugins::projectiles::components::{Friendly, PlayerShot};
use crate::plugins::projectiles::messages::{ShotHit, ShotSide, SpawnProjectile};
use crate::plugins::projectiles::pool::{build_pool as build_shot_pool, init_shot_pool};
use crate::pooling::Pool;

fn enemy_world() -> World {
    let mut world = gameplay_world();
    world.insert_resource(EnemyPool::new(EnemyFactory));
    ensure_messages::<EnemyDied>(&mut world);
    ensure_messages::<SpawnEffect>(&mut world);
    ensure_messages::<SpawnProjectile>(&mut world);
    ensure_messages::<CollisionStart>(&mut world);
    run_system_once(&mut world, init_enemy_pool);
    world
}

fn spawn_at(world: &mut World, elapsed: f32, position: Vec2) -> Entity {
    run_system_once(
        world,
        move |mut commands: Commands,
              mut pool: ResMut<EnemyPool>,
              mut rng: ResMut<GameRng>,
              tunables: Res<Tunables>| {
            spawn_enemy(
                &mut commands,
                &mut pool,
                &mut rng,
                &tunables.enemy,
                elapsed,
                position,
                Listeners::SCORE | Listeners::DROPS,
            )
            .unwrap()
        },
    )
}

fn spawn_player(world: &mut World) -> Entity {
    let player = Player::new(&Tunables::default().player);
    world.spawn((player, Transform::default())).id()
}

fn finish_tick(world: &mut World) {
    run_system_once(world, resolve_enemy_deaths);
    run_system_once(world, commit_returns::<Enemy>);
}

#[test]
fn health_ramps_with_elapsed_time() {
    let tuning = EnemyTuning { min_health: 2, max_health: 5, health_ramp_interval: 15.0, ..default() };

    assert_eq!(initial_health(0.0, &tuning), 2);
    assert_eq!(initial_health(14.9, &tuning), 2);
    assert_eq!(initial_health(15.0, &tuning), 3);
    assert_eq!(initial_health(40.0, &tuning), 4);
    assert_eq!(initial_health(1_000.0, &tuning), 5);
}

#[test]
fn spawn_assigns_initial_parameters() {
    let mut world = enemy_world();
    let e = spawn_at(&mut world, 40.0, Vec2::new(10.0, 300.0));

    let enemy = world.get::<Enemy>(e).unwrap();
    assert!(enemy.is_active());
    assert_eq!(enemy.health, 4);
    assert_eq!(enemy.listeners, Listeners::SCORE | Listeners::DROPS);
    assert!(!enemy.is_dying());

    let speed = Tunables::default().enemy.speed;
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::new(0.0, -speed));
    assert_eq!(*world.get::<CollisionLayers>(e).unwrap(), active_layers());
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Visible);
    assert_eq!(world.get::<Transform>(e).unwrap().translation.truncate(), Vec2::new(10.0, 300.0));

    let pool = world.resource::<EnemyPool>();
    assert!(pool.is_active(e));
    assert_eq!(pool.created(), Tunables::default().director.prewarm);
}

#[test]
fn can_fire_is_rolled_once_at_spawn() {
    let mut world = enemy_world();
    world.resource_mut::<Tunables>().enemy.can_fire_chance = 0.0;
    let never = spawn_at(&mut world, 0.0, Vec2::ZERO);
    world.resource_mut::<Tunables>().enemy.can_fire_chance = 1.0;
    let always = spawn_at(&mut world, 0.0, Vec2::ZERO);

    assert!(!world.get::<Enemy>(never).unwrap().can_fire);
    assert!(world.get::<Enemy>(always).unwrap().can_fire);
}

#[test]
fn fire_timer_carries_the_remainder() {
    let mut enemy = Enemy::spawned(3, true, Listeners::empty());
    assert!(!enemy.tick_fire(1.0, 2.5));
    assert!(!enemy.tick_fire(1.0, 2.5));
    assert!(enemy.tick_fire(1.0, 2.5));
    // 0.5 carried over.
    assert!(enemy.tick_fire(2.0, 2.5));

    let mut grounded = Enemy::spawned(3, false, Listeners::empty());
    assert!(!grounded.tick_fire(100.0, 2.5));
}

#[test]
fn armed_enemies_request_shots() {
    let mut world = enemy_world();
    world.resource_mut::<Tunables>().enemy.can_fire_chance = 1.0;
    spawn_at(&mut world, 0.0, Vec2::new(0.0, 100.0));

    advance(&mut world, 2.5);
    run_system_once(&mut world, fire_enemy_shots);

    let shots = drain::<SpawnProjectile>(&mut world);
    assert_eq!(shots.len(), 1);
    assert_eq!(shots[0].side, ShotSide::Enemy);
    assert!(shots[0].position.y < 100.0);
    assert_eq!(shots[0].velocity, Vec2::new(0.0, -Tunables::default().enemy.projectile_speed));
}

#[test]
fn player_contact_kills_and_damages() {
    let mut world = enemy_world();
    let e = spawn_at(&mut world, 0.0, Vec2::new(5.0, 5.0));
    let p = spawn_player(&mut world);

    touch(&mut world, p, e);
    run_system_once(&mut world, resolve_player_contact);

    assert_eq!(world.get::<Enemy>(e).unwrap().death_cause(), Some(DeathCause::PlayerCollision));
    let max = Tunables::default().player.max_health;
    assert_eq!(world.get::<Player>(p).unwrap().health, max - 1);

    run_system_once(&mut world, resolve_enemy_deaths);
    let died = drain::<EnemyDied>(&mut world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].enemy, e);
    assert_eq!(died[0].cause, DeathCause::PlayerCollision);
    assert_eq!(died[0].position, Vec2::new(5.0, 5.0));
    assert_eq!(died[0].listeners, Listeners::SCORE | Listeners::DROPS);

    let effects = drain::<SpawnEffect>(&mut world);
    assert_eq!(effects.len(), 1);
    assert_eq!(effects[0].kind, EffectKind::Explosion);

    // Listeners saw the final state; the commit releases afterwards.
    assert_eq!(world.get::<Enemy>(e).unwrap().lifecycle(), Lifecycle::PendingReturn);
    run_system_once(&mut world, commit_returns::<Enemy>);
    assert!(world.resource::<EnemyPool>().is_free(e));
}

#[test]
fn killing_shot_wins_over_player_contact_in_the_same_tick() {
    let mut world = enemy_world();
    world.insert_resource(build_shot_pool::<Friendly>());
    ensure_messages::<ShotHit>(&mut world);
    run_system_once(&mut world, init_shot_pool::<Friendly>);

    let e = spawn_at(&mut world, 0.0, Vec2::ZERO);
    world.get_mut::<Enemy>(e).unwrap().health = 1;
    let p = spawn_player(&mut world);
    send(
        &mut world,
        SpawnProjectile { side: ShotSide::Player, position: Vec2::ZERO, velocity: Vec2::Y, damage: 1 },
    );
    run_system_once(&mut world, allocate_shots::<Friendly>);
    let shot = world.resource::<Pool<PlayerShot>>().active().next().unwrap();

    // The contact is reported first and registered first; the step order still decides.
    touch(&mut world, p, e);
    touch(&mut world, shot, e);
    let mut schedule = Schedule::default();
    schedule.configure_sets(ResolveStep::order());
    schedule.add_systems((
        resolve_player_contact.in_set(ResolveStep::Contacts),
        resolve_player_shots.in_set(ResolveStep::Shots),
    ));
    schedule.run(&mut world);
    run_system_once(&mut world, resolve_enemy_deaths);

    let died = drain::<EnemyDied>(&mut world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].cause, DeathCause::Projectile);
    let max = Tunables::default().player.max_health;
    assert_eq!(world.get::<Player>(p).unwrap().health, max);
    assert_eq!(world.get::<PlayerShot>(shot).unwrap().lifecycle(), Lifecycle::PendingReturn);
    assert_eq!(world.resource::<PoolDiagnostics>().stale_callbacks, 1);
}

#[test]
fn repeated_contact_in_one_tick_is_stale() {
    let mut world = enemy_world();
    let e = spawn_at(&mut world, 0.0, Vec2::ZERO);
    let p = spawn_player(&mut world);

    touch(&mut world, e, p);
    touch(&mut world, p, e);
    run_system_once(&mut world, resolve_player_contact);

    let max = Tunables::default().player.max_health;
    assert_eq!(world.get::<Player>(p).unwrap().health, max - 1);
    assert_eq!(world.resource::<PoolDiagnostics>().stale_callbacks, 1);
}

#[test]
fn overkill_raises_a_single_death() {
    let mut world = enemy_world();
    let e = spawn_at(&mut world, 0.0, Vec2::ZERO);
    {
        let mut enemy = world.get_mut::<Enemy>(e).unwrap();
        assert!(!enemy.take_damage(1, DeathCause::Projectile));
        assert!(enemy.take_damage(5, DeathCause::Projectile));
        // Dying enemies take no more damage and keep their cause.
        assert!(!enemy.take_damage(5, DeathCause::Projectile));
        enemy.kill(DeathCause::PlayerCollision);
        assert_eq!(enemy.death_cause(), Some(DeathCause::Projectile));
    }

    finish_tick(&mut world);
    finish_tick(&mut world);

    let died = drain::<EnemyDied>(&mut world);
    assert_eq!(died.len(), 1);
    assert_eq!(died[0].cause, DeathCause::Projectile);
    assert_eq!(world.resource::<PoolDiagnostics>().total_faults(), 0);
}

#[test]
fn leaving_the_play_area_releases_without_death() {
    let mut world = enemy_world();
    let e = spawn_at(&mut world, 0.0, Vec2::ZERO);
    world.get_mut::<Transform>(e).unwrap().translation.y = -1_000.0;

    run_system_once(&mut world, return_out_of_bounds::<Enemy>);
    finish_tick(&mut world);

    assert!(drain::<EnemyDied>(&mut world).is_empty());
    assert!(world.resource::<EnemyPool>().is_free(e));
}

#[test]
fn release_clears_per_activation_state() {
    let mut world = enemy_world();
    world.resource_mut::<Tunables>().enemy.can_fire_chance = 1.0;
    let e = spawn_at(&mut world, 30.0, Vec2::ZERO);
    world.get_mut::<Enemy>(e).unwrap().kill(DeathCause::Projectile);

    finish_tick(&mut world);

    assert_eq!(*world.get::<Enemy>(e).unwrap(), Enemy::idle());
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);
    assert_eq!(world.get::<LinearVelocity>(e).unwrap().0, Vec2::ZERO);
    assert_eq!(*world.get::<CollisionLayers>(e).unwrap(), CollisionLayers::NONE);

    // The next acquisition gets the same instance back, fully re-initialized.
    world.resource_mut::<Tunables>().enemy.can_fire_chance = 0.0;
    let again = spawn_at(&mut world, 0.0, Vec2::ZERO);
    assert_eq!(again, e);
    let enemy = world.get::<Enemy>(again).unwrap();
    assert_eq!(enemy.health, 2);
    assert!(!enemy.can_fire);
    assert!(!enemy.is_dying());
}
