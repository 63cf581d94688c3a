use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{drain, ensure_messages, gameplay_world, run_system_once, send, touch};
use crate::common::tunables::PlayerTuning;

fn power_up_world(kinds: &[PowerUpKind]) -> World {
    let mut world = gameplay_world();
    world.insert_resource(build_pool(kinds));
    ensure_messages::<EnemyDied>(&mut world);
    ensure_messages::<SpawnPowerUp>(&mut world);
    ensure_messages::<PowerUpCollected>(&mut world);
    ensure_messages::<CollisionStart>(&mut world);
    run_system_once(&mut world, init_power_up_pool);
    world
}

fn drop_at(world: &mut World, kind: PowerUpKind, position: Vec2) -> Option<Entity> {
    send(world, SpawnPowerUp { kind, position });
    let before: Vec<Entity> = active(world);
    run_system_once(world, allocate_power_ups);
    drain::<SpawnPowerUp>(world);
    active(world).into_iter().find(|e| !before.contains(e))
}

fn active(world: &mut World) -> Vec<Entity> {
    world
        .query::<(Entity, &PowerUp)>()
        .iter(world)
        .filter(|(_, p)| p.is_active())
        .map(|(e, _)| e)
        .collect()
}

fn died(cause: DeathCause, listeners: Listeners) -> EnemyDied {
    EnemyDied {
        enemy: Entity::PLACEHOLDER,
        cause,
        position: Vec2::new(30.0, 90.0),
        listeners,
    }
}

#[test]
fn only_configured_kinds_are_prewarmed() {
    let world = power_up_world(&[PowerUpKind::FireRate, PowerUpKind::Health]);
    let pool = world.resource::<PowerUpPool>();

    assert!(pool.has_factory(PowerUpKind::FireRate));
    assert!(!pool.has_factory(PowerUpKind::Shield));
    assert_eq!(pool.free_len_of(PowerUpKind::FireRate), PREWARM);
    assert_eq!(pool.free_len_of(PowerUpKind::Health), PREWARM);
    assert_eq!(pool.free_len_of(PowerUpKind::Shield), 0);
}

#[test]
fn drop_without_a_factory_is_skipped_and_counted() {
    let mut world = power_up_world(&[PowerUpKind::FireRate, PowerUpKind::Health]);

    assert_eq!(drop_at(&mut world, PowerUpKind::Shield, Vec2::ZERO), None);

    let pool = world.resource::<PowerUpPool>();
    assert_eq!(pool.active_len(), 0);
    assert_eq!(pool.created_of(PowerUpKind::Shield), 0);
    let diagnostics = world.resource::<PoolDiagnostics>();
    assert_eq!(diagnostics.missing_factory, 1);

    // Configured kinds keep working.
    assert!(drop_at(&mut world, PowerUpKind::Health, Vec2::ZERO).is_some());
    assert_eq!(world.resource::<PoolDiagnostics>().missing_factory, 1);
}

#[test]
fn each_kind_comes_from_its_own_free_list() {
    let mut world = power_up_world(&PowerUpKind::ALL);
    let health = drop_at(&mut world, PowerUpKind::Health, Vec2::new(1.0, 2.0)).unwrap();
    let shield = drop_at(&mut world, PowerUpKind::Shield, Vec2::ZERO).unwrap();

    assert_eq!(world.get::<PowerUp>(health).unwrap().kind(), PowerUpKind::Health);
    assert_eq!(world.get::<PowerUp>(shield).unwrap().kind(), PowerUpKind::Shield);

    let pool = world.resource::<PowerUpPool>();
    assert_eq!(pool.active_key(health), Some(PowerUpKind::Health));
    assert_eq!(pool.active_key(shield), Some(PowerUpKind::Shield));
    assert_eq!(pool.free_len_of(PowerUpKind::Health), PREWARM - 1);
    assert_eq!(pool.free_len_of(PowerUpKind::FireRate), PREWARM);

    let fall = Tunables::default().power_ups.fall_speed;
    assert_eq!(world.get::<LinearVelocity>(health).unwrap().0, Vec2::new(0.0, -fall));
    assert_eq!(world.get::<Transform>(health).unwrap().translation.truncate(), Vec2::new(1.0, 2.0));
    assert_eq!(*world.get::<CollisionLayers>(health).unwrap(), active_layers());
}

#[test]
fn drops_roll_only_for_subscribed_projectile_kills() {
    let mut world = power_up_world(&PowerUpKind::ALL);
    world.resource_mut::<Tunables>().enemy.power_up_drop_chance = 1.0;

    send(&mut world, died(DeathCause::PlayerCollision, Listeners::all()));
    send(&mut world, died(DeathCause::Projectile, Listeners::SCORE));
    send(&mut world, died(DeathCause::Projectile, Listeners::all()));
    run_system_once(&mut world, roll_drops);

    let drops = drain::<SpawnPowerUp>(&mut world);
    assert_eq!(drops.len(), 1);
    assert_eq!(drops[0].position, Vec2::new(30.0, 90.0));
}

#[test]
fn zero_drop_chance_never_drops() {
    let mut world = power_up_world(&PowerUpKind::ALL);
    world.resource_mut::<Tunables>().enemy.power_up_drop_chance = 0.0;
    for _ in 0..50 {
        send(&mut world, died(DeathCause::Projectile, Listeners::all()));
    }
    run_system_once(&mut world, roll_drops);
    assert!(drain::<SpawnPowerUp>(&mut world).is_empty());
}

#[test]
fn pickup_notifies_and_returns_to_the_right_free_list() {
    let mut world = power_up_world(&PowerUpKind::ALL);
    let player = world.spawn(Player::new(&PlayerTuning::default())).id();
    let e = drop_at(&mut world, PowerUpKind::Shield, Vec2::ZERO).unwrap();

    touch(&mut world, player, e);
    run_system_once(&mut world, resolve_pickups);
    drain::<CollisionStart>(&mut world);

    assert_eq!(
        drain::<PowerUpCollected>(&mut world),
        vec![PowerUpCollected { kind: PowerUpKind::Shield, entity: e }]
    );
    assert_eq!(world.get::<PowerUp>(e).unwrap().lifecycle(), Lifecycle::PendingReturn);

    run_system_once(&mut world, commit_keyed_returns::<PowerUp>);
    let pool = world.resource::<PowerUpPool>();
    assert!(pool.is_free(e));
    assert_eq!(pool.free_len_of(PowerUpKind::Shield), PREWARM);
    assert_eq!(*world.get::<Visibility>(e).unwrap(), Visibility::Hidden);

    // Touching the idle instance again is stale.
    touch(&mut world, player, e);
    run_system_once(&mut world, resolve_pickups);
    assert!(drain::<PowerUpCollected>(&mut world).is_empty());
    assert_eq!(world.resource::<PoolDiagnostics>().stale_callbacks, 1);
}

#[test]
fn dead_player_collects_nothing() {
    let mut world = power_up_world(&PowerUpKind::ALL);
    let mut body = Player::new(&PlayerTuning::default());
    body.take_hit(99);
    body.mark_dead();
    let player = world.spawn(body).id();
    let e = drop_at(&mut world, PowerUpKind::Health, Vec2::ZERO).unwrap();

    touch(&mut world, e, player);
    run_system_once(&mut world, resolve_pickups);

    assert!(drain::<PowerUpCollected>(&mut world).is_empty());
    assert!(world.get::<PowerUp>(e).unwrap().is_active());
}
