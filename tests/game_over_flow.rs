mod common;

use bevy::prelude::*;
use pool_shooter::common::state::GameState;
use pool_shooter::common::tunables::{EffectTuning, EmitterTuning, Tunables};
use pool_shooter::plugins::director::{RetryRequested, SceneReset};
use pool_shooter::plugins::effects::pool::EffectPool;
use pool_shooter::plugins::enemies::EnemyPool;
use pool_shooter::plugins::hud::Hud;
use pool_shooter::plugins::player::Player;
use pool_shooter::plugins::power_ups::PowerUpPool;
use pool_shooter::plugins::projectiles::components::{EnemyShot, PlayerShot};
use pool_shooter::plugins::score::Scoreboard;
use pool_shooter::pooling::{Pool, PoolDiagnostics};

/// Frequent spawns and a short death explosion played at half speed.
fn quick_tunables() -> Tunables {
    let mut tunables = Tunables::default();
    tunables.director.enemy_spawn_interval = 0.25;
    tunables.director.death_explosion_speed = 0.5;
    tunables.effects.explosion = EffectTuning {
        duration: 0.2,
        emitters: vec![EmitterTuning { count: 4, lifetime: [0.1, 0.3] }],
    };
    tunables
}

fn kill_player(app: &mut App) {
    let world = app.world_mut();
    let mut q = world.query::<&mut Player>();
    q.single_mut(world).unwrap().health = 0;
}

fn actives(app: &App) -> [usize; 4] {
    let world = app.world();
    [
        world.resource::<EnemyPool>().active_len(),
        world.resource::<Pool<PlayerShot>>().active_len(),
        world.resource::<Pool<EnemyShot>>().active_len(),
        world.resource::<PowerUpPool>().active_len(),
    ]
}

#[test]
fn player_death_reclaims_the_scene_and_ends_in_game_over() {
    let mut app = common::app_headless(quick_tunables());
    for _ in 0..60 {
        app.update();
    }
    assert!(app.world().resource::<EnemyPool>().active_len() > 0);

    kill_player(&mut app);
    common::run_until(&mut app, 10, |world| world.resource::<SceneReset>().explosion.is_some())
        .expect("death explosion never started");

    // Everything but the death explosion went back to its pool.
    assert_eq!(actives(&app), [0; 4]);
    assert_eq!(app.world().resource::<EffectPool>().active_len(), 1);
    assert!(app.world().resource::<Hud>().faded);
    assert_eq!(common::state(&app), GameState::InGame);

    // The 0.2s minimum duration at half speed alone is 0.4s, about 26 steps.
    let frames = common::run_until(&mut app, 200, |world| {
        *world.resource::<State<GameState>>().get() == GameState::GameOver
    })
    .expect("never reached game over");
    assert!(frames > 20, "explosion finished too early ({frames} frames)");

    let world = app.world_mut();
    assert_eq!(world.query::<&Player>().iter(world).count(), 0);
    assert_eq!(world.resource::<EffectPool>().active_len(), 0);

    let stats = world.resource::<Hud>().final_stats.expect("final stats pushed");
    let board = world.resource::<Scoreboard>();
    assert_eq!(stats, board.final_stats());
    assert!(board.enemies_spawned > 0);
    assert_eq!(world.resource::<PoolDiagnostics>().total_faults(), 0);
}

#[test]
fn retry_reuses_warm_pools() {
    let mut app = common::app_headless(quick_tunables());
    for _ in 0..60 {
        app.update();
    }
    kill_player(&mut app);
    common::run_until(&mut app, 300, |world| {
        *world.resource::<State<GameState>>().get() == GameState::GameOver
    })
    .expect("never reached game over");
    let created = app.world().resource::<EnemyPool>().created();

    app.world_mut().write_message(RetryRequested);
    common::run_until(&mut app, 5, |world| {
        *world.resource::<State<GameState>>().get() == GameState::InGame
    })
    .expect("retry ignored");
    app.update();

    {
        let world = app.world_mut();
        assert_eq!(world.query::<&Player>().iter(world).count(), 1);
        let hud = world.resource::<Hud>();
        assert!(!hud.faded);
        assert_eq!(hud.final_stats, None);
        assert!(world.resource::<Scoreboard>().enemies_spawned <= 1);
    }

    // A few spawns into the new attempt, served from the idle instances.
    for _ in 0..40 {
        app.update();
    }
    assert!(app.world().resource::<Scoreboard>().enemies_spawned >= 2);
    assert_eq!(app.world().resource::<EnemyPool>().created(), created);
}
