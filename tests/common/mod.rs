//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `pool_shooter::game::configure_headless` to install gameplay plugins.
//!
//! Every `app.update()` advances time by exactly one fixed step, so each frame runs
//! `FixedUpdate` / `FixedPostUpdate` once.

#![allow(dead_code)]

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;
use pool_shooter::common::state::GameState;
use pool_shooter::common::tunables::Tunables;
use pool_shooter::plugins::core::GameRng;

pub const STEP: f64 = 1.0 / 64.0;

pub fn app_headless(tunables: Tunables) -> App {
    let mut app = App::new();

    // Add AssetPlugin + ScenePlugin so SceneSpawner exists.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    app.insert_resource(TimeUpdateStrategy::ManualDuration(Duration::from_secs_f64(STEP)));
    app.insert_resource(Time::<Fixed>::from_seconds(STEP));
    app.insert_resource(tunables);
    app.insert_resource(GameRng::seeded(42));

    pool_shooter::game::configure_headless(&mut app);
    app
}

/// Update until `done` holds, at most `max_frames` times. Returns the frames used.
pub fn run_until(app: &mut App, max_frames: usize, mut done: impl FnMut(&mut World) -> bool) -> Option<usize> {
    for frame in 0..max_frames {
        app.update();
        if done(app.world_mut()) {
            return Some(frame + 1);
        }
    }
    None
}

pub fn state(app: &App) -> GameState {
    *app.world().resource::<State<GameState>>().get()
}
