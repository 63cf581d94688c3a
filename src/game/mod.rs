//! Game composition root.
//!
//! Provides two public configuration functions:
//! - `configure_full`: includes DefaultPlugins (window/render) + game plugins.
//! - `configure_headless`: minimal configuration for integration tests.
//!
//! Both expect `Tunables` (and optionally a seeded `GameRng`) to be inserted first
//! when the defaults are not wanted; the core plugin only fills in what is missing.

use bevy::prelude::*;
use bevy::window::WindowResolution;

use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins;
use crate::plugins::core::GameRng;

/// Run the windowed game.
pub fn run(tunables: Tunables, seed: Option<u64>) {
    let mut app = App::new();
    app.insert_resource(tunables);
    if let Some(seed) = seed {
        app.insert_resource(GameRng::seeded(seed));
    }
    app.add_plugins(configure_full).run();
}

/// Full configuration for `cargo run`.
pub fn configure_full(app: &mut App) {
    let [half_w, half_h] = app
        .world()
        .get_resource::<Tunables>()
        .map_or_else(|| Tunables::default().world.half_size, |t| t.world.half_size);

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(Window {
            title: "Pool Shooter".into(),
            resolution: WindowResolution::new((half_w * 2.0) as u32, (half_h * 2.0) as u32),
            ..default()
        }),
        ..default()
    }));

    configure_game(app);
    plugins::register_render(app);
}

/// Headless configuration for integration tests.
///
/// Notes:
/// - Do NOT add DefaultPlugins.
/// - Do NOT add render-only plugins (camera, HUD text).
pub fn configure_headless(app: &mut App) {
    configure_game(app);
}

/// Configuration shared by both full and headless apps.
fn configure_game(app: &mut App) {
    app.init_state::<GameState>();
    plugins::register_gameplay(app);
}
