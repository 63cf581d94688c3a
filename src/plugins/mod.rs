//! Feature plugins.

use bevy::prelude::*;

use crate::plugins::projectiles::ProjectilesPlugin;

pub mod core;
pub mod director;
pub mod effects;
pub mod enemies;
pub mod hud;
pub mod physics;
pub mod player;
pub mod power_ups;
pub mod projectiles;
pub mod score;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    physics::plugin(app);
    world::plugin(app);
    effects::plugin(app);
    enemies::plugin(app);
    power_ups::plugin(app);
    player::plugin(app);
    score::plugin(app);
    hud::plugin(app);
    director::plugin(app);
    app.add_plugins(ProjectilesPlugin);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
    hud::render_plugin(app);
}
