//! World plugin: the play area every bounds check is made against, and its backdrop.

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::bounds::PlayArea;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;

const TILE: f32 = 80.0;

pub fn plugin(app: &mut App) {
    let area = PlayArea::from_tuning(&app.world().resource::<Tunables>().world);
    app.insert_resource(area);
    app.add_systems(OnEnter(GameState::InGame), spawn_backdrop);
}

/// Checkerboard of solid-color tiles covering the play area. No assets needed.
fn spawn_backdrop(mut commands: Commands, area: Res<PlayArea>) {
    let cols = (area.half_size.x / TILE).ceil() as i32;
    let rows = (area.half_size.y / TILE).ceil() as i32;

    (-rows..rows)
        .flat_map(|y| (-cols..cols).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let pos = Vec3::new((x as f32 + 0.5) * TILE, (y as f32 + 0.5) * TILE, -10.0);
            let color = if (x + y).rem_euclid(2) == 0 {
                Color::srgb(0.05, 0.05, 0.09)
            } else {
                Color::srgb(0.04, 0.04, 0.07)
            };

            commands.spawn((
                Name::new("Backdrop"),
                Sprite::from_color(color, Vec2::splat(TILE)),
                Transform::from_translation(pos),
                DespawnOnExit(GameState::InGame),
            ));
        });
}
