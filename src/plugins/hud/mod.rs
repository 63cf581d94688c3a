//! Presentation sink.
//!
//! Gameplay pushes plain values as `HudUpdate` messages; [`Hud`] mirrors the latest
//! of each. Drawing it is render-only and lives in [`render_plugin`].

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::score::FinalStats;

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub enum HudUpdate {
    Score(u32),
    Health(i32),
    Shield(u8),
    /// Player died: fade the in-game HUD out.
    FadeOut,
    GameOver(FinalStats),
}

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Hud {
    pub score: u32,
    pub health: i32,
    pub shield: u8,
    pub faded: bool,
    pub final_stats: Option<FinalStats>,
}

impl Hud {
    pub fn apply(&mut self, update: &HudUpdate) {
        match *update {
            HudUpdate::Score(score) => self.score = score,
            HudUpdate::Health(health) => self.health = health,
            HudUpdate::Shield(shield) => self.shield = shield,
            HudUpdate::FadeOut => self.faded = true,
            HudUpdate::GameOver(stats) => self.final_stats = Some(stats),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Hud>()
        .add_message::<HudUpdate>()
        .add_systems(OnEnter(GameState::InGame), reset_hud)
        .add_systems(PostUpdate, mirror_updates);
}

fn reset_hud(mut hud: ResMut<Hud>) {
    *hud = Hud::default();
}

fn mirror_updates(mut hud: ResMut<Hud>, mut updates: MessageReader<HudUpdate>) {
    for update in updates.read() {
        hud.apply(update);
    }
}

// -----------------------------------------------------------------------------
// Render-only
// -----------------------------------------------------------------------------

#[derive(Component)]
struct HudText;

pub fn render_plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_text)
        .add_systems(OnEnter(GameState::GameOver), spawn_text)
        .add_systems(PostUpdate, draw_text.after(mirror_updates));
}

fn spawn_text(mut commands: Commands, state: Res<State<GameState>>) {
    commands.spawn((
        Name::new("HudText"),
        HudText,
        Text::new(""),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Px(12.0),
            left: Val::Px(12.0),
            ..default()
        },
        DespawnOnExit(*state.get()),
    ));
}

fn draw_text(hud: Res<Hud>, mut q: Query<(&mut Text, &mut TextColor), With<HudText>>) {
    if !hud.is_changed() {
        return;
    }
    let body = match &hud.final_stats {
        Some(stats) => format!(
            "GAME OVER\nscore {}\nkilled {}  missed {}  collisions {}\naccuracy {:.0}%\nheals {}  power-ups {}\n[R] retry",
            stats.score,
            stats.enemies_killed,
            stats.enemies_missed,
            stats.collisions,
            stats.accuracy * 100.0,
            stats.effective_heals,
            stats.power_ups_picked,
        ),
        None => format!("score {}\nhealth {}  shield {}", hud.score, hud.health, hud.shield),
    };
    let alpha = if hud.faded && hud.final_stats.is_none() { 0.25 } else { 1.0 };
    for (mut text, mut color) in &mut q {
        text.0.clone_from(&body);
        color.0 = Color::srgba(0.9, 0.9, 0.95, alpha);
    }
}

#[cfg(test)]
mod tests;
