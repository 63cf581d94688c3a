//! Player plugin. The player is singular and not pooled.
//!
//! Pipeline:
//! - Update: sample input, write PlayerInput resource
//! - FixedUpdate / Simulate: velocity from input, clamp to the allowed area, auto-fire
//! - FixedPostUpdate / Death: health <= 0 raises `PlayerDied` once
//! - FixedPostUpdate / Notify: apply collected power-ups, push vitals to the HUD
//!
//! Damage arrives from collision resolution elsewhere through [`Player::take_hit`].

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::bounds::PlayArea;
use crate::common::kinds::PowerUpKind;
use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::{PlayerTuning, Tunables};
use crate::plugins::core::FrameSet;
use crate::plugins::hud::HudUpdate;
use crate::plugins::power_ups::PowerUpCollected;
use crate::plugins::projectiles::messages::{ShotSide, SpawnProjectile};

#[derive(Component, Debug, Clone, PartialEq)]
pub struct Player {
    pub health: i32,
    pub shield: u8,
    alive: bool,
    fire_timer: f32,
    /// Fire-rate power-ups collected this attempt.
    pub fire_rate_picks: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// A shield charge took it.
    Absorbed,
    Damaged,
    /// Already dead.
    Ignored,
}

impl Player {
    pub fn new(tuning: &PlayerTuning) -> Self {
        Self {
            health: tuning.max_health,
            shield: 0,
            alive: true,
            fire_timer: 0.0,
            fire_rate_picks: 0,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// Flag the player dead. Returns `false` if it already was.
    pub fn mark_dead(&mut self) -> bool {
        std::mem::replace(&mut self.alive, false)
    }

    pub fn take_hit(&mut self, damage: i32) -> HitOutcome {
        if !self.alive {
            return HitOutcome::Ignored;
        }
        if self.shield > 0 {
            self.shield -= 1;
            return HitOutcome::Absorbed;
        }
        self.health -= damage;
        HitOutcome::Damaged
    }

    /// `default_interval * factor ^ picks`.
    pub fn fire_interval(&self, tunables: &Tunables) -> f32 {
        let picks = i32::try_from(self.fire_rate_picks).unwrap_or(i32::MAX);
        tunables.player.fire_interval * tunables.power_ups.fire_rate_factor.powi(picks)
    }

    /// Apply a power-up. Returns whether it changed anything.
    pub fn apply(&mut self, kind: PowerUpKind, tuning: &PlayerTuning) -> bool {
        match kind {
            PowerUpKind::FireRate => {
                self.fire_rate_picks += 1;
                true
            }
            PowerUpKind::Health => {
                let healed = (self.health + 1).min(tuning.max_health);
                let effective = healed > self.health;
                self.health = healed;
                effective
            }
            PowerUpKind::Shield => {
                let charged = (self.shield + 1).min(tuning.max_shield);
                let effective = charged > self.shield;
                self.shield = charged;
                effective
            }
        }
    }
}

/// Raised once, the tick the player's health runs out.
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct PlayerDied {
    pub position: Vec2,
}

/// A collected power-up was applied. `effective` is false for a heal at full health
/// or a shield at full charge.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct PowerUpApplied {
    pub kind: PowerUpKind,
    pub effective: bool,
}

#[derive(Resource, Default, Debug)]
struct PlayerInput {
    move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.insert_resource(PlayerInput::default())
        .add_message::<PlayerDied>()
        .add_message::<PowerUpApplied>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(Update, gather_input.run_if(in_state(GameState::InGame)))
        .add_systems(
            FixedUpdate,
            (apply_movement, clamp_to_area, auto_fire).chain().in_set(FrameSet::Simulate),
        )
        .add_systems(
            FixedPostUpdate,
            (
                detect_death.in_set(FrameSet::Death),
                (apply_power_ups, report_vitals).chain().in_set(FrameSet::Notify),
            ),
        );
}

#[inline]
fn active_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Player, [Layer::Enemy, Layer::EnemyShot, Layer::PowerUp])
}

fn spawn(mut commands: Commands, tunables: Res<Tunables>) {
    commands.spawn((
        Name::new("Player"),
        Player::new(&tunables.player),
        Sprite {
            color: Color::srgb(0.2, 0.75, 0.9),
            custom_size: Some(Vec2::splat(28.0)),
            ..default()
        },
        Transform::from_translation(tunables.player_spawn().extend(1.0)),
        RigidBody::Kinematic,
        Collider::circle(14.0),
        active_layers(),
        LinearVelocity::ZERO,
        CollisionEventsEnabled,
        DespawnOnExit(GameState::InGame),
    ));
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis.normalize_or_zero();
}

fn apply_movement(
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&Player, &mut LinearVelocity)>,
) {
    let Ok((player, mut vel)) = q_player.single_mut() else {
        return;
    };
    vel.0 = if player.is_alive() {
        input.move_axis * tunables.player.move_speed
    } else {
        Vec2::ZERO
    };
}

/// Keep the player inside the visible area and below its ceiling.
fn clamp_to_area(
    area: Res<PlayArea>,
    tunables: Res<Tunables>,
    mut q_player: Query<&mut Transform, With<Player>>,
) {
    let Ok(mut tf) = q_player.single_mut() else {
        return;
    };
    let max = Vec2::new(area.half_size.x, tunables.player.ceiling.min(area.half_size.y));
    let clamped = tf.translation.truncate().clamp(-area.half_size, max);
    if clamped != tf.translation.truncate() {
        tf.translation.x = clamped.x;
        tf.translation.y = clamped.y;
    }
}

fn auto_fire(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut shots: MessageWriter<SpawnProjectile>,
    mut q_player: Query<(&mut Player, &Transform)>,
) {
    let Ok((mut player, tf)) = q_player.single_mut() else {
        return;
    };
    if !player.is_alive() {
        return;
    }
    let interval = player.fire_interval(&tunables);
    player.fire_timer += time.delta_secs();
    if player.fire_timer < interval {
        return;
    }
    player.fire_timer -= interval;

    shots.write(SpawnProjectile {
        side: ShotSide::Player,
        position: tf.translation.truncate() + Vec2::new(0.0, 20.0),
        velocity: Vec2::new(0.0, tunables.projectiles.player_speed),
        damage: tunables.projectiles.player_damage,
    });
}

fn detect_death(
    mut died: MessageWriter<PlayerDied>,
    mut q_player: Query<(
        &mut Player,
        &Transform,
        &mut Visibility,
        &mut LinearVelocity,
        &mut CollisionLayers,
    )>,
) {
    for (mut player, tf, mut vis, mut vel, mut layers) in &mut q_player {
        if player.health > 0 || !player.mark_dead() {
            continue;
        }
        *vis = Visibility::Hidden;
        vel.0 = Vec2::ZERO;
        *layers = CollisionLayers::NONE;

        info!("player died after taking a hit at {}", tf.translation.truncate());
        died.write(PlayerDied { position: tf.translation.truncate() });
    }
}

fn apply_power_ups(
    tunables: Res<Tunables>,
    mut collected: MessageReader<PowerUpCollected>,
    mut applied: MessageWriter<PowerUpApplied>,
    mut q_player: Query<&mut Player>,
) {
    let Ok(mut player) = q_player.single_mut() else {
        collected.clear();
        return;
    };
    for ev in collected.read() {
        if !player.is_alive() {
            continue;
        }
        let effective = player.apply(ev.kind, &tunables.player);
        debug!("applied {:?} power-up (effective: {effective})", ev.kind);
        applied.write(PowerUpApplied { kind: ev.kind, effective });
    }
}

/// Push health and shield to the HUD whenever they change.
fn report_vitals(
    mut last: Local<Option<(i32, u8)>>,
    mut hud: MessageWriter<HudUpdate>,
    q_player: Query<Ref<Player>>,
) {
    let Ok(player) = q_player.single() else {
        return;
    };
    if player.is_added() {
        *last = None;
    }
    let now = (player.health.max(0), player.shield);
    if *last == Some(now) {
        return;
    }
    if last.is_none_or(|(health, _)| health != now.0) {
        hud.write(HudUpdate::Health(now.0));
    }
    if last.is_none_or(|(_, shield)| shield != now.1) {
        hud.write(HudUpdate::Shield(now.1));
    }
    *last = Some(now);
}
