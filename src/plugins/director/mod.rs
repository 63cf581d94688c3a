//! Spawn/event orchestrator.
//!
//! # Per tick
//! ```text
//! Clock      advance_clock
//! Spawn      spawn_enemies: timer -> Pool<Enemy>::acquire, jittered position,
//!            listeners SCORE | DROPS wired, EnemySpawned
//! ```
//!
//! # Terminal state
//! ```text
//! Death      player: PlayerDied
//! Reclaim    begin_reset: stop clock, bump SceneEpoch (pending effect waits cancel),
//!            HudUpdate::FadeOut
//!            reclaim every pool: enemies, both shot pools, effects, power-ups
//! Aftermath  play_death_explosion (slow motion, acquired after the reclaim)
//!            ... EffectFinished for that explosion -> GameState::GameOver
//! OnEnter(GameOver)  HudUpdate::GameOver(final stats)
//! RetryRequested / R -> GameState::InGame -> begin_attempt
//! ```
//!
//! Pools and their idle instances outlive attempts; only session state is reset.

use bevy::prelude::*;

use crate::common::kinds::EffectKind;
use crate::common::listeners::Listeners;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::core::{FrameSet, GameClock, GameRng, SceneEpoch};
use crate::plugins::effects::components::Effect;
use crate::plugins::effects::messages::{EffectFinished, SpawnEffect};
use crate::plugins::effects::pool::{play_effect, EffectPool};
use crate::plugins::enemies::{spawn_enemy, Enemy, EnemyPool};
use crate::plugins::hud::HudUpdate;
use crate::plugins::player::PlayerDied;
use crate::plugins::power_ups::PowerUp;
use crate::plugins::projectiles::components::{EnemyShot, PlayerShot};
use crate::plugins::score::Scoreboard;
use crate::pooling::systems::{reclaim_keyed_pool, reclaim_pool};
use crate::pooling::PoolDiagnostics;

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpawned {
    pub enemy: Entity,
}

/// Ask for a new attempt from the game-over screen.
#[derive(Message, Clone, Copy, Debug, Default)]
pub struct RetryRequested;

#[derive(Resource, Debug, Default)]
pub struct SpawnTimer {
    accumulated: f32,
}

/// Terminal-state bookkeeping for the current attempt.
#[derive(Resource, Debug, Default)]
pub struct SceneReset {
    /// Player death position, set between `begin_reset` and the explosion.
    pending: Option<Vec2>,
    /// The slow-motion explosion that ends the attempt.
    pub explosion: Option<Entity>,
}

impl SceneReset {
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

fn reset_pending(reset: Res<SceneReset>) -> bool {
    reset.is_pending()
}

pub fn plugin(app: &mut App) {
    app.init_resource::<SpawnTimer>()
        .init_resource::<SceneReset>()
        .add_message::<EnemySpawned>()
        .add_message::<RetryRequested>()
        .add_systems(OnEnter(GameState::InGame), begin_attempt)
        .add_systems(OnEnter(GameState::GameOver), push_final_stats)
        .add_systems(FixedUpdate, (
            advance_clock.in_set(FrameSet::Clock),
            spawn_enemies.in_set(FrameSet::Spawn),
        ))
        .add_systems(
            FixedPostUpdate,
            (
                (
                    begin_reset,
                    (
                        reclaim_pool::<Enemy>,
                        reclaim_pool::<PlayerShot>,
                        reclaim_pool::<EnemyShot>,
                        reclaim_keyed_pool::<Effect>,
                        reclaim_keyed_pool::<PowerUp>,
                    )
                        .run_if(reset_pending),
                )
                    .chain()
                    .in_set(FrameSet::Reclaim),
                (play_death_explosion, watch_death_explosion)
                    .chain()
                    .in_set(FrameSet::Aftermath),
            ),
        )
        .add_systems(
            Update,
            (request_retry, handle_retry).chain().run_if(in_state(GameState::GameOver)),
        );
}

fn begin_attempt(
    mut board: ResMut<Scoreboard>,
    mut clock: ResMut<GameClock>,
    mut timer: ResMut<SpawnTimer>,
    mut reset: ResMut<SceneReset>,
) {
    *board = Scoreboard::default();
    *clock = GameClock::default();
    *timer = SpawnTimer::default();
    *reset = SceneReset::default();
    info!("attempt started");
}

fn advance_clock(time: Res<Time>, mut clock: ResMut<GameClock>) {
    if clock.running {
        clock.elapsed += time.delta_secs();
    }
}

/// At most one enemy per tick; the timer keeps its remainder.
#[allow(clippy::too_many_arguments)]
fn spawn_enemies(
    mut commands: Commands,
    time: Res<Time>,
    clock: Res<GameClock>,
    tunables: Res<Tunables>,
    mut timer: ResMut<SpawnTimer>,
    mut pool: ResMut<EnemyPool>,
    mut rng: ResMut<GameRng>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut spawned: MessageWriter<EnemySpawned>,
) {
    if !clock.running {
        return;
    }
    let director = &tunables.director;
    timer.accumulated += time.delta_secs();
    if timer.accumulated < director.enemy_spawn_interval {
        return;
    }
    timer.accumulated -= director.enemy_spawn_interval;

    let position = Vec2::from_array(director.spawn_origin)
        + rng.jitter(Vec2::from_array(director.spawn_jitter));
    match spawn_enemy(
        &mut commands,
        &mut pool,
        &mut rng,
        &tunables.enemy,
        clock.elapsed,
        position,
        Listeners::SCORE | Listeners::DROPS,
    ) {
        Ok(enemy) => {
            spawned.write(EnemySpawned { enemy });
        }
        Err(err) => diagnostics.record(&err),
    }
}

fn begin_reset(
    mut died: MessageReader<PlayerDied>,
    mut clock: ResMut<GameClock>,
    mut epoch: ResMut<SceneEpoch>,
    mut reset: ResMut<SceneReset>,
    mut hud: MessageWriter<HudUpdate>,
) {
    let Some(ev) = died.read().last() else {
        return;
    };
    if reset.is_pending() || reset.explosion.is_some() {
        return;
    }
    clock.stop();
    epoch.bump();
    reset.pending = Some(ev.position);
    hud.write(HudUpdate::FadeOut);
    info!("player died at {:.1}s, reclaiming every pool", clock.elapsed);
}

#[allow(clippy::too_many_arguments)]
fn play_death_explosion(
    mut commands: Commands,
    mut reset: ResMut<SceneReset>,
    mut pool: ResMut<EffectPool>,
    mut rng: ResMut<GameRng>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut next: ResMut<NextState<GameState>>,
    tunables: Res<Tunables>,
    epoch: Res<SceneEpoch>,
) {
    let Some(position) = reset.pending.take() else {
        return;
    };
    let req = SpawnEffect {
        kind: EffectKind::Explosion,
        position,
        sim_speed: tunables.director.death_explosion_speed,
        notify: true,
    };
    match play_effect(&mut commands, &mut pool, &mut rng, &tunables, &epoch, &req) {
        Ok(e) => reset.explosion = Some(e),
        Err(err) => {
            // Nothing to wait for.
            diagnostics.record(&err);
            next.set(GameState::GameOver);
        }
    }
}

fn watch_death_explosion(
    mut finished: MessageReader<EffectFinished>,
    mut reset: ResMut<SceneReset>,
    mut next: ResMut<NextState<GameState>>,
) {
    let Some(explosion) = reset.explosion else {
        finished.clear();
        return;
    };
    if finished.read().any(|ev| ev.entity == explosion) {
        reset.explosion = None;
        next.set(GameState::GameOver);
    }
}

fn push_final_stats(board: Res<Scoreboard>, mut hud: MessageWriter<HudUpdate>) {
    let stats = board.final_stats();
    info!(
        "game over: score {}, killed {}, missed {}, accuracy {:.2}",
        stats.score, stats.enemies_killed, stats.enemies_missed, stats.accuracy
    );
    hud.write(HudUpdate::GameOver(stats));
}

fn request_retry(keys: Option<Res<ButtonInput<KeyCode>>>, mut retry: MessageWriter<RetryRequested>) {
    if keys.is_some_and(|keys| keys.just_pressed(KeyCode::KeyR)) {
        retry.write(RetryRequested);
    }
}

fn handle_retry(mut retry: MessageReader<RetryRequested>, mut next: ResMut<NextState<GameState>>) {
    if retry.read().count() > 0 {
        next.set(GameState::InGame);
    }
}
