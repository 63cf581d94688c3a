//! Shot collision resolution.
//!
//! A contact is only honoured while both parties are active. A notification for a
//! shot that already ended its active period (a second contact in the same tick, or
//! one delivered after release) is a stale callback: ignored and counted.

use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::contact::match_pair;
use crate::common::kinds::EffectKind;
use crate::plugins::effects::messages::SpawnEffect;
use crate::plugins::enemies::{DeathCause, Enemy};
use crate::plugins::player::Player;
use crate::pooling::{PoolDiagnostics, Poolable};

use super::components::{EnemyShot, PlayerShot};
use super::messages::ShotHit;

pub fn resolve_player_shots(
    mut started: MessageReader<CollisionStart>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut hits: MessageWriter<ShotHit>,
    mut effects: MessageWriter<SpawnEffect>,
    mut q_shots: Query<(&mut PlayerShot, &Transform)>,
    mut q_enemies: Query<&mut Enemy>,
) {
    for ev in started.read() {
        let Some((shot_e, enemy_e)) =
            match_pair(ev, |e| q_shots.contains(e), |e| q_enemies.contains(e))
        else {
            continue;
        };
        let Ok((mut shot, tf)) = q_shots.get_mut(shot_e) else {
            continue;
        };
        if !shot.is_active() {
            diagnostics.record_stale("shot hit", shot_e);
            continue;
        }
        let Ok(mut enemy) = q_enemies.get_mut(enemy_e) else {
            continue;
        };
        if !enemy.is_active() || enemy.is_dying() {
            // Already going down this tick; the shot flies on.
            diagnostics.record_stale("shot hit", enemy_e);
            continue;
        }

        let killed = enemy.take_damage(shot.damage, DeathCause::Projectile);
        if !killed {
            effects.write(SpawnEffect::at(EffectKind::Impact, tf.translation.truncate()));
        }
        hits.write(ShotHit { shot: shot_e, target: enemy_e });
        shot.return_to_pool();
    }
}

pub fn resolve_enemy_shots(
    mut started: MessageReader<CollisionStart>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut q_shots: Query<&mut EnemyShot>,
    mut q_player: Query<&mut Player>,
) {
    for ev in started.read() {
        let Some((shot_e, player_e)) =
            match_pair(ev, |e| q_shots.contains(e), |e| q_player.contains(e))
        else {
            continue;
        };
        let Ok(mut shot) = q_shots.get_mut(shot_e) else {
            continue;
        };
        if !shot.is_active() {
            diagnostics.record_stale("shot hit", shot_e);
            continue;
        }
        let Ok(mut player) = q_player.get_mut(player_e) else {
            continue;
        };
        if !player.is_alive() {
            continue;
        }

        player.take_hit(shot.damage);
        shot.return_to_pool();
    }
}
