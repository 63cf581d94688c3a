use bevy::prelude::*;

use crate::common::tunables::Tunables;
use crate::plugins::core::{GameRng, SceneEpoch};
use crate::pooling::{PoolDiagnostics, Poolable};

use super::components::{Effect, WaitPoll};
use super::messages::{EffectFinished, SpawnEffect};
use super::pool::{play_effect, EffectPool};

/// Consumer of `SpawnEffect`; the single writer of the effect pool during play.
pub fn allocate_effects(
    mut commands: Commands,
    mut pool: ResMut<EffectPool>,
    mut rng: ResMut<GameRng>,
    mut diagnostics: ResMut<PoolDiagnostics>,
    mut reader: MessageReader<SpawnEffect>,
    tunables: Res<Tunables>,
    epoch: Res<SceneEpoch>,
) {
    for req in reader.read() {
        if let Err(err) = play_effect(&mut commands, &mut pool, &mut rng, &tunables, &epoch, req) {
            // Effect skipped; gameplay carries on without it.
            diagnostics.record(&err);
        }
    }
}

/// Age particles and poll each effect's finish wait.
pub fn advance_effects(
    time: Res<Time>,
    epoch: Res<SceneEpoch>,
    mut finished: MessageWriter<EffectFinished>,
    mut q: Query<(Entity, &mut Effect)>,
) {
    let dt = time.delta_secs();
    for (e, mut effect) in &mut q {
        if !effect.is_active() {
            continue;
        }
        match effect.tick(dt, &epoch) {
            WaitPoll::Pending => {}
            WaitPoll::Finished => {
                if effect.notify {
                    finished.write(EffectFinished { entity: e, kind: effect.kind() });
                }
                effect.return_to_pool();
            }
            WaitPoll::Cancelled => {
                debug!("{:?} effect {e} abandoned by scene reset", effect.kind());
                effect.return_to_pool();
            }
        }
    }
}

pub fn fade_effects(mut q: Query<(&Effect, &mut Sprite)>) {
    for (effect, mut sprite) in &mut q {
        if effect.is_active() {
            sprite.color.set_alpha(effect.remaining().max(0.15));
        }
    }
}
