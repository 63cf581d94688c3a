//! Scoring and session statistics.
//!
//! Pure listeners: nothing here touches a pool or an entity. Everything is read from
//! messages in the `Notify` set, before the dying instances are released.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::kinds::PowerUpKind;
use crate::common::listeners::Listeners;
use crate::common::tunables::Tunables;
use crate::plugins::core::FrameSet;
use crate::plugins::director::EnemySpawned;
use crate::plugins::enemies::{DeathCause, EnemyDied};
use crate::plugins::hud::HudUpdate;
use crate::plugins::player::PowerUpApplied;
use crate::plugins::projectiles::messages::{ShotHit, ShotSide, SpawnProjectile};

#[derive(Resource, Debug, Clone, Default, PartialEq)]
pub struct Scoreboard {
    pub score: u32,
    pub enemies_spawned: u32,
    /// Enemies shot down.
    pub enemies_killed: u32,
    /// Enemies that rammed the player.
    pub collisions: u32,
    pub shots_fired: u32,
    pub shots_hit: u32,
    /// Health pickups that actually restored health.
    pub effective_heals: u32,
    picked: HashMap<PowerUpKind, u32>,
}

/// End-of-attempt summary pushed to the game-over screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalStats {
    pub score: u32,
    pub enemies_killed: u32,
    pub enemies_missed: u32,
    pub collisions: u32,
    pub accuracy: f32,
    pub effective_heals: u32,
    pub power_ups_picked: u32,
}

impl Scoreboard {
    /// Hits over shots fired; `0.0` when nothing was fired.
    pub fn accuracy(&self) -> f32 {
        if self.shots_fired == 0 {
            0.0
        } else {
            self.shots_hit as f32 / self.shots_fired as f32
        }
    }

    /// Spawned enemies that were not shot down.
    pub fn missed(&self) -> u32 {
        self.enemies_spawned.saturating_sub(self.enemies_killed)
    }

    pub fn picked_of(&self, kind: PowerUpKind) -> u32 {
        self.picked.get(&kind).copied().unwrap_or(0)
    }

    /// Power-ups picked, health pickups excluded (those are reported as heals).
    pub fn picked_power_ups(&self) -> u32 {
        self.picked
            .iter()
            .filter(|(kind, _)| **kind != PowerUpKind::Health)
            .map(|(_, n)| n)
            .sum()
    }

    pub fn record_pick(&mut self, kind: PowerUpKind, effective: bool) {
        *self.picked.entry(kind).or_default() += 1;
        if kind == PowerUpKind::Health && effective {
            self.effective_heals += 1;
        }
    }

    /// Book an enemy death. Returns the score awarded.
    pub fn record_death(&mut self, cause: DeathCause, tunables: &Tunables) -> u32 {
        let award = match cause {
            DeathCause::Projectile => {
                self.enemies_killed += 1;
                tunables.game.score_per_kill
            }
            DeathCause::PlayerCollision => {
                self.collisions += 1;
                if tunables.game.score_on_collision { tunables.game.score_per_kill } else { 0 }
            }
        };
        self.score += award;
        award
    }

    pub fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score,
            enemies_killed: self.enemies_killed,
            enemies_missed: self.missed(),
            collisions: self.collisions,
            accuracy: self.accuracy(),
            effective_heals: self.effective_heals,
            power_ups_picked: self.picked_power_ups(),
        }
    }
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Scoreboard>().add_systems(
        FixedPostUpdate,
        (count_spawns, count_deaths, count_shots, count_power_ups).in_set(FrameSet::Notify),
    );
}

fn count_spawns(mut board: ResMut<Scoreboard>, mut spawned: MessageReader<EnemySpawned>) {
    board.enemies_spawned += spawned.read().count() as u32;
}

fn count_deaths(
    tunables: Res<Tunables>,
    mut board: ResMut<Scoreboard>,
    mut died: MessageReader<EnemyDied>,
    mut hud: MessageWriter<HudUpdate>,
) {
    let before = board.score;
    for ev in died.read().filter(|ev| ev.listeners.contains(Listeners::SCORE)) {
        board.record_death(ev.cause, &tunables);
    }
    if board.score != before {
        hud.write(HudUpdate::Score(board.score));
    }
}

fn count_shots(
    mut board: ResMut<Scoreboard>,
    mut fired: MessageReader<SpawnProjectile>,
    mut hits: MessageReader<ShotHit>,
) {
    board.shots_fired += fired.read().filter(|req| req.side == ShotSide::Player).count() as u32;
    board.shots_hit += hits.read().count() as u32;
}

fn count_power_ups(mut board: ResMut<Scoreboard>, mut applied: MessageReader<PowerUpApplied>) {
    for ev in applied.read() {
        board.record_pick(ev.kind, ev.effective);
    }
}
