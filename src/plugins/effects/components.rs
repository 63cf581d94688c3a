use bevy::prelude::*;

use crate::common::kinds::EffectKind;
use crate::common::tunables::EffectTuning;
use crate::plugins::core::{CancelToken, GameRng, SceneEpoch};
use crate::pooling::{Keyed, Lifecycle, Poolable};

/// Two-condition cooperative wait: the minimum duration has elapsed **and** no
/// particle is alive. Polled once per tick; never blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum FinishWait {
    #[default]
    Idle,
    Waiting {
        elapsed: f32,
        duration: f32,
        token: CancelToken,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitPoll {
    Pending,
    Finished,
    /// The scene was reset while waiting. The completion must not run.
    Cancelled,
}

impl FinishWait {
    pub fn start(duration: f32, token: CancelToken) -> Self {
        Self::Waiting { elapsed: 0.0, duration, token }
    }

    /// Advance by `dt` simulated seconds. Resolves to `Idle` on `Finished`/`Cancelled`.
    pub fn poll(&mut self, dt: f32, live_particles: usize, epoch: &SceneEpoch) -> WaitPoll {
        let FinishWait::Waiting { elapsed, duration, token } = self else {
            return WaitPoll::Pending;
        };
        if token.is_cancelled(epoch) {
            *self = FinishWait::Idle;
            return WaitPoll::Cancelled;
        }
        *elapsed += dt;
        if *elapsed >= *duration && live_particles == 0 {
            *self = FinishWait::Idle;
            return WaitPoll::Finished;
        }
        WaitPoll::Pending
    }

    #[inline]
    pub fn is_waiting(&self) -> bool {
        matches!(self, FinishWait::Waiting { .. })
    }
}

/// Pooled visual effect: a burst of particles per sub-emitter.
///
/// Particles are not entities. Each one is just its remaining lifetime, which is all
/// the finish protocol needs to know.
#[derive(Component, Debug, Clone)]
pub struct Effect {
    kind: EffectKind,
    life: Lifecycle,
    /// Scales both particle lifetimes and the minimum duration.
    pub sim_speed: f32,
    particles: Vec<f32>,
    burst: usize,
    wait: FinishWait,
    /// Raise `EffectFinished` on completion.
    pub notify: bool,
}

impl Effect {
    pub fn idle(kind: EffectKind) -> Self {
        Self {
            kind,
            life: Lifecycle::Idle,
            sim_speed: 1.0,
            particles: Vec::new(),
            burst: 0,
            wait: FinishWait::Idle,
            notify: false,
        }
    }

    /// An active effect that has just emitted its burst.
    pub fn play(
        kind: EffectKind,
        tuning: &EffectTuning,
        sim_speed: f32,
        notify: bool,
        token: CancelToken,
        rng: &mut GameRng,
    ) -> Self {
        let particles: Vec<f32> = tuning
            .emitters
            .iter()
            .flat_map(|emitter| (0..emitter.count).map(move |_| emitter))
            .map(|emitter| rng.range(emitter.lifetime[0], emitter.lifetime[1]))
            .collect();

        Self {
            kind,
            life: Lifecycle::Active,
            sim_speed,
            burst: particles.len(),
            particles,
            wait: FinishWait::start(tuning.duration, token),
            notify,
        }
    }

    #[inline]
    pub fn kind(&self) -> EffectKind {
        self.kind
    }

    #[inline]
    pub fn live_particles(&self) -> usize {
        self.particles.len()
    }

    /// Fraction of the burst still alive, for fading.
    pub fn remaining(&self) -> f32 {
        if self.burst == 0 {
            0.0
        } else {
            self.particles.len() as f32 / self.burst as f32
        }
    }

    #[inline]
    pub fn wait(&self) -> &FinishWait {
        &self.wait
    }

    /// One tick of `dt` real seconds.
    pub fn tick(&mut self, dt: f32, epoch: &SceneEpoch) -> WaitPoll {
        let sim_dt = dt * self.sim_speed;
        self.particles.retain_mut(|left| {
            *left -= sim_dt;
            *left > 0.0
        });
        self.wait.poll(sim_dt, self.particles.len(), epoch)
    }
}

impl Poolable for Effect {
    const KIND: &'static str = "effect";

    fn lifecycle(&self) -> Lifecycle {
        self.life
    }

    fn set_lifecycle(&mut self, lifecycle: Lifecycle) {
        self.life = lifecycle;
    }

    fn clear(&mut self) {
        self.particles.clear();
        self.burst = 0;
        self.wait = FinishWait::Idle;
        self.notify = false;
        self.sim_speed = 1.0;
    }
}

impl Keyed for Effect {
    type Key = EffectKind;

    fn pool_key(&self) -> EffectKind {
        self.kind
    }
}
