//! Play-area bounds query.
//!
//! Stands in for the viewport collaborator: the only question gameplay asks is
//! whether a position has left the visible area (plus a small tolerance).

use bevy::prelude::*;

use super::tunables::WorldTuning;
use crate::pooling::Poolable;

pub trait BoundsQuery {
    fn is_outside(&self, pos: Vec2) -> bool;
}

/// Axis-aligned play area centred on the origin.
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct PlayArea {
    pub half_size: Vec2,
    /// Fraction of the full size an entity may travel past an edge before it counts as gone.
    pub margin: f32,
}

impl Default for PlayArea {
    fn default() -> Self {
        Self::from_tuning(&WorldTuning::default())
    }
}

impl PlayArea {
    pub fn from_tuning(world: &WorldTuning) -> Self {
        Self { half_size: Vec2::from_array(world.half_size), margin: world.margin }
    }

    /// Clamp a position into the visible area (no margin).
    #[inline]
    pub fn clamp(&self, pos: Vec2) -> Vec2 {
        pos.clamp(-self.half_size, self.half_size)
    }
}

impl BoundsQuery for PlayArea {
    #[inline]
    fn is_outside(&self, pos: Vec2) -> bool {
        let limit = self.half_size * (1.0 + 2.0 * self.margin);
        pos.x.abs() > limit.x || pos.y.abs() > limit.y
    }
}

/// Terminal condition shared by every pooled mover: leaving the play area.
///
/// Ends the active period without any death event.
pub fn return_out_of_bounds<T: Poolable>(area: Res<PlayArea>, mut q: Query<(&mut T, &Transform)>) {
    for (mut item, tf) in &mut q {
        if item.is_active() && area.is_outside(tf.translation.truncate()) {
            item.return_to_pool();
        }
    }
}
