//! Helpers for reading physics contact notifications.

use avian2d::prelude::*;
use bevy::prelude::*;

#[derive(Clone, Copy, Debug)]
struct CollisionTarget {
    collider: Entity,
    body: Option<Entity>,
}

impl CollisionTarget {
    #[inline]
    fn gameplay_owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

/// Gameplay entities on both sides of a contact (the body when there is one).
#[inline]
pub fn owners(ev: &CollisionStart) -> (Entity, Entity) {
    let a = CollisionTarget { collider: ev.collider1, body: ev.body1 };
    let b = CollisionTarget { collider: ev.collider2, body: ev.body2 };
    (a.gameplay_owner(), b.gameplay_owner())
}

/// Order a contact as `(a, b)` with `is_a(a)` and `is_b(b)`, whichever way round
/// the physics reported it.
pub fn match_pair(
    ev: &CollisionStart,
    is_a: impl Fn(Entity) -> bool,
    is_b: impl Fn(Entity) -> bool,
) -> Option<(Entity, Entity)> {
    let (x, y) = owners(ev);
    if is_a(x) && is_b(y) {
        Some((x, y))
    } else if is_a(y) && is_b(x) {
        Some((y, x))
    } else {
        None
    }
}
