use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{run_system_once, send};

fn stats() -> FinalStats {
    FinalStats {
        score: 120,
        enemies_killed: 12,
        enemies_missed: 3,
        collisions: 1,
        accuracy: 0.5,
        effective_heals: 2,
        power_ups_picked: 4,
    }
}

#[test]
fn latest_value_of_each_field_wins() {
    let mut hud = Hud::default();
    for update in [
        HudUpdate::Score(10),
        HudUpdate::Health(3),
        HudUpdate::Score(30),
        HudUpdate::Shield(1),
        HudUpdate::Health(2),
    ] {
        hud.apply(&update);
    }
    assert_eq!(hud, Hud { score: 30, health: 2, shield: 1, faded: false, final_stats: None });
}

#[test]
fn fade_and_game_over_are_sticky_until_reset() {
    let mut world = World::new();
    world.init_resource::<Hud>();
    send(&mut world, HudUpdate::Score(120));
    send(&mut world, HudUpdate::FadeOut);
    send(&mut world, HudUpdate::GameOver(stats()));
    run_system_once(&mut world, mirror_updates);

    let hud = world.resource::<Hud>();
    assert!(hud.faded);
    assert_eq!(hud.final_stats, Some(stats()));
    assert_eq!(hud.score, 120);

    run_system_once(&mut world, reset_hud);
    assert_eq!(*world.resource::<Hud>(), Hud::default());
}
