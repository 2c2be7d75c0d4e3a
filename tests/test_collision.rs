use car_runner::compute::collision::*;
use car_runner::compute::*;
use car_runner::entities::*;
use car_runner::tuning::Tuning;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn view() -> Viewport {
    Viewport {
        width: 1200.0,
        height: 600.0,
    }
}

/// Boss-run tuning with spawning and the boss switched off.
fn quiet_tuning() -> Tuning {
    Tuning {
        spawn_channels: Vec::new(),
        boss_score: None,
        ..Tuning::boss_run()
    }
}

fn make_state(tuning: Tuning) -> GameState {
    let player = new_player(view(), &tuning);
    let mut s = init_state(view(), player, tuning, 0);
    s.mode = GameMode::Playing;
    s
}

/// An entity squarely inside the grounded player's inset box.
fn touching(id: u64, kind: ObstacleKind) -> Obstacle {
    Obstacle {
        id,
        x: 150.0,
        y: 460.0,
        width: 60.0,
        height: 60.0,
        kind,
        hit: false,
    }
}

fn tree() -> ObstacleKind {
    ObstacleKind::Tree {
        trunk_ratio: 0.5,
        fall_angle: 0.0,
    }
}

fn ufo() -> ObstacleKind {
    ObstacleKind::Ufo {
        dx: -3.0,
        phase: UfoPhase::Cruising,
    }
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── Boxes ─────────────────────────────────────────────────────────────────────

#[test]
fn touching_edges_do_not_overlap() {
    let a = Rect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 };
    let b = Rect { x: 10.0, y: 0.0, width: 10.0, height: 10.0 };
    assert!(!a.overlaps(&b));
    let c = Rect { x: 9.0, y: 9.0, width: 10.0, height: 10.0 };
    assert!(a.overlaps(&c));
}

#[test]
fn inset_shrinks_every_side() {
    let r = Rect { x: 100.0, y: 450.0, width: 180.0, height: 100.0 }.inset(20.0);
    assert_eq!(r, Rect { x: 120.0, y: 470.0, width: 140.0, height: 60.0 });
}

#[test]
fn near_miss_inside_buffer_is_forgiven() {
    let mut s = make_state(quiet_tuning());
    // Overlaps the raw player box (x 100..280) but not the inset one (x 120..260).
    s.obstacles.push(Obstacle { x: 265.0, ..touching(1, tree()) });
    let effects = resolve_collisions(&mut s);
    assert!(effects.is_empty());
    assert_eq!(s.player.health, 100.0);
    assert!(!s.obstacles[0].hit);
}

// ── Hazards ───────────────────────────────────────────────────────────────────

#[test]
fn tree_hit_damages_once() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(7, tree()));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.player.health, 75.0);
    assert!(s.obstacles[0].hit);
    assert_eq!(
        effects,
        vec![Effect::Damaged { id: 7, kind: EntityKind::Tree, amount: 25.0 }]
    );

    // Same overlap again: nothing more happens.
    let effects = resolve_collisions(&mut s);
    assert!(effects.is_empty());
    assert_eq!(s.player.health, 75.0);
    assert_eq!(s.obstacles.len(), 1);
}

#[test]
fn tree_hit_through_update_applies_once() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(1, tree()));
    let mut rng = seeded_rng();

    let s1 = update(&s, &Input::default(), &mut rng);
    assert_eq!(s1.player.health, 75.0);
    assert!(s1.obstacles[0].hit);

    let s2 = update(&s1, &Input::default(), &mut rng);
    assert_eq!(s2.player.health, 75.0);
    assert!(s2.effects.is_empty());
}

#[test]
fn health_clamps_at_zero() {
    let mut s = make_state(quiet_tuning());
    s.player.health = 10.0;
    s.obstacles.push(touching(1, ObstacleKind::Pothole { outline: Vec::new() }));
    resolve_collisions(&mut s);
    assert_eq!(s.player.health, 0.0);
}

#[test]
fn shielded_ufo_spins_away_without_damage() {
    let mut s = make_state(quiet_tuning());
    s.statuses.shield = 100;
    s.obstacles.push(touching(3, ufo()));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.player.health, 100.0);
    assert_eq!(s.obstacles.len(), 1, "ufo stays for its escape animation");
    let ufo = &s.obstacles[0];
    assert!(ufo.hit);
    assert!(matches!(
        ufo.kind,
        ObstacleKind::Ufo { phase: UfoPhase::Spinning { .. }, .. }
    ));
    assert_eq!(
        effects,
        vec![Effect::Absorbed { id: 3, kind: EntityKind::Ufo, guard: Guard::Shield }]
    );
    assert!(s.floating_texts.iter().any(|t| t.text == "Shield block!"));
}

#[test]
fn unshielded_ufo_hurts_and_follows() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(3, ufo()));

    resolve_collisions(&mut s);
    assert_eq!(s.player.health, 75.0);
    assert!(matches!(
        s.obstacles[0].kind,
        ObstacleKind::Ufo { phase: UfoPhase::Following { frames_left: 90 }, .. }
    ));
}

#[test]
fn flight_ignores_ground_hazards_but_not_ufos() {
    let mut s = make_state(quiet_tuning());
    s.statuses.rocket = 50;
    s.obstacles.push(touching(1, tree()));
    s.obstacles.push(touching(2, ufo()));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.player.health, 75.0);
    assert_eq!(
        effects,
        vec![
            Effect::Absorbed { id: 1, kind: EntityKind::Tree, guard: Guard::Flight },
            Effect::Damaged { id: 2, kind: EntityKind::Ufo, amount: 25.0 },
        ]
    );
}

#[test]
fn flight_immunity_can_be_disabled() {
    let mut s = make_state(Tuning {
        flight_immunity: false,
        ..quiet_tuning()
    });
    s.statuses.rocket = 50;
    s.obstacles.push(touching(1, ObstacleKind::Rock));
    resolve_collisions(&mut s);
    assert_eq!(s.player.health, 75.0);
}

#[test]
fn clouds_never_collide() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(1, ObstacleKind::Cloud));
    let effects = resolve_collisions(&mut s);
    assert!(effects.is_empty());
    assert!(!s.obstacles[0].hit);
}

// ── Pickups ───────────────────────────────────────────────────────────────────

#[test]
fn fuel_pickup_clamps_and_is_removed() {
    let mut s = make_state(quiet_tuning());
    s.player.fuel = 80.0;
    s.obstacles.push(touching(4, ObstacleKind::Fuel));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.player.fuel, 100.0);
    assert!(s.obstacles.is_empty());
    assert_eq!(effects, vec![Effect::Refueled { id: 4, amount: 20.0 }]);
    assert_eq!(s.floating_texts[0].text, "+25% Fuel");
}

#[test]
fn turbo_pickup_records_current_speed() {
    let mut s = make_state(quiet_tuning());
    s.speed = 3.4;
    s.obstacles.push(touching(1, ObstacleKind::Turbo));
    resolve_collisions(&mut s);

    let turbo = s.statuses.turbo.expect("turbo active");
    assert_eq!(turbo.restore_speed, 3.4);
    assert_eq!(turbo.frames_left, 300);
    assert!(s.obstacles.is_empty());
}

#[test]
fn second_turbo_refreshes_but_keeps_restore_speed() {
    let mut s = make_state(quiet_tuning());
    s.speed = 6.0;
    s.statuses.turbo = Some(Turbo {
        frames_left: 12,
        restore_speed: 3.2,
    });
    s.obstacles.push(touching(1, ObstacleKind::Turbo));
    resolve_collisions(&mut s);

    let turbo = s.statuses.turbo.expect("turbo active");
    assert_eq!(turbo.frames_left, 300);
    assert_eq!(turbo.restore_speed, 3.2);
}

#[test]
fn rocket_pickup_starts_flight_and_leaves() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(9, ObstacleKind::Rocket));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.statuses.rocket, 300);
    assert!(!s.player.on_ground);
    assert_eq!(s.player.dy, 0.0);
    assert!(s.obstacles.is_empty());
    assert_eq!(effects, vec![Effect::RocketIgnited { id: 9 }]);
}

// ── Ordering within a frame ───────────────────────────────────────────────────

#[test]
fn shield_collected_first_protects_later_hazards() {
    let mut s = make_state(quiet_tuning());
    s.obstacles.push(touching(1, ObstacleKind::Shield));
    s.obstacles.push(touching(2, tree()));

    let effects = resolve_collisions(&mut s);
    assert_eq!(s.player.health, 100.0);
    assert_eq!(
        effects,
        vec![
            Effect::ShieldRaised { id: 1 },
            Effect::Absorbed { id: 2, kind: EntityKind::Tree, guard: Guard::Shield },
        ]
    );
    // The shield pickup is compacted out; the tree stays, flagged.
    assert_eq!(s.obstacles.len(), 1);
    assert_eq!(s.obstacles[0].id, 2);
    assert!(s.obstacles[0].hit);
}

#[test]
fn snapshot_statuses_resolves_against_frame_start() {
    let mut s = make_state(Tuning {
        snapshot_statuses: true,
        ..quiet_tuning()
    });
    s.obstacles.push(touching(1, ObstacleKind::Shield));
    s.obstacles.push(touching(2, tree()));

    resolve_collisions(&mut s);
    assert_eq!(s.player.health, 75.0);
    assert_eq!(s.statuses.shield, 300);
}

#[test]
fn compaction_keeps_unrelated_entities_in_order() {
    let mut s = make_state(quiet_tuning());
    s.player.fuel = 50.0;
    s.obstacles.push(Obstacle { x: 900.0, ..touching(1, tree()) });
    s.obstacles.push(touching(2, ObstacleKind::Fuel));
    s.obstacles.push(touching(3, ObstacleKind::Fuel));
    s.obstacles.push(Obstacle { x: 1000.0, ..touching(4, ObstacleKind::Fuel) });

    resolve_collisions(&mut s);
    assert_eq!(s.player.fuel, 100.0);
    let ids: Vec<u64> = s.obstacles.iter().map(|o| o.id).collect();
    assert_eq!(ids, vec![1, 4]);
}
