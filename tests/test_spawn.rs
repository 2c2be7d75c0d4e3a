use car_runner::compute::spawn::*;
use car_runner::compute::*;
use car_runner::entities::*;
use car_runner::tuning::{IntervalRule, SpawnBand, SpawnChannel, Tuning};

use rand::rngs::StdRng;
use rand::SeedableRng;

fn view() -> Viewport {
    Viewport {
        width: 1200.0,
        height: 600.0,
    }
}

fn make_state(tuning: Tuning) -> GameState {
    let player = new_player(view(), &tuning);
    let mut s = init_state(view(), player, tuning, 0);
    s.mode = GameMode::Playing;
    s
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

fn trees_only() -> Tuning {
    Tuning {
        spawn_channels: vec![SpawnChannel {
            bands: vec![SpawnBand {
                kind: EntityKind::Tree,
                weight: 1.0,
            }],
            interval: IntervalRule {
                base: 50.0,
                jitter: 0.0,
                narrowing: 0.0,
                min: 50.0,
            },
            initial_delay: 1.0,
            cloud_chance: 0.0,
        }],
        boss_score: None,
        ..Tuning::boss_run()
    }
}

fn is_pickup(kind: EntityKind) -> bool {
    matches!(
        kind,
        EntityKind::Fuel | EntityKind::Turbo | EntityKind::Shield | EntityKind::Rocket
    )
}

// ── Band selection ────────────────────────────────────────────────────────────

#[test]
fn pick_walks_cumulative_bands() {
    let bands = &Tuning::boss_run().spawn_channels[0].bands;
    assert_eq!(pick(bands, 0.0), Some(EntityKind::Tree));
    assert_eq!(pick(bands, 0.19), Some(EntityKind::Tree));
    assert_eq!(pick(bands, 0.2), Some(EntityKind::Pothole));
    assert_eq!(pick(bands, 0.45), Some(EntityKind::Ufo));
    assert_eq!(pick(bands, 0.82), Some(EntityKind::Rocket));
}

#[test]
fn pick_past_last_band_spawns_nothing() {
    let bands = &Tuning::boss_run().spawn_channels[0].bands;
    assert_eq!(pick(bands, 0.86), None);
    assert_eq!(pick(bands, 0.999), None);
    assert_eq!(pick(&[], 0.1), None);
}

#[test]
fn interval_narrows_to_floor() {
    let rule = IntervalRule {
        base: 70.0,
        jitter: 60.0,
        narrowing: 0.01,
        min: 40.0,
    };
    assert_eq!(rule.floor_for(0), 70.0);
    assert!((rule.floor_for(1000) - 60.0).abs() < 1e-3);
    assert_eq!(rule.floor_for(10_000), 40.0);
}

// ── Timer ─────────────────────────────────────────────────────────────────────

#[test]
fn nothing_spawns_outside_playing() {
    let mut s = make_state(trees_only());
    s.mode = GameMode::Start;
    spawn_step(&mut s, &mut seeded_rng());
    assert!(s.obstacles.is_empty());
    assert_eq!(s.spawn_timers, vec![1.0]);
}

#[test]
fn expired_timer_spawns_at_right_edge_and_resets() {
    let mut s = make_state(trees_only());
    spawn_step(&mut s, &mut seeded_rng());

    assert_eq!(s.obstacles.len(), 1);
    let tree = &s.obstacles[0];
    assert_eq!(tree.id, 0);
    assert_eq!(tree.x, view().width);
    assert!(!tree.hit);
    assert!(matches!(tree.kind, ObstacleKind::Tree { fall_angle, .. } if fall_angle == 0.0));
    assert_eq!(s.next_id, 1);
    assert_eq!(s.spawn_timers, vec![50.0]);
}

#[test]
fn timer_counts_down_between_spawns() {
    let mut s = make_state(trees_only());
    let mut rng = seeded_rng();
    for _ in 0..50 {
        spawn_step(&mut s, &mut rng);
    }
    assert_eq!(s.obstacles.len(), 1);
    spawn_step(&mut s, &mut rng);
    assert_eq!(s.obstacles.len(), 2);
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut s = make_state(Tuning::boss_run());
    let mut rng = seeded_rng();
    for _ in 0..5000 {
        spawn_step(&mut s, &mut rng);
    }
    assert!(s.obstacles.len() > 20);
    assert!(s.obstacles.windows(2).all(|w| w[0].id < w[1].id));
}

#[test]
fn clouds_come_from_their_own_roll() {
    let mut tuning = trees_only();
    tuning.spawn_channels[0].bands.clear();
    tuning.spawn_channels[0].cloud_chance = 1.0;
    let mut s = make_state(tuning);
    spawn_step(&mut s, &mut seeded_rng());
    assert_eq!(s.obstacles.len(), 1);
    assert_eq!(s.obstacles[0].kind, ObstacleKind::Cloud);
}

#[test]
fn rally_channels_fire_independently() {
    let mut s = make_state(Tuning::rally());
    let mut rng = seeded_rng();
    assert_eq!(s.spawn_timers, vec![60.0, 150.0]);

    for _ in 0..60 {
        spawn_step(&mut s, &mut rng);
    }
    assert_eq!(s.obstacles.len(), 1);
    assert!(matches!(
        s.obstacles[0].kind,
        ObstacleKind::Tree { .. } | ObstacleKind::Ufo { .. } | ObstacleKind::Rock
    ));

    for _ in 60..149 {
        spawn_step(&mut s, &mut rng);
    }
    let kinds = |s: &GameState| -> Vec<EntityKind> {
        s.obstacles
            .iter()
            .map(|o| car_runner::compute::collision::kind_of(&o.kind))
            .collect()
    };
    assert!(!kinds(&s).into_iter().any(is_pickup));

    spawn_step(&mut s, &mut rng);
    assert_eq!(kinds(&s).into_iter().filter(|k| is_pickup(*k)).count(), 1);
}

// ── Instantiation ─────────────────────────────────────────────────────────────

#[test]
fn every_kind_spawns_unhit_at_the_right_edge() {
    let mut rng = seeded_rng();
    let kinds = [
        EntityKind::Tree,
        EntityKind::Pothole,
        EntityKind::Ufo,
        EntityKind::Rock,
        EntityKind::Cloud,
        EntityKind::Fuel,
        EntityKind::Turbo,
        EntityKind::Shield,
        EntityKind::Rocket,
    ];
    for (id, kind) in kinds.into_iter().enumerate() {
        let o = make_obstacle(kind, id as u64, view(), &mut rng);
        assert!(o.x >= view().width, "{kind:?} spawned on screen");
        assert!(o.width > 0.0 && o.height > 0.0);
        assert!(!o.hit);
        assert_eq!(car_runner::compute::collision::kind_of(&o.kind), kind);
    }
}

#[test]
fn randomized_sizes_stay_in_range() {
    let mut rng = seeded_rng();
    for _ in 0..200 {
        let tree = make_obstacle(EntityKind::Tree, 0, view(), &mut rng);
        assert!((80.0..=200.0).contains(&tree.height));

        let pothole = make_obstacle(EntityKind::Pothole, 0, view(), &mut rng);
        assert!((110.0..=160.0).contains(&pothole.width));
        assert!((45.0..=65.0).contains(&pothole.height));
        let ObstacleKind::Pothole { outline } = &pothole.kind else {
            panic!("expected a pothole");
        };
        assert!((14..=18).contains(&outline.len()));
    }
}

#[test]
fn ufo_enters_from_above() {
    let ufo = make_obstacle(EntityKind::Ufo, 0, view(), &mut seeded_rng());
    assert!(ufo.y < 0.0);
    assert!(matches!(
        ufo.kind,
        ObstacleKind::Ufo { phase: UfoPhase::Swooping { .. }, .. }
    ));
}
