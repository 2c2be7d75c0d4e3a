//! Timer-driven, weighted-random entity spawning.

use std::f32::consts::TAU;
use std::sync::Arc;

use rand::Rng;
use tracing::trace;

use crate::entities::{
    EntityKind, GameMode, GameState, Obstacle, ObstacleKind, Point, UfoPhase, Viewport,
};
use crate::tuning::SpawnBand;

/// Map a uniform roll in `[0, 1)` onto a cumulative band table.
/// Rolls past the last band select nothing.
pub fn pick(bands: &[SpawnBand], roll: f32) -> Option<EntityKind> {
    let mut upper = 0.0;
    for band in bands {
        upper += band.weight;
        if roll < upper {
            return Some(band.kind);
        }
    }
    None
}

/// Count every spawn channel down by one frame and fire the ones that expire.
pub fn spawn_step(state: &mut GameState, rng: &mut impl Rng) {
    if state.mode != GameMode::Playing {
        return;
    }
    let tuning = Arc::clone(&state.tuning);

    for (timer, channel) in state.spawn_timers.iter_mut().zip(&tuning.spawn_channels) {
        *timer -= 1.0;
        if *timer > 0.0 {
            continue;
        }

        if let Some(kind) = pick(&channel.bands, rng.gen::<f32>()) {
            let obstacle = make_obstacle(kind, state.next_id, state.viewport, rng);
            trace!(id = obstacle.id, ?kind, x = obstacle.x, y = obstacle.y, "spawned");
            state.next_id += 1;
            state.obstacles.push(obstacle);
        }

        if channel.cloud_chance > 0.0 && rng.gen::<f32>() < channel.cloud_chance {
            let cloud = make_obstacle(EntityKind::Cloud, state.next_id, state.viewport, rng);
            state.next_id += 1;
            state.obstacles.push(cloud);
        }

        let interval = &channel.interval;
        *timer = interval.floor_for(state.run_frames) + rng.gen::<f32>() * interval.jitter;
    }
}

/// Build a fresh, un-hit entity of `kind` just beyond the right edge.
pub fn make_obstacle(kind: EntityKind, id: u64, view: Viewport, rng: &mut impl Rng) -> Obstacle {
    let (w, h) = (view.width, view.height);
    let (x, y, width, height, kind) = match kind {
        EntityKind::Tree => {
            let height = 80.0 + rng.gen::<f32>() * 120.0;
            let kind = ObstacleKind::Tree {
                trunk_ratio: 0.3 + 0.4 * rng.gen::<f32>(),
                fall_angle: 0.0,
            };
            (w, h - 30.0 - height, 60.0, height, kind)
        }
        EntityKind::Pothole => {
            let width = 110.0 + rng.gen::<f32>() * 50.0;
            let height = 45.0 + rng.gen::<f32>() * 20.0;
            let outline = pothole_outline(width, height, rng);
            (w, h - 100.0, width, height, ObstacleKind::Pothole { outline })
        }
        EntityKind::Ufo => {
            let phase = UfoPhase::Swooping {
                dy: 2.0 + rng.gen::<f32>(),
                target_y: h - 200.0,
            };
            (w + 80.0, -100.0, 90.0, 45.0, ObstacleKind::Ufo { dx: -3.0, phase })
        }
        EntityKind::Rock => (w + 80.0, h - 140.0, 60.0, 40.0, ObstacleKind::Rock),
        EntityKind::Cloud => {
            let y = 180.0 + rng.gen::<f32>() * 60.0;
            (w, y, 90.0, 50.0, ObstacleKind::Cloud)
        }
        EntityKind::Fuel => (w, h - 140.0, 50.0, 50.0, ObstacleKind::Fuel),
        EntityKind::Turbo => (w, h - 80.0, 50.0, 50.0, ObstacleKind::Turbo),
        EntityKind::Shield => (w, h - 80.0, 50.0, 50.0, ObstacleKind::Shield),
        EntityKind::Rocket => (w, h - 140.0, 50.0, 50.0, ObstacleKind::Rocket),
    };

    Obstacle {
        id,
        x,
        y,
        width,
        height,
        kind,
        hit: false,
    }
}

/// 14 to 18 points around an ellipse, each radius jittered to 80-120%.
fn pothole_outline(width: f32, height: f32, rng: &mut impl Rng) -> Vec<Point> {
    let count = rng.gen_range(14..=18);
    (0..count)
        .map(|i| {
            let angle = TAU / count as f32 * i as f32;
            let rx = width / 2.0 * (0.8 + rng.gen::<f32>() * 0.4);
            let ry = height / 2.0 * (0.8 + rng.gen::<f32>() * 0.4);
            Point {
                x: width / 2.0 + angle.cos() * rx,
                y: height / 2.0 + angle.sin() * ry,
            }
        })
        .collect()
}
