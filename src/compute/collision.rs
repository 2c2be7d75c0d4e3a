//! Player-vs-registry collision resolution.
//!
//! Effects are applied at most once per entity: the `hit` flag is set in the
//! same branch that applies the effect, and entities already flagged are
//! skipped. Collected pickups are compacted out after the pass, never during.

use tracing::debug;

use crate::entities::{
    Effect, EntityKind, FloatingText, GameState, Guard, Obstacle, ObstacleKind, Player, Statuses,
    Turbo, UfoPhase,
};
use crate::tuning::Tuning;

use super::motion::UFO_FOLLOW_FRAMES;

// ── Boxes ────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Strict overlap; touching edges do not collide.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Shrink by `by` on every side.
    pub fn inset(&self, by: f32) -> Rect {
        Rect {
            x: self.x + by,
            y: self.y + by,
            width: self.width - 2.0 * by,
            height: self.height - 2.0 * by,
        }
    }
}

pub fn player_rect(player: &Player) -> Rect {
    Rect {
        x: player.x,
        y: player.y,
        width: player.width,
        height: player.height,
    }
}

pub fn obstacle_rect(obstacle: &Obstacle) -> Rect {
    Rect {
        x: obstacle.x,
        y: obstacle.y,
        width: obstacle.width,
        height: obstacle.height,
    }
}

// ── Kinds ────────────────────────────────────────────────────────────────────

pub fn kind_of(kind: &ObstacleKind) -> EntityKind {
    match kind {
        ObstacleKind::Tree { .. } => EntityKind::Tree,
        ObstacleKind::Pothole { .. } => EntityKind::Pothole,
        ObstacleKind::Ufo { .. } => EntityKind::Ufo,
        ObstacleKind::Rock => EntityKind::Rock,
        ObstacleKind::Cloud => EntityKind::Cloud,
        ObstacleKind::Fuel => EntityKind::Fuel,
        ObstacleKind::Turbo => EntityKind::Turbo,
        ObstacleKind::Shield => EntityKind::Shield,
        ObstacleKind::Rocket => EntityKind::Rocket,
    }
}

/// One-shot pickups leave the registry once collected.
pub fn is_pickup(kind: &ObstacleKind) -> bool {
    matches!(
        kind,
        ObstacleKind::Fuel | ObstacleKind::Turbo | ObstacleKind::Shield | ObstacleKind::Rocket
    )
}

// ── Resolution ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug)]
struct Guards {
    shielded: bool,
    flying: bool,
}

impl Guards {
    fn of(statuses: &Statuses) -> Self {
        Self {
            shielded: statuses.shield > 0,
            flying: statuses.rocket > 0,
        }
    }

    /// Which guard, if any, stops a hazard of `kind`.
    fn against(&self, kind: EntityKind, tuning: &Tuning) -> Option<Guard> {
        if self.shielded {
            Some(Guard::Shield)
        } else if self.flying && tuning.flight_immunity && kind != EntityKind::Ufo {
            Some(Guard::Flight)
        } else {
            None
        }
    }
}

fn announce(texts: &mut Vec<FloatingText>, text: &str, x: f32, y: f32) {
    texts.push(FloatingText {
        text: text.to_string(),
        x,
        y,
        dy: -0.5,
        alpha: 1.0,
        decay: 0.01,
    });
}

/// Test the player against every live entity once and apply first-contact
/// effects. Returns the effects applied this call.
///
/// With `snapshot_statuses` off, a status gained from an earlier entity in
/// the pass already protects against later ones in the same frame.
pub fn resolve_collisions(state: &mut GameState) -> Vec<Effect> {
    let tuning = &state.tuning;
    let frame_start = Guards::of(&state.statuses);
    let player_box = player_rect(&state.player).inset(tuning.collision_buffer);
    let mut effects = Vec::new();

    for obstacle in state.obstacles.iter_mut() {
        if obstacle.hit || matches!(obstacle.kind, ObstacleKind::Cloud) {
            continue;
        }
        if !player_box.overlaps(&obstacle_rect(obstacle)) {
            continue;
        }

        let id = obstacle.id;
        let kind = kind_of(&obstacle.kind);
        let (ox, oy) = (obstacle.x, obstacle.y);
        obstacle.hit = true;

        match obstacle.kind {
            ObstacleKind::Tree { .. }
            | ObstacleKind::Pothole { .. }
            | ObstacleKind::Rock
            | ObstacleKind::Ufo { .. } => {
                let guards = if tuning.snapshot_statuses {
                    frame_start
                } else {
                    Guards::of(&state.statuses)
                };
                let guard = guards.against(kind, tuning);

                if let ObstacleKind::Ufo { phase, .. } = &mut obstacle.kind {
                    *phase = match guard {
                        Some(_) => UfoPhase::Spinning { angle: 0.0 },
                        None => UfoPhase::Following {
                            frames_left: UFO_FOLLOW_FRAMES,
                        },
                    };
                }

                match guard {
                    Some(guard) => {
                        if guard == Guard::Shield {
                            let p = &state.player;
                            announce(&mut state.floating_texts, "Shield block!", p.x, p.y);
                        }
                        debug!(id, ?kind, ?guard, "hazard absorbed");
                        effects.push(Effect::Absorbed { id, kind, guard });
                    }
                    None => {
                        let player = &mut state.player;
                        player.health = (player.health - tuning.hit_damage).max(0.0);
                        debug!(id, ?kind, health = player.health, "hazard hit");
                        effects.push(Effect::Damaged {
                            id,
                            kind,
                            amount: tuning.hit_damage,
                        });
                    }
                }
            }
            ObstacleKind::Fuel => {
                let player = &mut state.player;
                let before = player.fuel;
                player.fuel = (player.fuel + tuning.fuel_pickup).min(player.max_fuel);
                let amount = player.fuel - before;
                let text = format!("+{}% Fuel", tuning.fuel_pickup);
                announce(&mut state.floating_texts, &text, ox, oy);
                debug!(id, amount, fuel = player.fuel, "refueled");
                effects.push(Effect::Refueled { id, amount });
            }
            ObstacleKind::Turbo => {
                let restore_speed = match state.statuses.turbo {
                    Some(active) => active.restore_speed,
                    None => state.speed,
                };
                state.statuses.turbo = Some(Turbo {
                    frames_left: tuning.turbo_frames,
                    restore_speed,
                });
                announce(&mut state.floating_texts, "Turbo Activated!", ox, oy);
                debug!(id, restore_speed, "turbo started");
                effects.push(Effect::TurboStarted { id });
            }
            ObstacleKind::Shield => {
                state.statuses.shield = tuning.shield_frames;
                announce(&mut state.floating_texts, "Shield Activated!", ox, oy);
                debug!(id, "shield raised");
                effects.push(Effect::ShieldRaised { id });
            }
            ObstacleKind::Rocket => {
                state.statuses.rocket = tuning.rocket_frames;
                state.player.dy = 0.0;
                state.player.on_ground = false;
                announce(&mut state.floating_texts, "Rocket!", ox, oy);
                debug!(id, "rocket ignited");
                effects.push(Effect::RocketIgnited { id });
            }
            ObstacleKind::Cloud => {}
        }
    }

    state.obstacles.retain(|o| !(o.hit && is_pickup(&o.kind)));
    effects
}
