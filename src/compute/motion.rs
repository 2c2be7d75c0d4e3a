//! Per-frame motion: player vertical physics, world scroll, entity
//! animation and the fade-out of visual feedback.

use std::f32::consts::FRAC_PI_2;

use rand::Rng;

use crate::entities::{
    FloatingText, GameState, Input, Obstacle, ObstacleKind, Particle, Player, UfoPhase,
};

/// Frames a UFO tracks the player after a damaging hit.
pub const UFO_FOLLOW_FRAMES: u32 = 90;

const TREE_FALL_STEP: f32 = 0.1;
const UFO_SPIN_STEP: f32 = 0.35;
const UFO_ESCAPE_SPEED: f32 = 4.0;
const UFO_FOLLOW_SPEED: f32 = 4.0;

// ── Timed visual entities ────────────────────────────────────────────────────

/// Something that drifts and fades until it disappears.
pub trait Fading {
    fn advance(&mut self);
    fn alpha(&self) -> f32;
}

impl Fading for Particle {
    fn advance(&mut self) {
        self.x += self.dx;
        self.y += self.dy;
        self.alpha -= self.decay;
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}

impl Fading for FloatingText {
    fn advance(&mut self) {
        self.y += self.dy;
        self.alpha -= self.decay;
    }

    fn alpha(&self) -> f32 {
        self.alpha
    }
}

/// Advance every item once, then drop the fully faded ones.
pub fn fade_all<T: Fading>(items: &mut Vec<T>) {
    for item in items.iter_mut() {
        item.advance();
    }
    items.retain(|item| item.alpha() > 0.0);
}

pub fn fade_feedback(state: &mut GameState) {
    fade_all(&mut state.particles);
    fade_all(&mut state.floating_texts);
}

/// Ten dust puffs around `(x, y)`.
pub fn spawn_dust(particles: &mut Vec<Particle>, x: f32, y: f32, rng: &mut impl Rng) {
    for _ in 0..10 {
        particles.push(Particle {
            x: x + rng.gen::<f32>() * 30.0 - 15.0,
            y: y + rng.gen::<f32>() * 5.0,
            dx: (rng.gen::<f32>() - 0.5) * 2.0,
            dy: -rng.gen::<f32>() * 1.5,
            radius: 2.0 + rng.gen::<f32>() * 2.0,
            alpha: 1.0,
            decay: 0.02,
        });
    }
}

// ── Player ────────────────────────────────────────────────────────────────────

/// Top edge of the grounded player.
pub fn ground_y(state: &GameState) -> f32 {
    state.viewport.height - state.tuning.ground_offset
}

/// Gravity, jumping and landing; or free vertical flight while the rocket burns.
pub fn step_player(state: &mut GameState, input: &Input, rng: &mut impl Rng) {
    let ground = ground_y(state);
    let tuning = &state.tuning;
    let player = &mut state.player;

    if state.statuses.rocket > 0 {
        player.dy = 0.0;
        if input.up {
            player.y -= tuning.flight_speed;
        }
        if input.down {
            player.y += tuning.flight_speed;
        }
        player.y = player.y.min(ground).max(0.0);
        player.on_ground = player.y >= ground;
        player.holding_jump = false;
        return;
    }

    if input.jump && player.on_ground {
        player.dy = tuning.jump_strength;
        player.on_ground = false;
        player.holding_jump = true;
        player.jump_hold_frames = 0;
    }
    if !input.jump {
        player.holding_jump = false;
    }

    player.dy += tuning.gravity;
    if player.holding_jump && player.jump_hold_frames < tuning.max_jump_hold {
        player.dy += tuning.jump_strength * tuning.jump_hold_boost;
        player.jump_hold_frames += 1;
    }

    let was_airborne = !player.on_ground;
    let previous_y = player.y;
    player.y += player.dy;

    if player.y >= ground {
        if was_airborne && previous_y < ground {
            let (x, y) = (player.x + player.width / 2.0, ground + player.height / 2.0);
            spawn_dust(&mut state.particles, x, y, rng);
        }
        player.y = ground;
        player.dy = 0.0;
        player.on_ground = true;
    } else {
        player.on_ground = false;
    }
}

// ── World ─────────────────────────────────────────────────────────────────────

/// How much of the world scroll an entity follows.
pub fn scroll_multiplier(kind: &ObstacleKind) -> f32 {
    match kind {
        // UFOs fly on their own velocity.
        ObstacleKind::Ufo { .. } => 0.0,
        ObstacleKind::Tree { .. }
        | ObstacleKind::Pothole { .. }
        | ObstacleKind::Rock
        | ObstacleKind::Cloud
        | ObstacleKind::Fuel
        | ObstacleKind::Turbo
        | ObstacleKind::Shield
        | ObstacleKind::Rocket => 1.0,
    }
}

/// Translate the world left by the current speed, animate every entity,
/// then prune what has left the screen.
pub fn scroll_world(state: &mut GameState) {
    let shift = state.speed * state.tuning.scroll_factor;

    state.road_offset -= shift;
    let spacing = state.tuning.road_marking_spacing;
    if state.road_offset <= -spacing {
        state.road_offset %= spacing;
    }

    for obstacle in state.obstacles.iter_mut() {
        obstacle.x -= shift * scroll_multiplier(&obstacle.kind);
        animate(obstacle, &state.player);
    }
    state.obstacles.retain(|o| !is_offscreen(o));
}

/// Type-specific motion that happens on top of the world scroll.
fn animate(obstacle: &mut Obstacle, player: &Player) {
    let hit = obstacle.hit;
    match &mut obstacle.kind {
        ObstacleKind::Tree { fall_angle, .. } => {
            if hit && *fall_angle < FRAC_PI_2 {
                *fall_angle = (*fall_angle + TREE_FALL_STEP).min(FRAC_PI_2);
            }
        }
        ObstacleKind::Ufo { dx, phase } => match phase {
            UfoPhase::Swooping { dy, target_y } => {
                obstacle.x += *dx;
                obstacle.y += *dy;
                if obstacle.y >= *target_y {
                    obstacle.y = *target_y;
                    *phase = UfoPhase::Cruising;
                }
            }
            UfoPhase::Cruising => obstacle.x += *dx,
            UfoPhase::Following { frames_left } => {
                let target_x = player.x + player.width / 2.0 - obstacle.width / 2.0;
                let target_y = player.y - obstacle.height - 10.0;
                obstacle.x += (target_x - obstacle.x).clamp(-UFO_FOLLOW_SPEED, UFO_FOLLOW_SPEED);
                obstacle.y += (target_y - obstacle.y).clamp(-UFO_FOLLOW_SPEED, UFO_FOLLOW_SPEED);
                *frames_left = frames_left.saturating_sub(1);
                if *frames_left == 0 {
                    *phase = UfoPhase::Spinning { angle: 0.0 };
                }
            }
            UfoPhase::Spinning { angle } => {
                *angle += UFO_SPIN_STEP;
                obstacle.y -= UFO_ESCAPE_SPEED;
                obstacle.x += *dx;
            }
        },
        ObstacleKind::Pothole { .. }
        | ObstacleKind::Rock
        | ObstacleKind::Cloud
        | ObstacleKind::Fuel
        | ObstacleKind::Turbo
        | ObstacleKind::Shield
        | ObstacleKind::Rocket => {}
    }
}

fn is_offscreen(obstacle: &Obstacle) -> bool {
    if obstacle.x + obstacle.width < 0.0 {
        return true;
    }
    matches!(
        obstacle.kind,
        ObstacleKind::Ufo {
            phase: UfoPhase::Spinning { .. },
            ..
        }
    ) && obstacle.y + obstacle.height < 0.0
}
