//! Pure game-logic functions.
//!
//! `update` takes an immutable reference to the current `GameState`, the
//! frame's `Input` and an RNG handle, and returns a brand-new `GameState`.
//! Side effects are limited to the injected RNG, so a seeded RNG replays a
//! run exactly.

pub mod boss;
pub mod clock;
pub mod collision;
pub mod motion;
pub mod spawn;
pub mod status;

pub use clock::FrameClock;

use std::sync::Arc;

use rand::Rng;
use tracing::{info, warn};

use crate::entities::{
    BossStatus, GameMode, GameState, Input, Player, Statuses, Viewport,
};
use crate::tuning::Tuning;

// ── Constructors ─────────────────────────────────────────────────────────────

/// A fresh runner standing on the ground.
pub fn new_player(view: Viewport, tuning: &Tuning) -> Player {
    Player {
        x: tuning.player_x,
        y: view.height - tuning.ground_offset,
        width: tuning.player_width,
        height: tuning.player_height,
        dy: 0.0,
        on_ground: true,
        health: tuning.max_health,
        max_health: tuning.max_health,
        fuel: tuning.max_fuel,
        max_fuel: tuning.max_fuel,
        holding_jump: false,
        jump_hold_frames: 0,
        transformed: false,
    }
}

/// Build the simulation context on the start screen. All per-run state is
/// reset; `high_score` carries over from earlier sessions.
pub fn init_state(
    view: Viewport,
    player: Player,
    tuning: impl Into<Arc<Tuning>>,
    high_score: u32,
) -> GameState {
    let tuning = tuning.into();
    let mut state = GameState {
        viewport: view,
        speed: tuning.base_speed,
        spawn_timers: Vec::new(),
        tuning,
        mode: GameMode::Start,
        player,
        statuses: Statuses::default(),
        obstacles: Vec::new(),
        particles: Vec::new(),
        floating_texts: Vec::new(),
        battle: None,
        effects: Vec::new(),
        score: 0.0,
        high_score,
        milestones: 0,
        run_frames: 0,
        frame: 0,
        road_offset: 0.0,
        next_id: 0,
    };
    reset_timers(&mut state);
    state
}

fn reset_timers(state: &mut GameState) {
    state.spawn_timers = state
        .tuning
        .spawn_channels
        .iter()
        .map(|c| c.initial_delay)
        .collect();
}

/// Start a new run: health, fuel, speed, registry, score and timers all reset.
fn begin_run(state: &mut GameState) {
    state.player = new_player(state.viewport, &state.tuning);
    state.statuses = Statuses::default();
    state.speed = state.tuning.base_speed;
    state.obstacles.clear();
    state.particles.clear();
    state.floating_texts.clear();
    state.battle = None;
    state.effects.clear();
    state.score = 0.0;
    state.milestones = 0;
    state.run_frames = 0;
    state.road_offset = 0.0;
    reset_timers(state);
    state.mode = GameMode::Playing;
    info!(high_score = state.high_score, "run started");
}

/// Whole-point score shown to the player and persisted as a high score.
pub fn final_score(state: &GameState) -> u32 {
    state.score.max(0.0) as u32
}

fn end_run(state: &mut GameState, mode: GameMode, cause: &'static str) {
    state.mode = mode;
    let score = final_score(state);
    if score > state.high_score {
        state.high_score = score;
    }
    info!(?mode, score, cause, "run ended");
}

fn enter_boss(state: &mut GameState) {
    let battle = boss::init_boss_battle(state.viewport, &mut state.player, &state.tuning.boss);
    state.battle = Some(battle);
    state.obstacles.clear();
    state.statuses = Statuses::default();
    state.mode = GameMode::Boss;
    info!(score = final_score(state), "boss battle started");
}

// ── Per-frame update ─────────────────────────────────────────────────────────

/// Advance the simulation by one frame.
pub fn update(state: &GameState, input: &Input, rng: &mut impl Rng) -> GameState {
    let mut next = state.clone();
    next.frame += 1;
    next.effects.clear();

    match state.mode {
        GameMode::Start => {
            if input.start {
                begin_run(&mut next);
            }
        }
        GameMode::Playing => {
            if input.pause {
                next.mode = GameMode::Paused;
                info!("paused");
            } else {
                step_playing(&mut next, input, rng);
            }
        }
        GameMode::Paused => {
            if input.pause {
                next.mode = GameMode::Playing;
                info!("resumed");
            }
        }
        GameMode::Boss => step_boss(&mut next, input),
        GameMode::GameOver | GameMode::Victory => {
            if input.restart {
                begin_run(&mut next);
            }
        }
    }

    next
}

/// Run `frames` consecutive frames with the same held input. Presses are
/// delivered to the first frame only.
pub fn run_frames(state: &GameState, input: &Input, frames: u32, rng: &mut impl Rng) -> GameState {
    let held = Input {
        start: false,
        pause: false,
        restart: false,
        fire: false,
        ..*input
    };
    let mut current = state.clone();
    for i in 0..frames {
        let frame_input = if i == 0 { input } else { &held };
        current = update(&current, frame_input, rng);
    }
    current
}

/// Physics, spawning, collisions, statuses, then the mode checks.
fn step_playing(state: &mut GameState, input: &Input, rng: &mut impl Rng) {
    let tuning = Arc::clone(&state.tuning);
    state.run_frames += 1;

    motion::step_player(state, input, rng);
    motion::scroll_world(state);
    motion::fade_feedback(state);
    spawn::spawn_step(state, rng);

    state.effects = collision::resolve_collisions(state);
    if state.player.health <= 0.0 {
        end_run(state, GameMode::GameOver, "health depleted");
        return;
    }

    state.score += tuning.score_per_frame;
    status::tick_statuses(state);

    if status::drain_fuel(state) {
        end_run(state, GameMode::GameOver, "out of fuel");
        return;
    }

    if let Some(threshold) = tuning.boss_score {
        if state.score >= threshold as f32 {
            enter_boss(state);
        }
    }
}

fn step_boss(state: &mut GameState, input: &Input) {
    let tuning = Arc::clone(&state.tuning);
    motion::fade_feedback(state);

    let Some(battle) = state.battle.as_mut() else {
        warn!("boss mode without a battle; ending run");
        end_run(state, GameMode::GameOver, "missing boss");
        return;
    };

    if input.fire {
        boss::fire_laser(battle, &state.player, input.pointer, &tuning.boss);
    }

    let status = boss::update_boss(battle, &mut state.player, input, state.viewport, &tuning.boss);
    match status {
        BossStatus::Active => {}
        BossStatus::Defeated => end_run(state, GameMode::Victory, "boss defeated"),
        BossStatus::PlayerDefeated => end_run(state, GameMode::GameOver, "defeated by boss"),
    }
}
