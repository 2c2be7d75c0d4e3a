//! All game entity types. Pure data, no logic.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::tuning::Tuning;

// ── Geometry ──────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// World size in world units. Positions grow rightward and downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

// ── Modes ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameMode {
    Start,
    Playing,
    Paused,
    Boss,
    Victory,
    GameOver,
}

/// Outcome of one boss-battle frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BossStatus {
    Active,
    Defeated,
    PlayerDefeated,
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// One frame of host input. Movement and jump are held flags; `start`,
/// `pause`, `restart` and `fire` are presses that happened since the last
/// frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Input {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub start: bool,
    pub pause: bool,
    pub restart: bool,
    pub fire: bool,
    /// Aim point in world coordinates.
    pub pointer: Point,
}

// ── Player ────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical velocity, positive = downward.
    pub dy: f32,
    pub on_ground: bool,
    pub health: f32,
    pub max_health: f32,
    pub fuel: f32,
    pub max_fuel: f32,
    /// Jump button still held since take-off.
    pub holding_jump: bool,
    pub jump_hold_frames: u32,
    /// Switched to the boss-battle body.
    pub transformed: bool,
}

/// Turbo keeps the speed it replaced so it can be restored on expiry.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Turbo {
    pub frames_left: u32,
    pub restore_speed: f32,
}

/// Frame-counted power-ups. Zero means inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Statuses {
    pub shield: u32,
    pub turbo: Option<Turbo>,
    pub rocket: u32,
}

// ── World entities ───────────────────────────────────────────────────────────

/// Entity kinds without their per-kind payload. Used by spawn tables and
/// collision reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Tree,
    Pothole,
    Ufo,
    Rock,
    Cloud,
    Fuel,
    Turbo,
    Shield,
    Rocket,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UfoPhase {
    /// Descending to cruise altitude.
    Swooping { dy: f32, target_y: f32 },
    Cruising,
    /// Tracking the player after a damaging hit.
    Following { frames_left: u32 },
    /// Knocked away; leaves through the top of the screen.
    Spinning { angle: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObstacleKind {
    Tree { trunk_ratio: f32, fall_angle: f32 },
    /// Outline points relative to the pothole's top-left corner.
    Pothole { outline: Vec<Point> },
    Ufo { dx: f32, phase: UfoPhase },
    Rock,
    Cloud,
    Fuel,
    Turbo,
    Shield,
    Rocket,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Obstacle {
    pub id: u64,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub kind: ObstacleKind,
    /// Collision effect already applied.
    pub hit: bool,
}

// ── Boss battle ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProjectileOwner {
    Player,
    Boss,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub width: f32,
    pub height: f32,
    pub owner: ProjectileOwner,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Boss {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub health: f32,
    pub max_health: f32,
    pub speed: f32,
    /// 1.0 = moving right, -1.0 = moving left.
    pub direction: f32,
    pub shoot_cooldown: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BossBattle {
    pub boss: Boss,
    pub lasers: Vec<Projectile>,
    pub boss_lasers: Vec<Projectile>,
}

// ── Visual feedback ──────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub dx: f32,
    pub dy: f32,
    pub radius: f32,
    pub alpha: f32,
    pub decay: f32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FloatingText {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub dy: f32,
    pub alpha: f32,
    pub decay: f32,
}

// ── Collision reports ────────────────────────────────────────────────────────

/// What kept a hazard from doing damage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Guard {
    Shield,
    Flight,
}

/// A collision effect applied during the last frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    Damaged { id: u64, kind: EntityKind, amount: f32 },
    Absorbed { id: u64, kind: EntityKind, guard: Guard },
    /// `amount` is the fuel actually gained after clamping.
    Refueled { id: u64, amount: f32 },
    TurboStarted { id: u64 },
    ShieldRaised { id: u64 },
    RocketIgnited { id: u64 },
}

// ── Master game state ─────────────────────────────────────────────────────────

/// The entire simulation context. Cloneable so the pure update function can
/// return a new copy without mutating the original.
#[derive(Clone, Debug)]
pub struct GameState {
    pub viewport: Viewport,
    pub tuning: Arc<Tuning>,
    pub mode: GameMode,
    pub player: Player,
    pub statuses: Statuses,
    /// Current world scroll speed.
    pub speed: f32,
    /// Entity registry: obstacles, pickups and clouds.
    pub obstacles: Vec<Obstacle>,
    pub particles: Vec<Particle>,
    pub floating_texts: Vec<FloatingText>,
    /// Present only while the boss battle runs (and after it, for display).
    pub battle: Option<BossBattle>,
    /// Collision effects applied in the most recent frame.
    pub effects: Vec<Effect>,
    pub score: f32,
    pub high_score: u32,
    /// One countdown per spawn channel.
    pub spawn_timers: Vec<f32>,
    /// Speed milestones already counted this run.
    pub milestones: u32,
    /// Frames simulated in the current run; doubles as the difficulty counter.
    pub run_frames: u64,
    /// Frames since initialization, in every mode.
    pub frame: u64,
    pub road_offset: f32,
    pub next_id: u64,
}
