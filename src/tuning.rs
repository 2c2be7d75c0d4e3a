//! Gameplay tuning for the runner and the boss battle.
//!
//! Keep this separate from runtime configuration (frame length, file
//! locations, logging). Every constant the simulation reads lives here so
//! the three runner variants are presets of one record rather than forks
//! of the update code.

use serde::{Deserialize, Serialize};

use crate::entities::{EntityKind, Viewport};
use crate::error::{Error, Result};

// ── Spawning ─────────────────────────────────────────────────────────────────

/// One slice of a spawn channel's cumulative-probability table.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnBand {
    pub kind: EntityKind,
    /// Probability mass of this band; the unclaimed remainder spawns nothing.
    pub weight: f32,
}

/// How long a spawn channel waits before its next roll.
///
/// `max(min, base - difficulty * narrowing) + rand * jitter`, in frames.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct IntervalRule {
    pub base: f32,
    pub jitter: f32,
    pub narrowing: f32,
    pub min: f32,
}

impl IntervalRule {
    /// Deterministic part of the interval for a given difficulty counter.
    pub fn floor_for(&self, difficulty: u64) -> f32 {
        (self.base - difficulty as f32 * self.narrowing).max(self.min)
    }
}

/// An independent timer-driven entity stream.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnChannel {
    pub bands: Vec<SpawnBand>,
    pub interval: IntervalRule,
    /// Frames before the first roll of a run.
    #[serde(default)]
    pub initial_delay: f32,
    /// Independent decorative cloud roll made whenever the channel fires.
    #[serde(default)]
    pub cloud_chance: f32,
}

// ── Boss battle ──────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BossTuning {
    pub width: f32,
    pub height: f32,
    pub top: f32,
    pub max_health: f32,
    pub speed: f32,
    pub shoot_cooldown: u32,
    pub laser_speed: f32,
    pub laser_damage: f32,
    /// Transformed player sprite size during the battle.
    pub player_width: f32,
    pub player_height: f32,
    pub player_speed: f32,
    pub player_laser_speed: f32,
    pub player_laser_damage: f32,
    pub max_player_lasers: usize,
}

impl Default for BossTuning {
    fn default() -> Self {
        Self {
            width: 200.0,
            height: 100.0,
            top: 150.0,
            max_health: 100.0,
            speed: 3.0,
            shoot_cooldown: 60,
            laser_speed: 8.0,
            laser_damage: 10.0,
            player_width: 120.0,
            player_height: 150.0,
            player_speed: 7.0,
            player_laser_speed: 15.0,
            player_laser_damage: 5.0,
            max_player_lasers: 10,
        }
    }
}

// ── Runner ───────────────────────────────────────────────────────────────────

/// Every gameplay constant of a run. `Default` is the boss-run preset.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // Player body
    pub player_x: f32,
    pub player_width: f32,
    pub player_height: f32,
    pub max_health: f32,
    pub max_fuel: f32,

    // Motion
    pub gravity: f32,
    pub jump_strength: f32,
    /// Fraction of `jump_strength` added on each frame the jump is held.
    pub jump_hold_boost: f32,
    pub max_jump_hold: u32,
    /// Distance from the bottom of the viewport to the grounded player's top edge.
    pub ground_offset: f32,
    pub flight_speed: f32,
    pub base_speed: f32,
    /// World entities move `speed * scroll_factor` per frame.
    pub scroll_factor: f32,
    pub road_marking_spacing: f32,

    // Progression
    pub score_per_frame: f32,
    pub speed_milestone: u32,
    pub speed_step: f32,
    pub fuel_decay: f32,
    pub fuel_decay_interval: u32,

    // Collisions
    pub collision_buffer: f32,
    pub hit_damage: f32,
    pub fuel_pickup: f32,
    pub shield_frames: u32,
    pub turbo_frames: u32,
    pub turbo_multiplier: f32,
    pub rocket_frames: u32,
    /// Flight ignores ground hazards (UFOs still hurt).
    pub flight_immunity: bool,
    /// Resolve every collision in a frame against the statuses held at frame start.
    pub snapshot_statuses: bool,

    // Spawning
    pub spawn_channels: Vec<SpawnChannel>,

    // Boss
    /// Score that starts the boss battle; `None` disables it.
    pub boss_score: Option<u32>,
    pub boss: BossTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self::boss_run()
    }
}

fn band(kind: EntityKind, weight: f32) -> SpawnBand {
    SpawnBand { kind, weight }
}

impl Tuning {
    /// Single-stream runner with variable-height jumps and no boss.
    pub fn classic() -> Self {
        let power_up = 0.25 / 3.0;
        Self {
            player_x: 100.0,
            player_width: 180.0,
            player_height: 100.0,
            max_health: 100.0,
            max_fuel: 100.0,

            gravity: 0.5,
            jump_strength: -12.0,
            jump_hold_boost: 0.05,
            max_jump_hold: 15,
            ground_offset: 150.0,
            flight_speed: 6.0,
            base_speed: 3.0,
            scroll_factor: 1.5,
            road_marking_spacing: 60.0,

            score_per_frame: 0.1,
            speed_milestone: 100,
            speed_step: 0.1,
            fuel_decay: 0.1,
            fuel_decay_interval: 5,

            collision_buffer: 20.0,
            hit_damage: 25.0,
            fuel_pickup: 25.0,
            shield_frames: 300,
            turbo_frames: 300,
            turbo_multiplier: 2.0,
            rocket_frames: 300,
            flight_immunity: true,
            snapshot_statuses: false,

            spawn_channels: vec![SpawnChannel {
                bands: vec![
                    band(EntityKind::Tree, 0.25),
                    band(EntityKind::Pothole, 0.25),
                    band(EntityKind::Fuel, power_up),
                    band(EntityKind::Turbo, power_up),
                    band(EntityKind::Shield, power_up),
                ],
                interval: IntervalRule {
                    base: 60.0,
                    jitter: 80.0,
                    narrowing: 0.0,
                    min: 60.0,
                },
                initial_delay: 0.0,
                cloud_chance: 0.3,
            }],

            boss_score: None,
            boss: BossTuning::default(),
        }
    }

    /// Separate hazard and pickup streams, heavier gravity, no boss.
    pub fn rally() -> Self {
        Self {
            gravity: 0.6,
            jump_strength: -15.0,
            jump_hold_boost: 0.0,
            max_jump_hold: 0,
            base_speed: 5.0,
            scroll_factor: 1.0,
            fuel_decay: 0.05,
            fuel_decay_interval: 1,
            collision_buffer: 0.0,
            turbo_multiplier: 1.6,
            spawn_channels: vec![
                SpawnChannel {
                    bands: vec![
                        band(EntityKind::Tree, 0.5),
                        band(EntityKind::Ufo, 0.2),
                        band(EntityKind::Rock, 0.3),
                    ],
                    interval: IntervalRule {
                        base: 90.0,
                        jitter: 0.0,
                        narrowing: 1.0,
                        min: 30.0,
                    },
                    initial_delay: 60.0,
                    cloud_chance: 0.0,
                },
                SpawnChannel {
                    bands: vec![
                        band(EntityKind::Fuel, 0.5),
                        band(EntityKind::Turbo, 0.3),
                        band(EntityKind::Shield, 0.2),
                    ],
                    interval: IntervalRule {
                        base: 200.0,
                        jitter: 0.0,
                        narrowing: 2.0,
                        min: 50.0,
                    },
                    initial_delay: 150.0,
                    cloud_chance: 0.0,
                },
            ],
            ..Self::classic()
        }
    }

    /// Rocket flight, UFOs and a boss battle once the score gets high enough.
    pub fn boss_run() -> Self {
        Self {
            spawn_channels: vec![SpawnChannel {
                bands: vec![
                    band(EntityKind::Tree, 0.20),
                    band(EntityKind::Pothole, 0.20),
                    band(EntityKind::Ufo, 0.10),
                    band(EntityKind::Fuel, 0.10),
                    band(EntityKind::Turbo, 0.10),
                    band(EntityKind::Shield, 0.10),
                    band(EntityKind::Rocket, 0.05),
                ],
                interval: IntervalRule {
                    base: 70.0,
                    jitter: 60.0,
                    narrowing: 0.01,
                    min: 40.0,
                },
                initial_delay: 30.0,
                cloud_chance: 0.3,
            }],
            boss_score: Some(500),
            ..Self::classic()
        }
    }

    /// Reject tunings the simulation cannot honour.
    pub fn validate(&self) -> Result<()> {
        let positive = [
            ("player_width", self.player_width),
            ("player_height", self.player_height),
            ("max_health", self.max_health),
            ("max_fuel", self.max_fuel),
            ("boss.width", self.boss.width),
            ("boss.height", self.boss.height),
            ("boss.max_health", self.boss.max_health),
            ("road_marking_spacing", self.road_marking_spacing),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(Error::InvalidTuning(format!("{name} must be positive, got {value}")));
            }
        }

        let durations = [
            ("shield_frames", self.shield_frames),
            ("turbo_frames", self.turbo_frames),
            ("rocket_frames", self.rocket_frames),
            ("fuel_decay_interval", self.fuel_decay_interval),
            ("speed_milestone", self.speed_milestone),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(Error::InvalidTuning(format!("{name} must be at least 1")));
            }
        }

        for (i, channel) in self.spawn_channels.iter().enumerate() {
            if channel.bands.iter().any(|b| b.weight < 0.0) {
                return Err(Error::InvalidTuning(format!(
                    "spawn channel {i} has a negative band weight"
                )));
            }
            let total: f32 = channel.bands.iter().map(|b| b.weight).sum();
            if total > 1.0 + 1e-4 {
                return Err(Error::InvalidTuning(format!(
                    "spawn channel {i} band weights sum to {total}, above 1"
                )));
            }
            if channel.interval.min < 1.0 {
                return Err(Error::InvalidTuning(format!(
                    "spawn channel {i} minimum interval must be at least one frame"
                )));
            }
        }

        Ok(())
    }

    /// Checks that the world is large enough to hold the road and the player.
    pub fn validate_viewport(&self, view: Viewport) -> Result<()> {
        if !(view.width > 0.0) || !(view.height > 0.0) {
            return Err(Error::InvalidTuning(format!(
                "world must have a positive size, got {}x{}",
                view.width, view.height
            )));
        }
        if !(view.height > self.ground_offset) {
            return Err(Error::InvalidTuning(format!(
                "world height {} must exceed ground_offset {}",
                view.height, self.ground_offset
            )));
        }
        Ok(())
    }
}
