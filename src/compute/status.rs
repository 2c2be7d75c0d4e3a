//! Frame-counted power-ups, difficulty speed-ups and fuel drain.

use tracing::debug;

use crate::entities::GameState;

/// Count every active status down by one frame and settle the world speed.
///
/// Turbo and difficulty speed-ups are exclusive: while turbo runs the speed
/// is pinned to `base_speed * turbo_multiplier`, and on expiry it returns to
/// the speed recorded when turbo began.
pub fn tick_statuses(state: &mut GameState) {
    let tuning = &state.tuning;

    let reached = state.score.max(0.0) as u32 / tuning.speed_milestone;
    let crossed = reached > state.milestones;
    state.milestones = state.milestones.max(reached);

    match state.statuses.turbo.as_mut() {
        Some(turbo) => {
            state.speed = tuning.base_speed * tuning.turbo_multiplier;
            turbo.frames_left = turbo.frames_left.saturating_sub(1);
            if turbo.frames_left == 0 {
                state.speed = turbo.restore_speed;
                state.statuses.turbo = None;
                debug!(speed = state.speed, "turbo expired");
            }
        }
        None => {
            if crossed {
                state.speed += tuning.speed_step;
                debug!(speed = state.speed, milestone = reached, "speed milestone");
            }
        }
    }

    if state.statuses.shield > 0 {
        state.statuses.shield -= 1;
        if state.statuses.shield == 0 {
            debug!("shield expired");
        }
    }

    if state.statuses.rocket > 0 {
        state.statuses.rocket -= 1;
        if state.statuses.rocket == 0 {
            debug!("rocket burnt out");
        }
    }
}

/// Burn fuel on its interval. Returns true once the tank is empty.
pub fn drain_fuel(state: &mut GameState) -> bool {
    let tuning = &state.tuning;
    let player = &mut state.player;
    if state.run_frames % u64::from(tuning.fuel_decay_interval) == 0 {
        player.fuel = (player.fuel - tuning.fuel_decay).max(0.0);
    }
    player.fuel <= 0.0
}
