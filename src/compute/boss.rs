//! Boss battle: free-moving transformed player, aimed lasers, and a boss
//! that sweeps side to side firing straight down.

use tracing::debug;

use crate::entities::{
    Boss, BossBattle, BossStatus, Input, Player, Point, Projectile, ProjectileOwner, Viewport,
};
use crate::tuning::BossTuning;

use super::collision::{player_rect, Rect};

/// Create the boss at full health and switch the player to the battle body.
pub fn init_boss_battle(view: Viewport, player: &mut Player, tuning: &BossTuning) -> BossBattle {
    player.transformed = true;
    player.health = player.max_health;
    player.width = tuning.player_width;
    player.height = tuning.player_height;
    player.x = view.width / 2.0;
    player.y = view.height - 200.0;
    player.dy = 0.0;
    player.on_ground = false;
    player.holding_jump = false;

    BossBattle {
        boss: Boss {
            x: view.width / 2.0,
            y: tuning.top,
            width: tuning.width,
            height: tuning.height,
            health: tuning.max_health,
            max_health: tuning.max_health,
            speed: tuning.speed,
            direction: 1.0,
            shoot_cooldown: 0,
        },
        lasers: Vec::new(),
        boss_lasers: Vec::new(),
    }
}

/// Fire a laser from the player's nose toward `target`, unless the cap of
/// live player lasers is reached. Returns whether a laser was fired.
pub fn fire_laser(
    battle: &mut BossBattle,
    player: &Player,
    target: Point,
    tuning: &BossTuning,
) -> bool {
    if battle.lasers.len() >= tuning.max_player_lasers {
        return false;
    }

    let x = player.x + player.width / 2.0;
    let y = player.y;
    let angle = (target.y - y).atan2(target.x - x);
    battle.lasers.push(Projectile {
        x,
        y,
        vx: angle.cos() * tuning.player_laser_speed,
        vy: angle.sin() * tuning.player_laser_speed,
        width: 4.0,
        height: 20.0,
        owner: ProjectileOwner::Player,
    });
    true
}

fn projectile_rect(p: &Projectile) -> Rect {
    Rect {
        x: p.x,
        y: p.y,
        width: p.width,
        height: p.height,
    }
}

fn boss_rect(boss: &Boss) -> Rect {
    Rect {
        x: boss.x,
        y: boss.y,
        width: boss.width,
        height: boss.height,
    }
}

fn on_screen(p: &Projectile, view: Viewport) -> bool {
    p.x > 0.0 && p.x < view.width && p.y > 0.0 && p.y < view.height
}

/// Advance the battle by one frame.
pub fn update_boss(
    battle: &mut BossBattle,
    player: &mut Player,
    input: &Input,
    view: Viewport,
    tuning: &BossTuning,
) -> BossStatus {
    // 1. Player moves freely, clamped to the screen.
    if input.up {
        player.y -= tuning.player_speed;
    }
    if input.down {
        player.y += tuning.player_speed;
    }
    if input.left {
        player.x -= tuning.player_speed;
    }
    if input.right {
        player.x += tuning.player_speed;
    }
    player.x = player.x.clamp(0.0, (view.width - player.width).max(0.0));
    player.y = player.y.clamp(0.0, (view.height - player.height).max(0.0));

    // 2. Boss sweeps, turning around at the edges.
    let boss = &mut battle.boss;
    boss.x += boss.speed * boss.direction;
    let right_edge = (view.width - boss.width).max(0.0);
    if boss.x >= right_edge {
        boss.x = right_edge;
        boss.direction = -1.0;
    } else if boss.x <= 0.0 {
        boss.x = 0.0;
        boss.direction = 1.0;
    }

    // 3. Player lasers fly; off-screen ones go.
    for laser in battle.lasers.iter_mut() {
        laser.x += laser.vx;
        laser.y += laser.vy;
    }
    battle.lasers.retain(|l| on_screen(l, view));

    // 4. Boss lasers fall and may hit the player.
    let player_box = player_rect(player);
    let mut status = BossStatus::Active;
    let mut player_hits = 0u32;
    for laser in battle.boss_lasers.iter_mut() {
        laser.x += laser.vx;
        laser.y += laser.vy;
    }
    battle.boss_lasers.retain(|laser| {
        if player_box.overlaps(&projectile_rect(laser)) {
            player_hits += 1;
            return false;
        }
        laser.y <= view.height
    });
    if player_hits > 0 {
        let damage = tuning.laser_damage * player_hits as f32;
        player.health = (player.health - damage).max(0.0);
        debug!(damage, health = player.health, "player hit by boss laser");
        if player.health <= 0.0 {
            status = BossStatus::PlayerDefeated;
        }
    }

    // 5. Boss fires on its cooldown.
    let boss = &mut battle.boss;
    if boss.shoot_cooldown == 0 {
        battle.boss_lasers.push(Projectile {
            x: boss.x + boss.width / 2.0,
            y: boss.y + boss.height,
            vx: 0.0,
            vy: tuning.laser_speed,
            width: 5.0,
            height: 15.0,
            owner: ProjectileOwner::Boss,
        });
        boss.shoot_cooldown = tuning.shoot_cooldown;
    }
    boss.shoot_cooldown = boss.shoot_cooldown.saturating_sub(1);

    // 6. Player lasers that reach the boss hurt it.
    let target = boss_rect(boss);
    let mut boss_hits = 0u32;
    battle.lasers.retain(|laser| {
        if target.overlaps(&projectile_rect(laser)) {
            boss_hits += 1;
            return false;
        }
        true
    });
    if boss_hits > 0 {
        let boss = &mut battle.boss;
        boss.health = (boss.health - tuning.player_laser_damage * boss_hits as f32).max(0.0);
        debug!(health = boss.health, hits = boss_hits, "boss hit");
        if boss.health <= 0.0 {
            status = BossStatus::Defeated;
        }
    }

    status
}
