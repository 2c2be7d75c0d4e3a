//! Rendering layer. All terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! game state. The world is scaled onto the terminal grid; no game logic is
//! performed, this module only translates state into terminal commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use car_runner::compute::final_score;
use car_runner::entities::{
    BossBattle, GameMode, GameState, Obstacle, ObstacleKind, Point, ProjectileOwner, UfoPhase,
    Viewport,
};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_SCORE: Color = Color::Yellow;
const C_HEALTH: Color = Color::Red;
const C_FUEL: Color = Color::Green;
const C_STATUS: Color = Color::Yellow;
const C_ROAD: Color = Color::DarkGrey;
const C_MARKING: Color = Color::White;
const C_PLAYER: Color = Color::Cyan;
const C_PLAYER_SHIELDED: Color = Color::Blue;
const C_TREE: Color = Color::Green;
const C_POTHOLE: Color = Color::DarkYellow;
const C_UFO: Color = Color::Magenta;
const C_ROCK: Color = Color::Grey;
const C_CLOUD: Color = Color::White;
const C_FUEL_CAN: Color = Color::Green;
const C_TURBO: Color = Color::Yellow;
const C_SHIELD: Color = Color::Blue;
const C_ROCKET: Color = Color::Red;
const C_DUST: Color = Color::DarkYellow;
const C_TEXT: Color = Color::White;
const C_BOSS: Color = Color::Red;
const C_LASER_PLAYER: Color = Color::Cyan;
const C_LASER_BOSS: Color = Color::Magenta;
const C_HINT: Color = Color::DarkGrey;

/// Frames per displayed second in status countdowns.
const FRAMES_PER_SECOND: u32 = 60;

// ── Screen mapping ────────────────────────────────────────────────────────────

/// The terminal grid the world is scaled onto. Row 0 holds the HUD and the
/// last row the controls hint; everything between is play area.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Screen {
    pub cols: u16,
    pub rows: u16,
}

impl Screen {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    fn play_cols(&self) -> f32 {
        f32::from(self.cols.max(1))
    }

    fn play_rows(&self) -> f32 {
        f32::from(self.rows.saturating_sub(2).max(1))
    }

    fn last_play_row(&self) -> u16 {
        self.rows.saturating_sub(2).max(1)
    }

    fn col_of(&self, view: Viewport, x: f32) -> i32 {
        (x / view.width * self.play_cols()).floor() as i32
    }

    fn row_of(&self, view: Viewport, y: f32) -> i32 {
        1 + (y / view.height * self.play_rows()).floor() as i32
    }

    /// World point → cell, or `None` outside the play area.
    fn cell(&self, view: Viewport, x: f32, y: f32) -> Option<(u16, u16)> {
        let col = self.col_of(view, x);
        let row = self.row_of(view, y);
        let on_screen = (0..i32::from(self.cols)).contains(&col)
            && (1..=i32::from(self.last_play_row())).contains(&row);
        on_screen.then_some((col as u16, row as u16))
    }

    /// Cell → world point. Used for mouse aim.
    pub fn cell_to_world(&self, view: Viewport, col: u16, row: u16) -> Point {
        Point {
            x: (f32::from(col) + 0.5) / self.play_cols() * view.width,
            y: (f32::from(row.saturating_sub(1)) + 0.5) / self.play_rows() * view.height,
        }
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_hud(out, state, screen)?;

    match &state.battle {
        Some(battle) if matches!(state.mode, GameMode::Boss | GameMode::Victory) => {
            draw_battle(out, state, battle, screen)?;
        }
        _ => {
            draw_road(out, state, screen)?;
            for obstacle in &state.obstacles {
                draw_obstacle(out, state.viewport, obstacle, screen)?;
            }
        }
    }

    draw_particles(out, state, screen)?;
    draw_player(out, state, screen)?;
    draw_floating_texts(out, state, screen)?;
    draw_controls_hint(out, state, screen)?;

    match state.mode {
        GameMode::Start => draw_start(out, state, screen)?,
        GameMode::Paused => draw_overlay(out, screen, &[("PAUSED".to_string(), Color::Yellow)])?,
        GameMode::GameOver => draw_game_over(out, state, screen, false)?,
        GameMode::Victory => draw_game_over(out, state, screen, true)?,
        GameMode::Playing | GameMode::Boss => {}
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, screen.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn bar(value: f32, max: f32, cells: usize) -> String {
    let filled = if max > 0.0 {
        ((value / max).clamp(0.0, 1.0) * cells as f32).round() as usize
    } else {
        0
    };
    format!("[{}{}]", "#".repeat(filled), "-".repeat(cells - filled))
}

fn seconds(frames: u32) -> u32 {
    frames / FRAMES_PER_SECOND + 1
}

fn draw_hud<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    let score = final_score(state);
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    if state.high_score > 0 {
        out.queue(Print(format!("Score:{:>6}  Best:{:>6}  ", score, state.high_score)))?;
    } else {
        out.queue(Print(format!("Score:{:>6}  ", score)))?;
    }

    let p = &state.player;
    out.queue(style::SetForegroundColor(C_HEALTH))?;
    out.queue(Print(format!("HP{} ", bar(p.health, p.max_health, 10))))?;

    if let Some(battle) = &state.battle {
        let boss = &battle.boss;
        out.queue(style::SetForegroundColor(C_BOSS))?;
        out.queue(Print(format!("BOSS{} ", bar(boss.health, boss.max_health, 10))))?;
    } else {
        out.queue(style::SetForegroundColor(C_FUEL))?;
        out.queue(Print(format!("FUEL{} ", bar(p.fuel, p.max_fuel, 10))))?;
    }

    // Active statuses, right-aligned
    let s = &state.statuses;
    let mut tags = Vec::new();
    if let Some(turbo) = s.turbo {
        tags.push(format!("TURBO {}s", seconds(turbo.frames_left)));
    }
    if s.shield > 0 {
        tags.push(format!("SHIELD {}s", seconds(s.shield)));
    }
    if s.rocket > 0 {
        tags.push(format!("ROCKET {}s", seconds(s.rocket)));
    }
    if !tags.is_empty() {
        let right = tags.join(" ");
        let rx = screen.cols.saturating_sub(right.chars().count() as u16 + 1);
        out.queue(cursor::MoveTo(rx, 0))?;
        out.queue(style::SetForegroundColor(C_STATUS))?;
        out.queue(Print(right))?;
    }

    Ok(())
}

// ── World ─────────────────────────────────────────────────────────────────────

/// Fill the cells covered by a world rectangle with `glyph`.
fn fill<W: Write>(
    out: &mut W,
    screen: Screen,
    view: Viewport,
    (x, y, w, h): (f32, f32, f32, f32),
    glyph: char,
    color: Color,
) -> std::io::Result<()> {
    // At least one cell, then clipped to the play area
    let (c0, r0) = (screen.col_of(view, x), screen.row_of(view, y));
    let c1 = screen.col_of(view, x + w).max(c0).min(i32::from(screen.cols) - 1);
    let r1 = screen
        .row_of(view, y + h)
        .max(r0)
        .min(i32::from(screen.last_play_row()));
    let (c0, r0) = (c0.max(0), r0.max(1));
    if c0 > c1 || r0 > r1 {
        return Ok(());
    }

    let line: String = std::iter::repeat(glyph).take((c1 - c0 + 1) as usize).collect();
    out.queue(style::SetForegroundColor(color))?;
    for row in r0..=r1 {
        out.queue(cursor::MoveTo(c0 as u16, row as u16))?;
        out.queue(Print(&line))?;
    }
    Ok(())
}

fn draw_road<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    let view = state.viewport;
    let road_top = view.height - 100.0;
    fill(out, screen, view, (0.0, road_top, view.width, 100.0), '░', C_ROAD)?;

    // Dashed centre markings, shifted by the scroll offset
    let spacing = state.tuning.road_marking_spacing;
    let mid = road_top + 50.0;
    let mut x = state.road_offset;
    while x < view.width {
        fill(out, screen, view, (x, mid, spacing / 2.0, 0.0), '═', C_MARKING)?;
        x += spacing;
    }
    Ok(())
}

fn draw_obstacle<W: Write>(
    out: &mut W,
    view: Viewport,
    o: &Obstacle,
    screen: Screen,
) -> std::io::Result<()> {
    let body = (o.x, o.y, o.width, o.height);
    match &o.kind {
        ObstacleKind::Tree { fall_angle, .. } => {
            if *fall_angle > 0.5 {
                // Fallen over: lies flat along the ground line
                let ground = o.y + o.height;
                fill(out, screen, view, (o.x, ground - 10.0, o.height, 10.0), '=', C_TREE)
            } else {
                fill(out, screen, view, body, '♣', C_TREE)
            }
        }
        ObstacleKind::Pothole { .. } => fill(out, screen, view, body, '▄', C_POTHOLE),
        ObstacleKind::Ufo { phase, .. } => {
            let glyph = match phase {
                UfoPhase::Spinning { .. } => '*',
                _ => '◊',
            };
            fill(out, screen, view, body, glyph, C_UFO)
        }
        ObstacleKind::Rock => fill(out, screen, view, body, '▲', C_ROCK),
        ObstacleKind::Cloud => fill(out, screen, view, body, '~', C_CLOUD),
        ObstacleKind::Fuel => fill(out, screen, view, body, 'F', C_FUEL_CAN),
        ObstacleKind::Turbo => fill(out, screen, view, body, '»', C_TURBO),
        ObstacleKind::Shield => fill(out, screen, view, body, 'Ø', C_SHIELD),
        ObstacleKind::Rocket => fill(out, screen, view, body, '^', C_ROCKET),
    }
}

fn draw_particles<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_DUST))?;
    for p in &state.particles {
        if let Some((col, row)) = screen.cell(state.viewport, p.x, p.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(if p.alpha > 0.5 { "•" } else { "·" }))?;
        }
    }
    Ok(())
}

fn draw_floating_texts<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
) -> std::io::Result<()> {
    out.queue(style::SetForegroundColor(C_TEXT))?;
    for t in &state.floating_texts {
        if let Some((col, row)) = screen.cell(state.viewport, t.x, t.y) {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(Print(&t.text))?;
        }
    }
    Ok(())
}

fn draw_player<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    let p = &state.player;
    let color = if state.statuses.shield > 0 {
        C_PLAYER_SHIELDED
    } else {
        C_PLAYER
    };
    let glyph = if p.transformed { '▒' } else { '█' };
    fill(out, screen, state.viewport, (p.x, p.y, p.width, p.height), glyph, color)?;

    // Exhaust flame under the car while flying
    if state.statuses.rocket > 0 {
        let flame = (p.x, p.y + p.height, p.width / 3.0, 0.0);
        fill(out, screen, state.viewport, flame, '^', C_ROCKET)?;
    }
    Ok(())
}

// ── Boss screen ───────────────────────────────────────────────────────────────

fn draw_battle<W: Write>(
    out: &mut W,
    state: &GameState,
    battle: &BossBattle,
    screen: Screen,
) -> std::io::Result<()> {
    let view = state.viewport;
    let b = &battle.boss;
    fill(out, screen, view, (b.x, b.y, b.width, b.height), '▓', C_BOSS)?;

    for laser in battle.lasers.iter().chain(&battle.boss_lasers) {
        let Some((col, row)) = screen.cell(view, laser.x, laser.y) else {
            continue;
        };
        let (glyph, color) = match laser.owner {
            ProjectileOwner::Player => ("|", C_LASER_PLAYER),
            ProjectileOwner::Boss => ("!", C_LASER_BOSS),
        };
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
) -> std::io::Result<()> {
    let hint = match state.mode {
        GameMode::Boss => "ARROWS/WASD : Move   SPACE/CLICK : Fire   Q : Quit",
        GameMode::Playing if state.statuses.rocket > 0 => {
            "↑ ↓ / W S : Fly   P : Pause   Q : Quit"
        }
        _ => "SPACE/↑ : Jump (hold for height)   P : Pause   Q : Quit",
    };
    out.queue(cursor::MoveTo(1, screen.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_overlay<W: Write>(
    out: &mut W,
    screen: Screen,
    lines: &[(String, Color)],
) -> std::io::Result<()> {
    let cx = screen.cols / 2;
    let start_row = (screen.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }
    Ok(())
}

fn draw_start<W: Write>(out: &mut W, state: &GameState, screen: Screen) -> std::io::Result<()> {
    let mut lines = vec![
        ("╔════════════════════╗".to_string(), Color::Cyan),
        ("║     CAR  RUNNER    ║".to_string(), Color::Cyan),
        ("╚════════════════════╝".to_string(), Color::Cyan),
    ];
    if state.high_score > 0 {
        lines.push((format!("Best Score: {}", state.high_score), Color::Yellow));
    }
    lines.push(("SPACE / ENTER - Start".to_string(), Color::White));
    draw_overlay(out, screen, &lines)
}

fn draw_game_over<W: Write>(
    out: &mut W,
    state: &GameState,
    screen: Screen,
    victory: bool,
) -> std::io::Result<()> {
    let score = final_score(state);
    let new_best = score >= state.high_score && score > 0;

    let (title, color) = if victory {
        ("║      VICTORY!      ║", Color::Green)
    } else {
        ("║    GAME  OVER      ║", Color::Red)
    };
    let best_line = if new_best {
        (format!("★ NEW BEST: {:>6} ★", state.high_score), Color::Yellow)
    } else {
        (format!("Best Score:  {:>6}", state.high_score), Color::DarkGrey)
    };

    let lines = [
        ("╔════════════════════╗".to_string(), color),
        (title.to_string(), color),
        ("╚════════════════════╝".to_string(), color),
        (format!("Final Score: {:>6}", score), Color::Yellow),
        best_line,
        ("R - Play Again  M - Menu  Q - Quit".to_string(), Color::White),
    ];
    draw_overlay(out, screen, &lines)
}
