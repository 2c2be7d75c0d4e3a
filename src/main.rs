mod display;

use std::collections::HashMap;
use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{mpsc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    style::{self, Color, Print},
    terminal,
    ExecutableCommand, QueueableCommand,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use car_runner::compute::{self, final_score, init_state, new_player, FrameClock};
use car_runner::config::{Config, Variant};
use car_runner::entities::{GameMode, GameState, Input, Point};
use car_runner::high_score::HighScoreStore;

use display::Screen;

#[derive(Parser, Debug)]
#[command(name = "car_runner", about = "Side-scrolling car runner for the terminal")]
struct Args {
    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// classic, rally or boss_run.
    #[arg(long)]
    variant: Option<Variant>,

    /// Seed the RNG for a reproducible run.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation frame length in milliseconds.
    #[arg(long)]
    frame_ms: Option<u64>,
}

// ── Simultaneous-input constants ──────────────────────────────────────────────

/// A key is considered "held" if its last press/repeat event arrived within
/// this window. Covers terminals that don't emit key-release events: the OS
/// key-repeat rate is ≥ 15 Hz, so the window is refreshed before expiry.
const HOLD_WINDOW: Duration = Duration::from_millis(150);

fn is_held(key_seen: &HashMap<KeyCode, Instant>, key: &KeyCode, now: Instant) -> bool {
    key_seen
        .get(key)
        .map(|&last| now.saturating_duration_since(last) <= HOLD_WINDOW)
        .unwrap_or(false)
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Log to a file: stdout is the game screen.
fn init_tracing(log_file: &Path) -> Result<()> {
    let file = File::create(log_file)
        .with_context(|| format!("creating log file {}", log_file.display()))?;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();

    std::panic::set_hook(Box::new(|info| {
        let _ = terminal::disable_raw_mode();
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
    Ok(())
}

// ── Menu ──────────────────────────────────────────────────────────────────────

enum MenuResult {
    Start(Variant),
    Quit,
}

fn show_menu<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    high_score: u32,
    preselected: Variant,
) -> std::io::Result<MenuResult> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    let (width, height) = terminal::size()?;
    let cx = width / 2;
    let cy = height / 2;

    let title = "»  CAR  RUNNER  «";
    out.queue(cursor::MoveTo(
        cx.saturating_sub(title.chars().count() as u16 / 2),
        cy.saturating_sub(6),
    ))?;
    out.queue(style::SetForegroundColor(Color::Cyan))?;
    out.queue(Print(title))?;

    if high_score > 0 {
        let hs_str = format!("Best Score: {}", high_score);
        out.queue(cursor::MoveTo(
            cx.saturating_sub(hs_str.chars().count() as u16 / 2),
            cy.saturating_sub(5),
        ))?;
        out.queue(style::SetForegroundColor(Color::Yellow))?;
        out.queue(Print(&hs_str))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy.saturating_sub(3)))?;
    out.queue(style::SetForegroundColor(Color::White))?;
    out.queue(Print("Select a road:"))?;

    let options: [(&str, Variant, Color, &str); 3] = [
        ("1", Variant::Classic, Color::Green,  "Trees, potholes, hold to jump higher"),
        ("2", Variant::Rally,   Color::Yellow, "Rocks and UFOs, pickups on their own lane"),
        ("3", Variant::BossRun, Color::Red,    "Rocket flight, then face the boss at 500"),
    ];

    for (i, (key, variant, color, desc)) in options.iter().enumerate() {
        let row = cy.saturating_sub(1) + i as u16;
        let marker = if *variant == preselected { ">" } else { " " };
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!("{marker}[{key}] ")))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(format!("{:<9}", variant.name())))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(format!(" {desc}")))?;
    }

    let pickups: &[(&str, Color, &str)] = &[
        ("F", Color::Green,  " Fuel   +25% fuel"),
        ("»", Color::Yellow, " Turbo  double speed"),
        ("Ø", Color::Blue,   " Shield blocks hazards"),
        ("^", Color::Red,    " Rocket fly over hazards"),
    ];
    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 3))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("Pickups:"))?;
    for (i, (sym, color, desc)) in pickups.iter().enumerate() {
        let row = cy + 4 + i as u16;
        out.queue(cursor::MoveTo(cx.saturating_sub(12), row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(sym))?;
        out.queue(style::SetForegroundColor(Color::DarkGrey))?;
        out.queue(Print(*desc))?;
    }

    out.queue(cursor::MoveTo(cx.saturating_sub(12), cy + 9))?;
    out.queue(style::SetForegroundColor(Color::DarkGrey))?;
    out.queue(Print("1-3 : Choose   ENTER : Marked road   Q : Quit"))?;

    out.queue(style::ResetColor)?;
    out.flush()?;

    // Block until the user makes a choice
    loop {
        let Ok(event) = rx.recv() else {
            return Ok(MenuResult::Quit);
        };
        if let Event::Key(KeyEvent {
            code,
            kind: KeyEventKind::Press,
            ..
        }) = event
        {
            match code {
                KeyCode::Char('1') => return Ok(MenuResult::Start(Variant::Classic)),
                KeyCode::Char('2') => return Ok(MenuResult::Start(Variant::Rally)),
                KeyCode::Char('3') => return Ok(MenuResult::Start(Variant::BossRun)),
                KeyCode::Enter => return Ok(MenuResult::Start(preselected)),
                KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                    return Ok(MenuResult::Quit);
                }
                _ => {}
            }
        }
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

enum Exit {
    Quit,
    Menu,
}

/// Input model: a `key_seen` map records when each key last produced a
/// press/repeat event. Every loop pass the fresh keys become the held flags
/// of `Input`, so Space and the arrows can be held together. Presses also
/// set the edge flags, which are kept until at least one frame consumes them.
///
/// The simulation advances in fixed frames from `FrameClock`, independent of
/// how long rendering takes.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut GameState,
    rx: &mpsc::Receiver<Event>,
    clock: &mut FrameClock,
    rng: &mut StdRng,
    store: &HighScoreStore,
) -> std::io::Result<Exit> {
    let (cols, rows) = terminal::size()?;
    let mut screen = Screen::new(cols, rows);
    let frame = Duration::from_millis(clock.frame_ms());

    let mut key_seen: HashMap<KeyCode, Instant> = HashMap::new();
    let mut edges = Input::default();
    let mut pointer = Point {
        x: state.viewport.width / 2.0,
        y: 0.0,
    };
    let mut last_tick = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match ev {
                Event::Key(KeyEvent {
                    code,
                    kind,
                    modifiers,
                    ..
                }) => match kind {
                    KeyEventKind::Press => {
                        key_seen.insert(code, frame_start);
                        match code {
                            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                                return Ok(Exit::Quit);
                            }
                            KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                                return Ok(Exit::Quit);
                            }
                            KeyCode::Char('m') | KeyCode::Char('M')
                                if !matches!(state.mode, GameMode::Playing | GameMode::Boss) =>
                            {
                                return Ok(Exit::Menu);
                            }
                            KeyCode::Char(' ') => {
                                edges.start = true;
                                edges.fire = true;
                            }
                            KeyCode::Enter => edges.start = true,
                            KeyCode::Char('p') | KeyCode::Char('P') => edges.pause = true,
                            KeyCode::Char('r') | KeyCode::Char('R') => edges.restart = true,
                            _ => {}
                        }
                    }
                    KeyEventKind::Repeat => {
                        key_seen.insert(code, frame_start);
                    }
                    KeyEventKind::Release => {
                        key_seen.remove(&code);
                    }
                },
                Event::Mouse(MouseEvent {
                    kind, column, row, ..
                }) => {
                    pointer = screen.cell_to_world(state.viewport, column, row);
                    if let MouseEventKind::Down(_) = kind {
                        edges.fire = true;
                    }
                }
                Event::Resize(c, r) => screen = Screen::new(c, r),
                _ => {}
            }
        }

        let held = |keys: &[KeyCode]| keys.iter().any(|k| is_held(&key_seen, k, frame_start));
        let input = Input {
            up: held(&[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')]),
            down: held(&[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')]),
            left: held(&[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')]),
            right: held(&[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')]),
            jump: held(&[KeyCode::Char(' '), KeyCode::Up]),
            pointer,
            ..edges
        };

        let now = Instant::now();
        let elapsed = now.duration_since(last_tick).as_millis() as u64;
        last_tick = now;

        let frames = clock.advance(elapsed);
        if frames > 0 {
            let before = state.mode;
            *state = compute::run_frames(state, &input, frames, rng);
            edges = Input::default();

            let ended = matches!(state.mode, GameMode::GameOver | GameMode::Victory);
            if ended && state.mode != before {
                if let Err(e) = store.record(final_score(state)) {
                    warn!(error = %e, "could not save high score");
                }
            }
        }

        display::render(out, state, screen)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame {
            thread::sleep(frame - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    // Load .env locally; safe to ignore when not present.
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref()).context("loading configuration")?;
    if let Some(variant) = args.variant {
        config.variant = variant;
    }
    if let Some(ms) = args.frame_ms {
        config.frame_ms = ms.max(1);
    }
    config.resolve_tuning().context("checking tuning")?;

    init_tracing(&config.log_file)?;
    info!(variant = %config.variant, frame_ms = config.frame_ms, seed = ?args.seed, "starting");

    let store = match &config.high_score_file {
        Some(path) => HighScoreStore::at(path),
        None => HighScoreStore::default_location()?,
    };
    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events from the terminal.
    // Kitty-protocol terminals support this; others fall back gracefully.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    // Dedicate a thread exclusively to blocking event reads, sending them
    // through a channel so the game loop never has to block on I/O.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = run(&mut out, &rx, &mut config, &store, &mut rng);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    info!("exiting");
    result
}

fn run<W: Write>(
    out: &mut W,
    rx: &mpsc::Receiver<Event>,
    config: &mut Config,
    store: &HighScoreStore,
    rng: &mut StdRng,
) -> Result<()> {
    let mut high_score = store.load().unwrap_or_else(|e| {
        warn!(error = %e, "could not read high score");
        0
    });
    let mut clock = FrameClock::new(config.frame_ms);

    loop {
        match show_menu(out, rx, high_score, config.variant)? {
            MenuResult::Quit => break,
            MenuResult::Start(variant) => {
                config.variant = variant;
                let tuning = config.resolve_tuning()?;
                let view = config.viewport();
                let player = new_player(view, &tuning);
                let mut state = init_state(view, player, tuning, high_score);
                info!(%variant, "road selected");

                let exit = game_loop(out, &mut state, rx, &mut clock, rng, store)?;
                high_score = high_score.max(state.high_score);

                if let Exit::Quit = exit {
                    break;
                }
                // Otherwise loop back to the menu
            }
        }
    }
    Ok(())
}
