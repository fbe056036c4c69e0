mod display;

use std::fs::File;
use std::io::{stdout, BufWriter, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, KeyboardEnhancementFlags, MouseButton, MouseEvent, MouseEventKind,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};
use rand::thread_rng;

use display::TerminalCanvas;
use tower_defence::compute::{handle_input, init_state, tick};
use tower_defence::config::GameConfig;
use tower_defence::entities::{GameStatus, InputEvent, Key, MatchState};
use tower_defence::highscore::HighScoreStore;
use tower_defence::render;
use tower_defence::upgrade::card_at;

const FRAME: Duration = Duration::from_millis(33); // ≈30 FPS

/// Longest simulated step; a stalled frame must not teleport anything.
const MAX_DT: f32 = 0.1;

/// Second press on the same card within this window confirms it.
const DOUBLE_CLICK: Duration = Duration::from_millis(400);

const CONFIG_ENV: &str = "TOWER_DEFENCE_CONFIG";
const CONFIG_FILE: &str = "tower_defence.toml";

// ── Logging ───────────────────────────────────────────────────────────────────

/// The terminal is ours while the game runs, so logs go to a file.
fn init_logging() {
    let path = std::env::temp_dir().join("tower_defence.log");
    let Ok(file) = File::create(&path) else {
        return;
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    log::info!("logging to {}", path.display());
}

fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE))
}

// ── Input translation ─────────────────────────────────────────────────────────

enum Control {
    Quit,
    Resize(u16, u16),
    Input(InputEvent),
    Ignore,
}

/// Remembers the last left press so a second one on the same card can be
/// reported as a double click.
#[derive(Default)]
struct ClickTracker {
    last: Option<(Instant, usize)>,
}

impl ClickTracker {
    fn press(&mut self, now: Instant, card: Option<usize>) -> u8 {
        let Some(card) = card else {
            self.last = None;
            return 1;
        };
        match self.last {
            Some((at, prev)) if prev == card && now.duration_since(at) <= DOUBLE_CLICK => {
                self.last = None;
                2
            }
            _ => {
                self.last = Some((now, card));
                1
            }
        }
    }
}

fn translate_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::Up => Some(Key::Up),
        KeyCode::Down => Some(Key::Down),
        KeyCode::Left => Some(Key::Left),
        KeyCode::Right => Some(Key::Right),
        KeyCode::Enter => Some(Key::Enter),
        KeyCode::Esc => Some(Key::Escape),
        KeyCode::Char(' ') => Some(Key::Space),
        KeyCode::Char(c) => Some(Key::Char(c)),
        _ => None,
    }
}

fn translate(
    ev: Event,
    canvas: &TerminalCanvas,
    state: &MatchState,
    clicks: &mut ClickTracker,
    now: Instant,
) -> Control {
    match ev {
        Event::Key(KeyEvent { code, kind, modifiers, .. }) => {
            let quit = matches!(code, KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc)
                || (code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL));
            if quit && kind != KeyEventKind::Release {
                return Control::Quit;
            }
            match (translate_key(code), kind) {
                (Some(key), KeyEventKind::Press | KeyEventKind::Repeat) => Control::Input(InputEvent::KeyDown(key)),
                (Some(key), KeyEventKind::Release) => Control::Input(InputEvent::KeyUp(key)),
                (None, _) => Control::Ignore,
            }
        }
        Event::Mouse(MouseEvent { kind, column, row, .. }) => {
            let at = canvas.cell_to_world(column, row);
            match kind {
                MouseEventKind::Moved | MouseEventKind::Drag(MouseButton::Left) => {
                    Control::Input(InputEvent::MouseMotion { at })
                }
                MouseEventKind::Down(MouseButton::Left) => {
                    let card = if state.status == GameStatus::UpgradeMenu {
                        card_at(&state.arena, state.upgrades.len(), at)
                    } else {
                        None
                    };
                    Control::Input(InputEvent::MouseDown {
                        at,
                        clicks: clicks.press(now, card),
                    })
                }
                MouseEventKind::Up(MouseButton::Left) => Control::Input(InputEvent::MouseUp { at }),
                _ => Control::Ignore,
            }
        }
        Event::Resize(cols, rows) => Control::Resize(cols, rows),
        _ => Control::Ignore,
    }
}

// ── Game loop ─────────────────────────────────────────────────────────────────

/// Drain input, advance the simulation by the measured frame time, draw.
/// Returns when the player quits.
fn game_loop<W: Write>(
    out: &mut W,
    state: &mut MatchState,
    rx: &mpsc::Receiver<Event>,
    store: &HighScoreStore,
) -> std::io::Result<()> {
    let mut rng = thread_rng();
    let (cols, rows) = terminal::size()?;
    let mut canvas = TerminalCanvas::new(cols, rows, state.arena);
    let mut clicks = ClickTracker::default();
    let mut saved = state.high_score;
    let mut last = Instant::now();

    loop {
        let frame_start = Instant::now();

        // ── Drain all pending input events (non-blocking) ─────────────────────
        while let Ok(ev) = rx.try_recv() {
            match translate(ev, &canvas, state, &mut clicks, frame_start) {
                Control::Quit => return Ok(()),
                Control::Resize(cols, rows) => {
                    canvas.resize(cols, rows);
                    TerminalCanvas::wipe(out)?;
                }
                Control::Input(input) => *state = handle_input(state, &input),
                Control::Ignore => {}
            }
        }

        let dt = frame_start.duration_since(last).as_secs_f32().min(MAX_DT);
        last = frame_start;
        *state = tick(state, dt, &mut rng);

        // Persist the best wave as soon as it improves.
        if state.high_score > saved {
            saved = state.high_score;
            if let Err(e) = store.save(saved) {
                log::warn!("{}", e);
            }
        }

        canvas.clear();
        render::draw(state, &mut canvas);
        canvas.present(out)?;

        let elapsed = frame_start.elapsed();
        if elapsed < FRAME {
            thread::sleep(FRAME - elapsed);
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::io::Result<()> {
    init_logging();

    let config = GameConfig::load_or_default(config_path());
    let store = HighScoreStore::new(HighScoreStore::default_path());
    let mut state = init_state(config, store.load());

    let raw_out = stdout();
    let mut out = BufWriter::new(raw_out);

    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;
    out.execute(EnableMouseCapture)?;

    // Request key-release (and key-repeat) events where the terminal can.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
        .is_ok();

    // Blocking reads live on their own thread so the frame loop never waits.
    let (tx, rx) = mpsc::channel::<Event>();
    thread::spawn(move || {
        while let Ok(ev) = event::read() {
            if tx.send(ev).is_err() {
                break; // receiver dropped → program exiting
            }
        }
    });

    let result = game_loop(&mut out, &mut state, &rx, &store);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(DisableMouseCapture);
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    log::info!(
        "session over: wave {}, {} kills, best wave {}",
        state.wave.wave,
        state.total_kills,
        state.high_score
    );
    result
}
