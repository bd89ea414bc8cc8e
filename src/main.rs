use std::fs::OpenOptions;
use std::io::{self, Stdout};
use std::sync::Mutex;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::ExecutableCommand;
use tracing_subscriber::EnvFilter;

use maze_quest::game::Event as GameEvent;
use maze_quest::render::{self, Renderer};
use maze_quest::{BestTimeStore, Dir, Game, MemoryStore, Phase, Result, Rules, Settings};

enum Flow {
    Continue,
    Quit,
}

fn main() -> Result<()> {
    let settings = Settings::from_env();
    init_logging(&settings)?;

    let mut stdout = io::stdout();
    terminal::enable_raw_mode()?;
    stdout.execute(EnterAlternateScreen)?;
    stdout.execute(Hide)?;

    let result = run(&mut stdout, &settings);

    stdout.execute(Show)?;
    stdout.execute(LeaveAlternateScreen)?;
    terminal::disable_raw_mode()?;
    if let Err(err) = &result {
        tracing::error!(error = %err, "game aborted");
    }
    result
}

/// Logs go to the file named by `MAZE_LOG`; the terminal is in raw mode and
/// cannot share stdout or stderr with them.
fn init_logging(settings: &Settings) -> Result<()> {
    let Some(path) = settings.log_file.as_ref() else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn run(stdout: &mut Stdout, settings: &Settings) -> Result<()> {
    let rules = Rules::default();
    let store = MemoryStore::new();
    let mut game = match settings.seed {
        Some(seed) => Game::with_seed(rules, store, seed),
        None => Game::new(rules, store),
    };
    tracing::info!(seed = ?settings.seed, fps = settings.render_fps, "session started");

    let mut renderer = Renderer::new();
    let mut answer = String::new();
    let mut events: Vec<GameEvent> = Vec::new();
    let frame_time = settings.frame_time();

    loop {
        let frame_start = Instant::now();
        while event::poll(Duration::from_millis(0))? {
            if let Event::Key(key) = event::read()? {
                match key.kind {
                    KeyEventKind::Press | KeyEventKind::Repeat => {
                        let flow =
                            handle_key(&mut game, key.code, &mut answer, Instant::now(), &mut events)?;
                        if let Flow::Quit = flow {
                            return Ok(());
                        }
                    }
                    _ => {}
                }
            }
        }

        game.tick(Instant::now(), &mut events);
        for event in events.drain(..) {
            tracing::trace!(?event, "game event");
        }
        render::render(stdout, &game, &answer, &mut renderer)?;

        let elapsed = frame_start.elapsed();
        if elapsed < frame_time {
            thread::sleep(frame_time - elapsed);
        }
    }
}

fn dir_for(code: KeyCode) -> Option<Dir> {
    match code {
        KeyCode::Up | KeyCode::Char('k') => Some(Dir::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(Dir::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(Dir::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(Dir::Right),
        _ => None,
    }
}

fn handle_key<S: BestTimeStore>(
    game: &mut Game<S>,
    code: KeyCode,
    answer: &mut String,
    now: Instant,
    events: &mut Vec<GameEvent>,
) -> Result<Flow> {
    match game.phase() {
        Phase::AwaitingStart => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                game.confirm_start(true, now, events)?
            }
            KeyCode::Char('n') | KeyCode::Char('N') => game.confirm_start(false, now, events)?,
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),
            _ => {}
        },
        Phase::Declined => return Ok(Flow::Quit),
        Phase::MagicChallenge { .. } => match code {
            KeyCode::Enter => {
                game.answer_magic(answer, now, events);
                answer.clear();
            }
            KeyCode::Esc => {
                game.answer_magic("", now, events);
                answer.clear();
            }
            KeyCode::Backspace => {
                answer.pop();
            }
            KeyCode::Char(c) => answer.push(c),
            _ => {}
        },
        Phase::CampaignComplete { .. } => match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => game.restart(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') | KeyCode::Esc => {
                return Ok(Flow::Quit)
            }
            _ => {}
        },
        Phase::Playing | Phase::Frozen => match code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(Flow::Quit),
            other => {
                if let Some(dir) = dir_for(other) {
                    game.move_dir(dir, now, events)?;
                }
            }
        },
    }
    Ok(Flow::Continue)
}
