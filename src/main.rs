mod clock;
mod config;
mod food;
mod game;
mod snake;
mod term;

use std::{fs::File, path::PathBuf, thread::sleep, time::Duration};

use clap::{Parser, ValueEnum};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use simplelog::{Config, LevelFilter, WriteLogger};

use crate::clock::{Clock, MonotonicClock};
use crate::config::GameConfig;
use crate::game::{Command, GameOverReason, Phase, SnakeGame};
use crate::snake::Direction::*;
use crate::term::TermManager;

pub type Millis = u64;
pub type Cell = (i32, i32);
pub type TermInt = u16;
pub type TermCoords = (u16, u16);

#[derive(Parser)]
#[command(name = "gridsnake", about = "Classic snake on a fixed grid, in the terminal")]
struct Args {
    /// YAML file overriding field size, speed and colors
    #[arg(long)]
    config: Option<PathBuf>,
    /// Seed for food placement; random when omitted
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long, default_value = "snake.log")]
    log_file: PathBuf,
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    log_level: LogLevel,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // The terminal belongs to the game, so logs go to a file
    WriteLogger::init(args.log_level.into(), Config::default(), File::create(&args.log_file)?)?;

    let config = match &args.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::default(),
    };
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("Starting gridsnake with {:?}, seed {}", config, seed);

    let (columns, rows) = (config.columns() as TermInt, config.rows() as TermInt);
    let mut term = TermManager::new(columns, rows)?;
    if !term.fits() {
        let (need_w, need_h) = TermManager::required_size(columns, rows);
        let (w, h) = term.get_terminal_size();
        return Err(format!("Terminal is {}x{}, the game needs at least {}x{}", w, h, need_w, need_h).into());
    }

    if let Err(err) = term.setup() {
        // Leave the terminal usable when setup only got halfway
        let _ = term.restore();
        return Err(err.into());
    }

    let clock = MonotonicClock::new();
    let mut game = SnakeGame::new(config, StdRng::seed_from_u64(seed), clock.now_ms());

    let result = run(&mut game, &mut term, &clock);
    // Restore even when the loop failed
    let restored = term.restore();

    info!("Shutting down in phase {:?} with score {}", game.phase(), game.score());
    result?;
    restored?;
    Ok(())
}

fn run(game: &mut SnakeGame, term: &mut TermManager, clock: &impl Clock) -> crossterm::Result<()> {
    term.clear()?;
    term.draw_borders()?;
    let frame_budget = game.config().frame_budget_ms;

    while game.is_running() {
        let frame_start = clock.now_ms();

        for key_ev in term.read_key_events_queue()? {
            handle_key(game, &key_ev);
        }

        game.tick(clock.now_ms());
        render(game, term)?;

        let elapsed = clock.now_ms().saturating_sub(frame_start);
        if elapsed < frame_budget {
            sleep(Duration::from_millis(frame_budget - elapsed));
        }
    }

    Ok(())
}

fn handle_key(game: &mut SnakeGame, key_ev: &KeyEvent) {
    match key_ev {
        ev if is_ctrl_c(ev) => game.handle_command(Command::Quit),
        KeyEvent { code, modifiers: _ } => match code {
            KeyCode::Char('w') | KeyCode::Up => game.request_direction(Up),
            KeyCode::Char('a') | KeyCode::Left => game.request_direction(Left),
            KeyCode::Char('s') | KeyCode::Down => game.request_direction(Down),
            KeyCode::Char('d') | KeyCode::Right => game.request_direction(Right),
            KeyCode::Char('r') | KeyCode::Char('R') => game.handle_command(play_command(game.phase())),
            KeyCode::Esc | KeyCode::Char('q') => game.handle_command(Command::Quit),
            _ => {}
        }
    }
}

/// 'R' starts the first game and restarts every later one.
fn play_command(phase: Phase) -> Command {
    if phase == Phase::Start {Command::Start} else {Command::Restart}
}

fn render(game: &SnakeGame, term: &mut TermManager) -> crossterm::Result<()> {
    match game.phase() {
        Phase::Start => {
            term.print_status("")?;
            term.show_message(&[
                "Press 'R' to play snake",
                "",
                "Arrow keys or WASD to move",
                "Esc to quit",
            ])?;
        },
        Phase::Playing => {
            term.hide_message()?;
            draw_field(game, term)?;
            term.print_status(&format!("Score: {}", game.score()))?;
        },
        Phase::GameOver => {
            let final_score = format!("Final Score: {}", game.score());
            term.show_message(&[
                game_over_title(game.game_over_reason()),
                &final_score,
                "",
                "Press 'R' to restart",
            ])?;
        },
    }

    term.flush()
}

fn game_over_title(reason: Option<GameOverReason>) -> &'static str {
    match reason {
        Some(GameOverReason::FieldFilled) => "You filled the field!",
        Some(GameOverReason::Wall) => "Game Over: hit the wall",
        Some(GameOverReason::SelfCollision) => "Game Over: ran into yourself",
        None => "Game Over",
    }
}

fn draw_field(game: &SnakeGame, term: &mut TermManager) -> crossterm::Result<()> {
    let config = game.config();
    let columns = config.columns();
    let rows = config.rows();
    let mut frame = vec![None; (columns * rows) as usize];

    let slot = |pos: Cell, size: i32| {
        if config.contains(pos) {
            Some(((pos.1 / size) * columns + pos.0 / size) as usize)
        } else {
            None
        }
    };

    if let Some(i) = slot(game.food().pos(), game.food().size()) {
        frame[i] = Some(config.food_color);
    }
    let size = game.snake().cell_size();
    for cell in game.snake().cells() {
        if let Some(i) = slot(cell, size) {
            frame[i] = Some(config.snake_color);
        }
    }

    for row in 0..rows {
        for col in 0..columns {
            term.fill_cell((col, row), frame[(row * columns + col) as usize])?;
        }
    }

    Ok(())
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}
