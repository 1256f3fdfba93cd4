use std::fs::File;
use std::io;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use simplelog::{Config, LevelFilter, WriteLogger};

use sneksim::{
    apply, Applied, Engine, FileScoreStore, GameState, Mode, Normalizer, Pacer, Signal, TickOutcome,
};

const HIGH_SCORE_FILE: &str = ".sneksim_high_score.txt";
const LOG_FILE: &str = "sneksim.log";

const TILE_SIZE: u16 = 1;
const HEADER_ROWS: u16 = 3;

const RESIZE_DEBOUNCE: Duration = Duration::from_millis(250);
const IDLE_POLL: Duration = Duration::from_millis(250);

fn main() -> Result<(), io::Error> {
    // Set up logging before anything else; the terminal owns stdout.
    WriteLogger::init(LevelFilter::Info, Config::default(), File::create(LOG_FILE)?)
        .expect("Failed to initialize logger");

    info!("Starting sneksim");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let (field_width, field_height) = field_viewport(size.width, size.height);

    let mut rng = rand::thread_rng();
    let mut engine = Engine::new(
        field_width,
        field_height,
        TILE_SIZE,
        Box::new(FileScoreStore::new(HIGH_SCORE_FILE)),
        &mut rng,
    );
    let mut normalizer = Normalizer::new();
    let mut pacer = Pacer::new(Instant::now());
    let mut pending_resize: Option<(u16, u16, Instant)> = None;

    loop {
        terminal.draw(|frame| draw(frame, &engine))?;

        // Sleep until whichever fires first: the next tick, a debounced
        // signal becoming ready, or a settled resize.
        let now = Instant::now();
        let deadline = [
            pacer.deadline(),
            normalizer.deadline(),
            pending_resize.map(|(_, _, at)| at),
        ]
        .into_iter()
        .flatten()
        .min();
        let timeout = deadline.map_or(IDLE_POLL, |at| at.saturating_duration_since(now));

        if event::poll(timeout)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('q') | KeyCode::Esc => break,
                    code => {
                        if let Some(signal) = signal_for(code) {
                            normalizer.offer(signal, engine.state(), Instant::now());
                        }
                    }
                },
                Event::Resize(width, height) => {
                    pending_resize = Some((width, height, Instant::now() + RESIZE_DEBOUNCE));
                }
                _ => {}
            }
        }

        let now = Instant::now();

        if let Some((width, height, at)) = pending_resize {
            if now >= at {
                pending_resize = None;
                let (field_width, field_height) = field_viewport(width, height);
                let outcome = engine.resize(field_width, field_height, &mut rng);
                note_outcome(outcome, &mut pacer, &engine);
                info!("Resized field to {:?}", engine.field());
            }
        }

        if let Some(signal) = normalizer.take_ready(now) {
            match apply(signal, &mut engine, &mut rng) {
                // Every state boundary gets one immediate tick so the frame
                // being shown reflects the transition.
                Applied::Steered { resumed: true } | Applied::Resumed | Applied::Restarted => {
                    pacer.restart(now);
                    let outcome = engine.tick(&mut rng);
                    note_outcome(outcome, &mut pacer, &engine);
                }
                Applied::Paused => {
                    pacer.halt();
                    let outcome = engine.tick(&mut rng);
                    note_outcome(outcome, &mut pacer, &engine);
                }
                Applied::SmoothEnabled => pacer.switch_mode(Mode::Smooth, now),
                Applied::SmoothDisabled => pacer.switch_mode(Mode::Stepped, now),
                Applied::Steered { resumed: false } | Applied::Ignored => {}
            }
        }

        if pacer.due(now) {
            let outcome = engine.tick(&mut rng);
            note_outcome(outcome, &mut pacer, &engine);
        }
    }

    // Cleanup terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    info!("Exiting sneksim");

    Ok(())
}

/// The cells available to the engine once the header and borders are drawn.
fn field_viewport(width: u16, height: u16) -> (u16, u16) {
    (
        width.saturating_sub(2),
        height.saturating_sub(HEADER_ROWS + 2),
    )
}

fn signal_for(code: KeyCode) -> Option<Signal> {
    match code {
        KeyCode::Left => Some(Signal::Left),
        KeyCode::Up => Some(Signal::Up),
        KeyCode::Right => Some(Signal::Right),
        KeyCode::Down => Some(Signal::Down),
        KeyCode::Char(' ') => Some(Signal::PauseToggle),
        KeyCode::Char('s') => Some(Signal::SmoothToggle),
        _ => None,
    }
}

fn note_outcome(outcome: TickOutcome, pacer: &mut Pacer, engine: &Engine) {
    match outcome {
        TickOutcome::GameOver { final_score } => {
            info!("Game over with score {}", final_score);
            pacer.halt();
        }
        TickOutcome::Ate => info!("Snake grew to {}", engine.score()),
        TickOutcome::Moved | TickOutcome::Idle => {}
    }
}

fn draw(frame: &mut Frame, engine: &Engine) {
    let mut header = format!(
        "SNEKSIM    High Score: {}    Score: {}",
        engine.high_score(),
        engine.score()
    );
    if engine.is_smooth() {
        header.push_str("    60 FPS");
    }

    let layout =
        Layout::vertical([Constraint::Length(HEADER_ROWS), Constraint::Min(0)]).split(frame.area());

    frame.render_widget(
        Paragraph::new(header)
            .alignment(Alignment::Left)
            .block(Block::default().borders(Borders::ALL)),
        layout[0],
    );

    let title = match engine.state() {
        GameState::Init => "Press an arrow key to start",
        GameState::Running => "Playing",
        GameState::Paused => "Paused. Press SPACE to continue",
        GameState::GameOver => "Game over",
    };
    let block = Block::default().title(title).borders(Borders::ALL);
    let inner = block.inner(layout[1]);
    frame.render_widget(block, layout[1]);
    frame.render_widget(engine, inner);

    if engine.state() == GameState::GameOver {
        frame.render_widget(
            Paragraph::new(format!(
                "GAME OVER\nYour score: {}\nPress SPACE to play again",
                engine.final_score()
            ))
            .alignment(Alignment::Center),
            inner,
        );
    }
}
