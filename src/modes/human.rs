//! Keyboard play on the grid world
//!
//! Arrow keys or WASD set an absolute heading; without input the snake keeps
//! its current heading. The game ticks at 8 Hz and the best score is
//! persisted through a [`HighScoreStore`].

use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use rand::rngs::StdRng;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{stderr, Stderr};
use std::time::Duration;
use tokio::time::interval;
use tracing::info;

use super::seeded_rng;
use crate::game::{Direction, GameConfig, GridWorld, StepOutcome};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::{GameMetrics, HighScoreStore};
use crate::render::Renderer;
use crate::rl::current_direction;

const HINTS: &[(&str, &str)] = &[("↑↓←→/WASD", "move"), ("R", "restart"), ("Q", "quit")];

pub struct HumanMode<H: HighScoreStore> {
    world: GridWorld,
    rng: StdRng,
    metrics: GameMetrics,
    high_scores: H,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    pending_direction: Option<Direction>,
}

impl<H: HighScoreStore> HumanMode<H> {
    pub fn new(config: GameConfig, high_scores: H, seed: Option<u64>) -> Result<Self> {
        let mut rng = seeded_rng(seed);
        let world = GridWorld::new(config, &mut rng).context("Failed to create game")?;
        let metrics = GameMetrics::new(high_scores.load());

        Ok(Self {
            world,
            rng,
            metrics,
            high_scores,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            pending_direction: None,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let result = self.run_game_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_game_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Game ticks at 8 Hz (125ms per tick)
        let mut tick_timer = interval(Duration::from_millis(125));

        // Render at 30 FPS (33ms per frame)
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if self.world.snapshot().is_alive() {
                        self.update_game()?;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = [
                        ("High", self.metrics.high_score.to_string()),
                        ("Time", self.metrics.format_time()),
                    ];
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.world.snapshot(), &hud, HINTS);
                    }).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Steer(direction) => {
                    let snake = &self.world.snapshot().snake;
                    let current = current_direction(&snake.body);
                    if let Some(direction) = InputHandler::steer(direction, current, snake.len()) {
                        self.pending_direction = Some(direction);
                    }
                }
                KeyAction::Restart => self.reset_game()?,
                KeyAction::Quit => self.should_quit = true,
                KeyAction::TogglePause | KeyAction::Speed(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn update_game(&mut self) -> Result<()> {
        let direction = self
            .pending_direction
            .take()
            .unwrap_or_else(|| current_direction(&self.world.snapshot().snake.body));

        match self.world.step(direction, &mut self.rng)? {
            StepOutcome::GameOver(collision) => self.finish_game(collision.describe()),
            StepOutcome::Filled => self.finish_game("grid filled"),
            StepOutcome::Moved | StepOutcome::Grew => Ok(()),
        }
    }

    fn finish_game(&mut self, cause: &str) -> Result<()> {
        let score = self.world.snapshot().score;
        info!(score, cause, "game over");
        self.metrics.on_game_over(score);
        self.high_scores.record(score)?;
        Ok(())
    }

    fn reset_game(&mut self) -> Result<()> {
        self.world.reset(&mut self.rng)?;
        self.metrics.on_game_start();
        self.pending_direction = None;
        Ok(())
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)
            .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
