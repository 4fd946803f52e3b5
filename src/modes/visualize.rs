//! Visualization mode for watching a trained agent
//!
//! Loads a stored table and lets the agent play without learning. A new
//! episode starts automatically after a collision or at the step cap.
//!
//! # Controls
//!
//! - Space: Pause/unpause
//! - R: Restart episode
//! - 1-4: Speed control (1=slow, 2=normal, 3=fast, 4=very fast)
//! - Q/Esc: Quit

use anyhow::{bail, Context, Result};
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
use tokio::time::{interval, Interval};
use tracing::info;

use super::seeded_rng;
use crate::game::{Action, GameConfig};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::{GameMetrics, HighScoreStore};
use crate::render::Renderer;
use crate::rl::{AgentConfig, Learning, QLearningAgent, TableStore, Trainer};

const HINTS: &[(&str, &str)] = &[
    ("Space", "pause"),
    ("R", "restart"),
    ("1-4", "speed"),
    ("Q", "quit"),
];

/// Visualization speed settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisualizationSpeed {
    /// Slow: 2 Hz (500ms per step)
    Slow,
    /// Normal: 8 Hz (125ms per step), same as human mode
    Normal,
    /// Fast: 20 Hz (50ms per step)
    Fast,
    /// Very Fast: 60 Hz (16ms per step)
    VeryFast,
}

impl VisualizationSpeed {
    fn tick_interval(&self) -> Duration {
        match self {
            Self::Slow => Duration::from_millis(500),
            Self::Normal => Duration::from_millis(125),
            Self::Fast => Duration::from_millis(50),
            Self::VeryFast => Duration::from_millis(16),
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Slow => "Slow",
            Self::Normal => "Normal",
            Self::Fast => "Fast",
            Self::VeryFast => "Very Fast",
        }
    }

    fn from_preset(preset: u8) -> Option<Self> {
        match preset {
            1 => Some(Self::Slow),
            2 => Some(Self::Normal),
            3 => Some(Self::Fast),
            4 => Some(Self::VeryFast),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct VisualizeConfig {
    /// Exploration while watching; 0 shows the greedy policy
    pub epsilon: f64,
    pub max_steps: usize,
    pub seed: Option<u64>,
    pub game_config: GameConfig,
}

impl Default for VisualizeConfig {
    fn default() -> Self {
        Self {
            epsilon: 0.0,
            max_steps: 200,
            seed: None,
            game_config: GameConfig::default(),
        }
    }
}

/// Visualization mode for watching a trained agent
pub struct VisualizeMode<H: HighScoreStore> {
    trainer: Trainer<StdRng>,
    epsilon: f64,
    metrics: GameMetrics,
    high_scores: H,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
    paused: bool,
    speed: VisualizationSpeed,
    /// 1-based number of the episode on screen
    episode: usize,
    /// Whether the episode on screen has already been scored
    episode_over: bool,
    last_action: Option<Action>,
}

impl<H: HighScoreStore> VisualizeMode<H> {
    pub fn new<S: TableStore>(config: VisualizeConfig, store: &S, high_scores: H) -> Result<Self> {
        let grid_size = config.game_config.grid_size;
        let Some(stored) = store.load()? else {
            bail!("No trained value table found; run the train mode first");
        };
        stored.metadata.ensure_grid(grid_size)?;

        info!(
            episodes_trained = stored.metadata.episodes_trained,
            states = stored.table.len(),
            version = %stored.metadata.version,
            "loaded table for visualization"
        );

        let agent = QLearningAgent::new(AgentConfig::new(grid_size), stored.table)?;
        let trainer = Trainer::new(
            config.game_config,
            agent,
            seeded_rng(config.seed),
            config.max_steps,
        )
        .context("Failed to set up visualization")?;
        let metrics = GameMetrics::new(high_scores.load());

        Ok(Self {
            trainer,
            epsilon: config.epsilon,
            metrics,
            high_scores,
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
            paused: false,
            speed: VisualizationSpeed::Normal,
            episode: 1,
            episode_over: false,
            last_action: None,
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

        let result = self.run_visualization_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;

        result
    }

    async fn run_visualization_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut tick_timer = interval(self.speed.tick_interval());
        let mut render_timer = interval(Duration::from_millis(33));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event, &mut tick_timer)?;
                    }
                }

                _ = tick_timer.tick() => {
                    if !self.paused {
                        self.tick()?;
                    }
                }

                _ = render_timer.tick() => {
                    self.metrics.update();
                    let hud = self.hud();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, self.trainer.world().snapshot(), &hud, HINTS);
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

    /// Advance playback by one step, or start the next episode when the
    /// current one has ended
    fn tick(&mut self) -> Result<()> {
        if self.episode_over {
            self.restart()?;
            return Ok(());
        }

        let transition = self.trainer.advance(self.epsilon, Learning::Disabled)?;
        self.last_action = Some(transition.action);
        let steps = self.trainer.world().snapshot().steps as usize;
        if transition.outcome.is_terminal() || steps >= self.trainer.max_steps() {
            self.finish_episode()?;
        }

        Ok(())
    }

    fn finish_episode(&mut self) -> Result<()> {
        let score = self.trainer.world().snapshot().score;
        self.metrics.on_game_over(score);
        self.high_scores.record(score)?;
        self.episode_over = true;
        Ok(())
    }

    fn restart(&mut self) -> Result<()> {
        self.trainer.reset()?;
        self.metrics.on_game_start();
        self.episode += 1;
        self.episode_over = false;
        self.last_action = None;
        Ok(())
    }

    fn handle_event(&mut self, event: Event, tick_timer: &mut Interval) -> Result<()> {
        if let Event::Key(key) = event {
            if key.kind != KeyEventKind::Press {
                return Ok(());
            }

            match self.input_handler.handle_key_event(key) {
                KeyAction::Quit => self.should_quit = true,
                KeyAction::TogglePause => self.paused = !self.paused,
                KeyAction::Restart => self.restart()?,
                KeyAction::Speed(preset) => {
                    if let Some(speed) = VisualizationSpeed::from_preset(preset) {
                        self.speed = speed;
                        tick_timer.reset_after(speed.tick_interval());
                    }
                }
                KeyAction::Steer(_) | KeyAction::None => {}
            }
        }

        Ok(())
    }

    fn hud(&self) -> Vec<(&'static str, String)> {
        let mut hud = vec![
            ("Episode", self.episode.to_string()),
            ("Epsilon", format!("{:.2}", self.epsilon)),
            ("High", self.metrics.high_score.to_string()),
            ("Speed", self.speed.as_str().to_string()),
        ];
        if let Some(action) = self.last_action {
            hud.push(("Action", action.name().to_string()));
        }
        if self.paused {
            hud.push(("State", "PAUSED".to_string()));
        }
        hud
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
