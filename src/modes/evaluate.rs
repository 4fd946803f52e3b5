//! Greedy evaluation of a stored table
//!
//! Plays `episodes` episodes with no exploration and no learning, then
//! reports the scores and updates the persisted high score.

use anyhow::{bail, Context, Result};
use tracing::info;

use super::seeded_rng;
use crate::game::GameConfig;
use crate::metrics::{HighScoreStore, TrainingStats};
use crate::rl::{AgentConfig, EpisodeEnd, QLearningAgent, TableStore, Trainer};

#[derive(Debug, Clone)]
pub struct EvaluateConfig {
    pub episodes: usize,
    pub max_steps: usize,
    pub seed: Option<u64>,
    pub game_config: GameConfig,
}

impl Default for EvaluateConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            max_steps: 200,
            seed: None,
            game_config: GameConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationReport {
    pub scores: Vec<u32>,
    pub mean_score: f64,
    pub best_score: u32,
    /// Episodes cut off by the step cap instead of a collision
    pub truncated: usize,
    pub new_high_score: bool,
}

pub struct EvaluateMode<S: TableStore, H: HighScoreStore> {
    config: EvaluateConfig,
    store: S,
    high_scores: H,
}

impl<S: TableStore, H: HighScoreStore> EvaluateMode<S, H> {
    pub fn new(config: EvaluateConfig, store: S, high_scores: H) -> Self {
        Self {
            config,
            store,
            high_scores,
        }
    }

    pub fn run(&self) -> Result<EvaluationReport> {
        let grid_size = self.config.game_config.grid_size;
        let Some(stored) = self.store.load()? else {
            bail!("No trained value table found; run the train mode first");
        };
        stored.metadata.ensure_grid(grid_size)?;

        info!(
            episodes_trained = stored.metadata.episodes_trained,
            episodes = self.config.episodes,
            "evaluating greedy policy"
        );

        let agent = QLearningAgent::new(AgentConfig::new(grid_size), stored.table)?;
        let mut trainer = Trainer::new(
            self.config.game_config.clone(),
            agent,
            seeded_rng(self.config.seed),
            self.config.max_steps,
        )
        .context("Failed to set up evaluation")?;

        let mut stats = TrainingStats::new(self.config.episodes);
        let mut scores = Vec::with_capacity(self.config.episodes);
        let mut truncated = 0;

        for _ in 0..self.config.episodes {
            let summary = trainer.evaluate_episode()?;
            if summary.end == EpisodeEnd::StepLimit {
                truncated += 1;
            }
            stats.record_summary(&summary);
            scores.push(summary.score);
        }

        let best_score = stats.highest_score();
        let new_high_score = self
            .high_scores
            .record(best_score)
            .context("Failed to update high score")?;

        info!(truncated, "evaluation finished: {}", stats.format_summary());

        Ok(EvaluationReport {
            mean_score: stats.mean_episode_score(),
            best_score,
            truncated,
            new_high_score,
            scores,
        })
    }
}
