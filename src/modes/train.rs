//! Training mode for the tabular agent
//!
//! Continues from a stored table when one exists, otherwise starts from a
//! table pre-populated with every reachable state. Progress is logged every
//! `log_frequency` episodes, checkpoints are written every
//! `checkpoint_frequency` episodes and the final table is saved at the end.
//!
//! # Example
//!
//! ```rust,no_run
//! use snake_qlearning::modes::{TrainConfig, TrainMode};
//! use snake_qlearning::rl::JsonTableStore;
//!
//! let config = TrainConfig::new(5000);
//! let mut train_mode = TrainMode::new(config, JsonTableStore::new("models/q_table.json"));
//! train_mode.run()?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context, Result};
use tracing::info;

use super::seeded_rng;
use crate::game::GameConfig;
use crate::metrics::TrainingStats;
use crate::rl::{AgentConfig, QLearningAgent, TableMetadata, TableStore, Trainer};

/// Configuration for training mode
#[derive(Debug, Clone)]
pub struct TrainConfig {
    /// Number of episodes to train in this run
    pub episodes: usize,

    /// Step cap per episode
    pub max_steps: usize,

    /// Save a checkpoint every N episodes (0 disables checkpoints)
    pub checkpoint_frequency: usize,

    /// Log training progress every N episodes
    pub log_frequency: usize,

    /// Seed for the run's random source; entropy when absent
    pub seed: Option<u64>,

    /// Grid size, start cell and rewards
    pub game_config: GameConfig,

    /// Learning rate and exploration schedule
    pub agent_config: AgentConfig,
}

impl Default for TrainConfig {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl TrainConfig {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            max_steps: 200,
            checkpoint_frequency: 0,
            log_frequency: 100,
            seed: None,
            game_config: GameConfig::default(),
            agent_config: AgentConfig::default(),
        }
    }

    /// Use the same grid for the game and the agent
    pub fn with_grid_size(mut self, grid_size: usize) -> Self {
        self.game_config.grid_size = grid_size;
        self.agent_config.grid_size = grid_size;
        self
    }
}

/// Outcome of a training run
#[derive(Debug)]
pub struct TrainOutcome {
    pub agent: QLearningAgent,
    /// Episodes in the saved table, earlier runs included
    pub episodes_trained: usize,
    pub stats: TrainingStats,
}

/// Training mode for the tabular agent
pub struct TrainMode<S: TableStore> {
    config: TrainConfig,
    store: S,
}

impl<S: TableStore> TrainMode<S> {
    pub fn new(config: TrainConfig, store: S) -> Self {
        Self { config, store }
    }

    /// Run the training loop and save the resulting table
    pub fn run(&mut self) -> Result<TrainOutcome> {
        let (agent, previous_episodes) = self.initial_agent()?;
        self.log_header(&agent, previous_episodes);

        let rng = seeded_rng(self.config.seed);
        let mut trainer = Trainer::new(
            self.config.game_config.clone(),
            agent,
            rng,
            self.config.max_steps,
        )
        .context("Failed to set up training")?;

        let schedule = self.config.agent_config.exploration.clone();
        let mut stats = TrainingStats::new(self.config.log_frequency);

        for episode in 0..self.config.episodes {
            let overall = previous_episodes + episode;
            let epsilon = schedule.epsilon_for(overall);

            let summary = trainer
                .train_episode(epsilon)
                .with_context(|| format!("Training episode {} failed", overall + 1))?;
            stats.record_summary(&summary);

            if self.config.log_frequency > 0 && (episode + 1) % self.config.log_frequency == 0 {
                info!(
                    "[Episode {}/{}] {} | Epsilon: {:.3} | Visited states: {}",
                    episode + 1,
                    self.config.episodes,
                    stats.format_summary(),
                    epsilon,
                    trainer.agent().table().visited_len(),
                );
            }

            if self.config.checkpoint_frequency > 0
                && (episode + 1) % self.config.checkpoint_frequency == 0
            {
                let metadata = TableMetadata::new(self.config.game_config.grid_size, overall + 1);
                self.store
                    .checkpoint(trainer.agent().table(), &metadata)
                    .context("Failed to save checkpoint")?;
            }
        }

        let (agent, _rng) = trainer.into_parts();
        let episodes_trained = previous_episodes + self.config.episodes;
        let metadata = TableMetadata::new(self.config.game_config.grid_size, episodes_trained);
        self.store
            .save(agent.table(), &metadata)
            .context("Failed to save trained table")?;

        info!(
            episodes_trained,
            states = agent.table().len(),
            "training complete: {}",
            stats.format_summary()
        );

        Ok(TrainOutcome {
            agent,
            episodes_trained,
            stats,
        })
    }

    /// Load the stored table or build a fresh pre-populated one
    fn initial_agent(&self) -> Result<(QLearningAgent, usize)> {
        let agent_config = self.config.agent_config.clone();
        let grid_size = self.config.game_config.grid_size;

        match self.store.load()? {
            Some(stored) => {
                stored.metadata.ensure_grid(grid_size)?;
                info!(
                    episodes_trained = stored.metadata.episodes_trained,
                    "continuing from stored table"
                );
                let agent = QLearningAgent::new(agent_config, stored.table)?;
                Ok((agent, stored.metadata.episodes_trained))
            }
            None => {
                info!(grid_size, "no stored table, enumerating the state space");
                let agent = QLearningAgent::prepopulated(agent_config)?;
                Ok((agent, 0))
            }
        }
    }

    fn log_header(&self, agent: &QLearningAgent, previous_episodes: usize) {
        let config = &self.config;
        info!(
            episodes = config.episodes,
            previous_episodes,
            grid_size = config.game_config.grid_size,
            max_steps = config.max_steps,
            learning_rate = config.agent_config.learning_rate,
            epsilon_start = config.agent_config.exploration.start,
            epsilon_end = config.agent_config.exploration.end,
            epsilon_decay = config.agent_config.exploration.decay,
            table_states = agent.table().len(),
            "starting Q-learning training"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SnakeError;
    use crate::rl::{JsonTableStore, QTable};
    use tempfile::TempDir;

    fn config(episodes: usize) -> TrainConfig {
        let mut config = TrainConfig::new(episodes);
        config.seed = Some(7);
        config.log_frequency = 10;
        config
    }

    #[test]
    fn test_train_config_defaults() {
        let config = TrainConfig::default();
        assert_eq!(config.episodes, 1000);
        assert_eq!(config.max_steps, 200);
        assert_eq!(config.game_config.grid_size, 3);
        assert_eq!(config.agent_config.grid_size, 3);
    }

    #[test]
    fn test_with_grid_size_keeps_both_in_sync() {
        let config = TrainConfig::new(10).with_grid_size(4);
        assert_eq!(config.game_config.grid_size, 4);
        assert_eq!(config.agent_config.grid_size, 4);
    }

    #[test]
    fn test_fresh_run_saves_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTableStore::new(temp_dir.path().join("q.json"));

        let outcome = TrainMode::new(config(30), store.clone()).run().unwrap();

        assert_eq!(outcome.episodes_trained, 30);
        assert_eq!(outcome.stats.total_episodes(), 30);
        assert_eq!(outcome.agent.table().len(), QTable::prepopulated(3).len());

        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.metadata.episodes_trained, 30);
        assert_eq!(&stored.table, outcome.agent.table());
    }

    #[test]
    fn test_two_by_two_run_saves_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTableStore::new(temp_dir.path().join("q.json"));
        let mut config = TrainConfig::new(2000).with_grid_size(2);
        config.seed = Some(7);

        // A 2x2 snake fills the grid often; those episodes end instead of failing
        let outcome = TrainMode::new(config, store.clone()).run().unwrap();

        assert_eq!(outcome.episodes_trained, 2000);
        assert!(outcome.stats.highest_score() >= 3);
        let stored = store.load().unwrap().unwrap();
        assert_eq!(stored.metadata.grid_size, 2);
        assert_eq!(stored.metadata.episodes_trained, 2000);
    }

    #[test]
    fn test_continues_from_stored_table() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTableStore::new(temp_dir.path().join("q.json"));

        let first = TrainMode::new(config(20), store.clone()).run().unwrap();
        let second = TrainMode::new(config(15), store.clone()).run().unwrap();

        assert_eq!(second.episodes_trained, 35);
        assert!(second.agent.table().visited_len() >= first.agent.table().visited_len());
        assert_eq!(store.load().unwrap().unwrap().metadata.episodes_trained, 35);
    }

    #[test]
    fn test_rejects_table_for_other_grid() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTableStore::new(temp_dir.path().join("q.json"));
        store
            .save(&QTable::new(), &TableMetadata::new(4, 10))
            .unwrap();

        let err = TrainMode::new(config(5), store).run().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SnakeError>(),
            Some(SnakeError::GridSizeMismatch { expected: 3, found: 4 })
        ));
    }

    #[test]
    fn test_checkpoints_written() {
        let temp_dir = TempDir::new().unwrap();
        let store = JsonTableStore::new(temp_dir.path().join("q.json"));
        let mut config = config(20);
        config.checkpoint_frequency = 10;

        TrainMode::new(config, store).run().unwrap();

        assert!(temp_dir.path().join("checkpoint_ep10.json").exists());
        assert!(temp_dir.path().join("checkpoint_ep20.json").exists());
    }

    #[test]
    fn test_seeded_runs_match() {
        let run = || {
            let temp_dir = TempDir::new().unwrap();
            let store = JsonTableStore::new(temp_dir.path().join("q.json"));
            TrainMode::new(config(25), store).run().unwrap().agent.into_table()
        };

        assert_eq!(run(), run());
    }
}
