//! Learning-trajectory experiment
//!
//! For each training epsilon a fresh pre-populated agent is trained; after
//! every training episode one greedy evaluation episode is played and its
//! score recorded. All runs draw from one seeded random source, handed from
//! run to run. The result is written as a JSON report for external plotting.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use super::seeded_rng;
use crate::game::GameConfig;
use crate::metrics::moving_average;
use crate::rl::{AgentConfig, ExplorationSchedule, QLearningAgent, QTable, Trainer};

#[derive(Debug, Clone)]
pub struct CurveConfig {
    /// Training epsilon of each run, in run order
    pub epsilons: Vec<f64>,
    /// Training episodes per run
    pub episodes: usize,
    pub max_steps: usize,
    /// Moving-average window over evaluation scores
    pub window: usize,
    pub seed: u64,
    pub learning_rate: f64,
    pub game_config: GameConfig,
}

impl Default for CurveConfig {
    fn default() -> Self {
        Self {
            epsilons: vec![0.0, 1.0, 0.1],
            episodes: 1000,
            max_steps: 200,
            window: 50,
            seed: 42,
            learning_rate: AgentConfig::default().learning_rate,
            game_config: GameConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveRun {
    pub epsilon: f64,
    /// Greedy evaluation score after each training episode
    pub scores: Vec<u32>,
    pub moving_average: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveReport {
    pub grid_size: usize,
    pub episodes: usize,
    pub window: usize,
    pub seed: u64,
    pub runs: Vec<CurveRun>,
}

impl CurveReport {
    pub fn write_json(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
        }
        let json = serde_json::to_string_pretty(self).context("Failed to serialize curve report")?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write curve report to {:?}", path))?;
        Ok(())
    }
}

pub struct CurveMode {
    config: CurveConfig,
}

impl CurveMode {
    pub fn new(config: CurveConfig) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<CurveReport> {
        let config = &self.config;
        let grid_size = config.game_config.grid_size;

        // Enumerate once; every run starts from a copy
        let initial_table = QTable::prepopulated(grid_size);
        let mut rng = seeded_rng(Some(config.seed));
        let mut runs = Vec::with_capacity(config.epsilons.len());

        for &epsilon in &config.epsilons {
            let agent_config = AgentConfig {
                learning_rate: config.learning_rate,
                grid_size,
                exploration: ExplorationSchedule::constant(epsilon),
            };
            let agent = QLearningAgent::new(agent_config, initial_table.clone())?;
            let mut trainer = Trainer::new(config.game_config.clone(), agent, rng, config.max_steps)?;

            let mut scores = Vec::with_capacity(config.episodes);
            for _ in 0..config.episodes {
                trainer.train_episode(epsilon)?;
                scores.push(trainer.evaluate_episode()?.score);
            }

            let as_f64: Vec<f64> = scores.iter().map(|&s| f64::from(s)).collect();
            let averages = moving_average(&as_f64, config.window);
            info!(
                epsilon,
                final_average = averages.last().copied().unwrap_or(0.0),
                "learning curve run finished"
            );

            runs.push(CurveRun {
                epsilon,
                scores,
                moving_average: averages,
            });
            (_, rng) = trainer.into_parts();
        }

        Ok(CurveReport {
            grid_size,
            episodes: config.episodes,
            window: config.window,
            seed: config.seed,
            runs,
        })
    }
}
