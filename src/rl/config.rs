//! Q-learning hyperparameter configuration

use serde::{Deserialize, Serialize};

/// Exploration rate over the course of training
///
/// Episode `k` explores with probability `max(end, start * decay^k)`. The
/// default keeps epsilon constant at 0.1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationSchedule {
    /// Epsilon for the first episode
    pub start: f64,
    /// Floor the schedule never decays below
    pub end: f64,
    /// Multiplicative decay applied once per episode
    pub decay: f64,
}

impl Default for ExplorationSchedule {
    fn default() -> Self {
        Self::constant(0.1)
    }
}

impl ExplorationSchedule {
    pub fn constant(epsilon: f64) -> Self {
        Self {
            start: epsilon,
            end: epsilon,
            decay: 1.0,
        }
    }

    /// Exploration rate for the given zero-based episode
    pub fn epsilon_for(&self, episode: usize) -> f64 {
        let exponent = i32::try_from(episode).unwrap_or(i32::MAX);
        (self.start * self.decay.powi(exponent)).max(self.end)
    }

    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("start", self.start), ("end", self.end)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("epsilon {} must be in [0, 1], got {}", name, value));
            }
        }

        if self.end > self.start {
            return Err(format!(
                "epsilon end ({}) must not exceed epsilon start ({})",
                self.end, self.start
            ));
        }

        if self.decay <= 0.0 || self.decay > 1.0 {
            return Err(format!(
                "epsilon decay must be in (0, 1], got {}",
                self.decay
            ));
        }

        Ok(())
    }
}

/// Configuration for the tabular agent, fixed for the agent's lifetime
///
/// The value update carries no discount factor: future value is added
/// undiscounted, which is sound here because every episode ends by collision
/// or step cap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Step size of the value update
    ///
    /// Default: 0.2
    pub learning_rate: f64,

    /// Side length of the grid the table is built for
    pub grid_size: usize,

    /// Exploration rate per episode
    pub exploration: ExplorationSchedule,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            learning_rate: 0.2,
            grid_size: 3,
            exploration: ExplorationSchedule::default(),
        }
    }
}

impl AgentConfig {
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(format!(
                "learning_rate must be in (0, 1], got {}",
                self.learning_rate
            ));
        }

        if self.grid_size < 2 {
            return Err(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            ));
        }

        self.exploration.validate()
    }
}
