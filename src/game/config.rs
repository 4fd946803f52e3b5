use serde::{Deserialize, Serialize};

use super::state::Position;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square game grid
    pub grid_size: usize,
    /// Cell the length-1 snake starts on
    pub start: Position,

    // Rewards (for RL)
    /// Reward for eating food
    pub food_reward: f64,
    /// Reward for a step that does not eat (negative: encourages efficiency)
    pub step_penalty: f64,
    /// Reward for the step that ends the episode, whatever the collision
    pub death_penalty: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            grid_size: 3,
            start: Position::new(1, 1),
            food_reward: 10.0,
            step_penalty: -0.1,
            death_penalty: -10.0,
        }
    }
}

impl GameConfig {
    /// Create a new configuration with custom grid size
    pub fn new(grid_size: usize) -> Self {
        Self {
            grid_size,
            ..Default::default()
        }
    }

    /// Validate configuration parameters
    ///
    /// The grid needs at least one cell besides the start cell, otherwise
    /// food can never be placed.
    pub fn validate(&self) -> Result<(), String> {
        if self.grid_size < 2 {
            return Err(format!(
                "grid_size must be at least 2, got {}",
                self.grid_size
            ));
        }

        if !self.start.is_within(self.grid_size) {
            return Err(format!(
                "start cell ({}, {}) lies outside a {}x{} grid",
                self.start.row, self.start.col, self.grid_size, self.grid_size
            ));
        }

        for (name, value) in [
            ("food_reward", self.food_reward),
            ("step_penalty", self.step_penalty),
            ("death_penalty", self.death_penalty),
        ] {
            if !value.is_finite() {
                return Err(format!("{} must be finite, got {}", name, value));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GameConfig::default();
        assert_eq!(config.grid_size, 3);
        assert_eq!(config.start, Position::new(1, 1));
        assert_eq!(config.food_reward, 10.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_custom_config() {
        let config = GameConfig::new(5);
        assert_eq!(config.grid_size, 5);
        assert_eq!(config.death_penalty, -10.0);
    }

    #[test]
    fn test_rejects_degenerate_grid() {
        assert!(GameConfig::new(0).validate().is_err());

        // A 1x1 grid has no room for food
        let config = GameConfig {
            grid_size: 1,
            start: Position::new(0, 0),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_start_outside_grid() {
        let config = GameConfig {
            grid_size: 2,
            start: Position::new(2, 0),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.contains("outside"));
    }

    #[test]
    fn test_rejects_non_finite_reward() {
        let config = GameConfig {
            step_penalty: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
