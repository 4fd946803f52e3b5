use thiserror::Error;

/// Errors raised by the simulation and learning core
///
/// Collisions are not errors: they are reported through
/// [`StepOutcome::GameOver`](crate::game::StepOutcome::GameOver).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnakeError {
    /// A configuration value was rejected at construction time
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Every cell is occupied by the snake, so no food can be placed.
    /// `GridWorld::step` reports this as `StepOutcome::Filled`.
    #[error("no free cell left to place food on a {grid_size}x{grid_size} grid")]
    NoSpaceAvailable { grid_size: usize },

    /// A persisted value table was built for a different grid
    #[error("value table was built for a {found}x{found} grid, expected {expected}x{expected}")]
    GridSizeMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, SnakeError>;
