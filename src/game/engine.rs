use rand::seq::SliceRandom;
use rand::Rng;
use tracing::error;

use super::{
    action::Direction,
    config::GameConfig,
    state::{CollisionType, GameState, Position, Snake},
};
use crate::error::{Result, SnakeError};

/// What a single step did to the world
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The head moved and the tail followed
    Moved,
    /// The head landed on food: the tail stayed, score went up, food moved
    Grew,
    /// The move was fatal; the world was left untouched
    GameOver(CollisionType),
    /// The head landed on the last food: the snake covers the whole grid and
    /// the episode is over
    Filled,
}

impl StepOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, StepOutcome::GameOver(_) | StepOutcome::Filled)
    }
}

/// Deterministic Snake simulation on a square grid
///
/// All randomness (food placement) is drawn from the caller's generator so a
/// training driver can share one seeded source across the whole run.
pub struct GridWorld {
    config: GameConfig,
    state: GameState,
}

impl GridWorld {
    /// Create a world with a fresh episode already set up
    pub fn new<R: Rng + ?Sized>(config: GameConfig, rng: &mut R) -> Result<Self> {
        config.validate().map_err(SnakeError::InvalidConfig)?;

        let snake = Snake::new(config.start);
        let state = GameState::new(snake, config.start, config.grid_size);
        let mut world = Self { config, state };
        world.place_food(rng)?;

        Ok(world)
    }

    /// Reset to a length-1 snake on the start cell with score 0 and new food
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let snake = Snake::new(self.config.start);
        self.state = GameState::new(snake, self.config.start, self.config.grid_size);
        self.place_food(rng)
    }

    /// Move the food to a cell chosen uniformly among those the snake does
    /// not occupy
    pub fn place_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        let size = self.config.grid_size as i32;
        let empty: Vec<Position> = (0..size)
            .flat_map(|row| (0..size).map(move |col| Position::new(row, col)))
            .filter(|pos| !self.state.is_occupied_by_snake(*pos))
            .collect();

        match empty.choose(rng) {
            Some(cell) => {
                self.state.food = *cell;
                Ok(())
            }
            None => {
                error!(
                    grid_size = self.config.grid_size,
                    "snake fills the grid, no cell left for food"
                );
                Err(SnakeError::NoSpaceAvailable {
                    grid_size: self.config.grid_size,
                })
            }
        }
    }

    /// Execute one step of the game in the given absolute direction
    ///
    /// Self-collision is checked before wall collision, against every body
    /// cell behind the head including the current tail. A fatal move leaves
    /// body and score as they were.
    pub fn step<R: Rng + ?Sized>(&mut self, direction: Direction, rng: &mut R) -> Result<StepOutcome> {
        if let Some(collision) = self.state.game_over {
            return Ok(StepOutcome::GameOver(collision));
        }
        if self.state.grid_filled {
            return Ok(StepOutcome::Filled);
        }

        let new_head = self.state.snake.head().moved_in_direction(direction);

        if let Some(collision) = self.check_collision(new_head) {
            self.state.game_over = Some(collision);
            return Ok(StepOutcome::GameOver(collision));
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.advance(new_head, ate_food);
        self.state.steps += 1;

        if ate_food {
            self.state.score += 1;
            match self.place_food(rng) {
                Ok(()) => Ok(StepOutcome::Grew),
                Err(SnakeError::NoSpaceAvailable { .. }) => {
                    self.state.grid_filled = true;
                    Ok(StepOutcome::Filled)
                }
                Err(err) => Err(err),
            }
        } else {
            Ok(StepOutcome::Moved)
        }
    }

    /// Read-only view for encoders and renderers
    pub fn snapshot(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Direct access for setting up positions in tests
    #[cfg(test)]
    pub(crate) fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    fn check_collision(&self, pos: Position) -> Option<CollisionType> {
        if self.state.snake.collides_with_body(pos) {
            return Some(CollisionType::SelfCollision);
        }

        if !self.state.is_in_bounds(pos) {
            return Some(CollisionType::Wall);
        }

        None
    }
}
