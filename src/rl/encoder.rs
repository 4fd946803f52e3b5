//! Canonical state keys for the value table
//!
//! A key is `(head, heading, body cells, food)`. The body is stored as a
//! sorted cell set, so two snakes covering the same cells with the same head
//! and heading share a key. The state-space enumerator relies on exactly this
//! encoding: it emits one key per (shape, head, heading) and never an ordered
//! body, so keeping the body ordered here would silently change the size of
//! the state space.

use serde::{Deserialize, Serialize};

use crate::game::{Direction, GameState, Position};

/// Hashable learning state derived from a game snapshot
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateKey {
    pub head: Position,
    pub direction: Direction,
    /// Body cells in row-major order, head included
    pub body: Vec<Position>,
    pub food: Position,
}

impl StateKey {
    /// Build a key from parts, sorting the body into canonical order
    pub fn new(head: Position, direction: Direction, body: &[Position], food: Position) -> Self {
        let mut body = body.to_vec();
        body.sort_unstable();
        Self {
            head,
            direction,
            body,
            food,
        }
    }

    /// Encode the current snapshot of a grid world
    pub fn encode(state: &GameState) -> Self {
        let body = &state.snake.body;
        Self::new(state.snake.head(), current_direction(body), body, state.food)
    }

    pub fn snake_len(&self) -> usize {
        self.body.len()
    }
}

/// Heading of the snake: the vector from the neck to the head.
///
/// A length-1 snake has no neck and is treated as facing right. This is a
/// fixed convention, not something derived from the body.
pub fn current_direction(body: &[Position]) -> Direction {
    match body {
        [head, neck, ..] => Direction::from_delta(head.row - neck.row, head.col - neck.col),
        _ => Direction::Right,
    }
}
