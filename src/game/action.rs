use serde::{Deserialize, Serialize};

/// Absolute direction the snake can move in
///
/// Deltas follow the (row, col) convention: moving down increases the row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Returns true if turning from self to other would be a 180-degree turn
    pub fn is_opposite(&self, other: Direction) -> bool {
        self.opposite() == other
    }

    /// Returns the (row, col) delta for moving in this direction
    pub fn delta(&self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    /// The direction pointing the other way
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Quarter turn counter-clockwise, as seen from above the grid
    pub fn turned_left(&self) -> Direction {
        match self {
            Direction::Up => Direction::Left,
            Direction::Left => Direction::Down,
            Direction::Down => Direction::Right,
            Direction::Right => Direction::Up,
        }
    }

    /// Quarter turn clockwise
    pub fn turned_right(&self) -> Direction {
        match self {
            Direction::Up => Direction::Right,
            Direction::Right => Direction::Down,
            Direction::Down => Direction::Left,
            Direction::Left => Direction::Up,
        }
    }

    /// Direction of a unit step `(d_row, d_col)`.
    ///
    /// Anything that is not a vertical unit step resolves horizontally, so
    /// callers must only pass deltas between adjacent cells.
    pub fn from_delta(d_row: i32, d_col: i32) -> Direction {
        match (d_row, d_col) {
            (-1, _) => Direction::Up,
            (1, _) => Direction::Down,
            (_, 1) => Direction::Right,
            _ => Direction::Left,
        }
    }
}

/// Move relative to the snake's current heading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Action {
    TurnLeft,
    GoStraight,
    TurnRight,
    TurnAround,
}

impl Action {
    /// Full action set, in value-row order
    pub const ALL: [Action; 4] = [
        Action::TurnLeft,
        Action::GoStraight,
        Action::TurnRight,
        Action::TurnAround,
    ];

    /// Position of this action inside an action-value row
    pub fn index(&self) -> usize {
        match self {
            Action::TurnLeft => 0,
            Action::GoStraight => 1,
            Action::TurnRight => 2,
            Action::TurnAround => 3,
        }
    }

    /// Map the relative action onto an absolute direction given the
    /// current heading. Total and pure.
    pub fn resolve(&self, current: Direction) -> Direction {
        match self {
            Action::TurnLeft => current.turned_left(),
            Action::GoStraight => current,
            Action::TurnRight => current.turned_right(),
            Action::TurnAround => current.opposite(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Action::TurnLeft => "turn_left",
            Action::GoStraight => "go_straight",
            Action::TurnRight => "turn_right",
            Action::TurnAround => "turn_around",
        }
    }
}
