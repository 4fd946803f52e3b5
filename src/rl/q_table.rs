use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::encoder::StateKey;
use super::state_space::enumerate_states;
use crate::game::Action;

/// Value estimates for every action from one state
///
/// Indexed by [`Action::index`]; every action always has an entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ActionValues([f64; 4]);

impl ActionValues {
    pub fn new(values: [f64; 4]) -> Self {
        Self(values)
    }

    pub fn get(&self, action: Action) -> f64 {
        self.0[action.index()]
    }

    pub fn set(&mut self, action: Action, value: f64) {
        self.0[action.index()] = value;
    }

    /// Largest value in the row
    pub fn max(&self) -> f64 {
        self.0.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Every action whose value equals the row maximum
    pub fn best_actions(&self) -> Vec<Action> {
        let max = self.max();
        Action::ALL
            .into_iter()
            .filter(|action| self.get(*action) == max)
            .collect()
    }

    pub fn as_array(&self) -> &[f64; 4] {
        &self.0
    }
}

/// Mapping from state key to action-value row
///
/// States that were never stored read as an all-zero row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QTable {
    rows: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding a zero row for every enumerated state of the grid
    pub fn prepopulated(grid_size: usize) -> Self {
        enumerate_states(grid_size)
            .into_iter()
            .map(|state| (state, ActionValues::default()))
            .collect()
    }

    pub fn get(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// Row for `state`, inserting a zero row when absent
    pub fn row_mut(&mut self, state: &StateKey) -> &mut ActionValues {
        self.rows.entry(state.clone()).or_default()
    }

    pub fn insert(&mut self, state: StateKey, values: ActionValues) {
        self.rows.insert(state, values);
    }

    /// Stored value, or 0.0 for an unknown state
    pub fn value(&self, state: &StateKey, action: Action) -> f64 {
        self.rows.get(state).map_or(0.0, |row| row.get(action))
    }

    /// Best value reachable from `state`, or 0.0 for an unknown state
    pub fn max_value(&self, state: &StateKey) -> f64 {
        self.rows.get(state).map_or(0.0, ActionValues::max)
    }

    pub fn contains(&self, state: &StateKey) -> bool {
        self.rows.contains_key(state)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StateKey, &ActionValues)> {
        self.rows.iter()
    }

    /// Number of rows holding at least one non-zero value
    pub fn visited_len(&self) -> usize {
        self.rows
            .values()
            .filter(|row| row.as_array().iter().any(|v| *v != 0.0))
            .count()
    }
}

impl FromIterator<(StateKey, ActionValues)> for QTable {
    fn from_iter<I: IntoIterator<Item = (StateKey, ActionValues)>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}
