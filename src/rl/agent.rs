//! Epsilon-greedy tabular Q-learning agent

use rand::seq::SliceRandom;
use rand::Rng;

use super::config::AgentConfig;
use super::encoder::StateKey;
use super::q_table::{ActionValues, QTable};
use crate::error::{Result, SnakeError};
use crate::game::Action;

/// Tabular agent: an action-value table plus the rules to act on and learn it
#[derive(Debug, Clone)]
pub struct QLearningAgent {
    table: QTable,
    config: AgentConfig,
}

impl QLearningAgent {
    /// Create an agent around an existing table
    pub fn new(config: AgentConfig, table: QTable) -> Result<Self> {
        config.validate().map_err(SnakeError::InvalidConfig)?;
        Ok(Self { table, config })
    }

    /// Create an agent whose table holds a zero row for every state of the grid
    pub fn prepopulated(config: AgentConfig) -> Result<Self> {
        config.validate().map_err(SnakeError::InvalidConfig)?;
        let table = QTable::prepopulated(config.grid_size);
        Ok(Self { table, config })
    }

    /// Epsilon-greedy action selection
    ///
    /// With probability `epsilon` any action is drawn uniformly. Otherwise the
    /// maximizers of the state's row are drawn uniformly; a state that is not
    /// in the table reads as an all-zero row, so every action ties.
    pub fn choose_action<R: Rng + ?Sized>(&self, state: &StateKey, epsilon: f64, rng: &mut R) -> Action {
        if rng.gen::<f64>() < epsilon {
            return random_action(rng);
        }

        let row = self.table.get(state).copied().unwrap_or_default();
        let best = row.best_actions();
        best.choose(rng).copied().unwrap_or_else(|| random_action(rng))
    }

    /// Revise the value of `action` in `state`.
    ///
    /// `new = old + lr * (reward + max_a Q(next_state, a) - old)`, with no
    /// discount on the future term. Returns the stored value.
    pub fn update_value(
        &mut self,
        state: &StateKey,
        action: Action,
        reward: f64,
        next_state: &StateKey,
    ) -> f64 {
        let max_future = self.table.max_value(next_state);
        let learning_rate = self.config.learning_rate;

        let row = self.table.row_mut(state);
        let old = row.get(action);
        let new = old + learning_rate * (reward + max_future - old);
        row.set(action, new);
        new
    }

    /// Row for a state, if the table has one
    pub fn values(&self, state: &StateKey) -> Option<&ActionValues> {
        self.table.get(state)
    }

    pub fn table(&self) -> &QTable {
        &self.table
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn into_table(self) -> QTable {
        self.table
    }
}

fn random_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
    Action::ALL[rng.gen_range(0..Action::ALL.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Position};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn key(head: Position, food: Position) -> StateKey {
        StateKey::new(head, Direction::Right, &[head], food)
    }

    fn agent_with(table: QTable) -> QLearningAgent {
        QLearningAgent::new(AgentConfig::default(), table).unwrap()
    }

    fn tally(agent: &QLearningAgent, state: &StateKey, epsilon: f64, trials: usize) -> HashMap<Action, usize> {
        let mut rng = StdRng::seed_from_u64(42);
        let mut counts = HashMap::new();
        for _ in 0..trials {
            *counts.entry(agent.choose_action(state, epsilon, &mut rng)).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = AgentConfig::default();
        config.learning_rate = -1.0;
        assert!(matches!(
            QLearningAgent::new(config, QTable::new()),
            Err(SnakeError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_full_exploration_is_uniform() {
        let state = key(Position::new(1, 1), Position::new(0, 0));
        let mut table = QTable::new();
        // A strong preference that exploration must ignore
        table.insert(state.clone(), ActionValues::new([0.0, 100.0, 0.0, 0.0]));
        let agent = agent_with(table);

        let counts = tally(&agent, &state, 1.0, 8000);

        for action in Action::ALL {
            let n = counts.get(&action).copied().unwrap_or(0);
            assert!((1700..=2300).contains(&n), "{:?} drawn {} times", action, n);
        }
    }

    #[test]
    fn test_greedy_picks_maximum() {
        let state = key(Position::new(1, 1), Position::new(0, 0));
        let mut table = QTable::new();
        table.insert(state.clone(), ActionValues::new([0.5, -1.0, 2.0, 1.9]));
        let agent = agent_with(table);

        let counts = tally(&agent, &state, 0.0, 500);
        assert_eq!(counts.get(&Action::TurnRight), Some(&500));
    }

    #[test]
    fn test_greedy_breaks_ties_uniformly() {
        let state = key(Position::new(1, 1), Position::new(0, 0));
        let mut table = QTable::new();
        table.insert(state.clone(), ActionValues::new([3.0, -1.0, 0.0, 3.0]));
        let agent = agent_with(table);

        let counts = tally(&agent, &state, 0.0, 4000);

        assert_eq!(counts.len(), 2);
        let left = counts[&Action::TurnLeft];
        let around = counts[&Action::TurnAround];
        assert_eq!(left + around, 4000);
        assert!((1700..=2300).contains(&left), "turn_left drawn {} times", left);
    }

    #[test]
    fn test_unknown_state_falls_back_to_random() {
        let agent = agent_with(QTable::new());
        let state = key(Position::new(2, 2), Position::new(0, 0));

        let counts = tally(&agent, &state, 0.0, 4000);
        assert_eq!(counts.len(), 4);
    }

    #[test]
    fn test_update_rule() {
        let state = key(Position::new(1, 1), Position::new(0, 0));
        let next = key(Position::new(0, 1), Position::new(0, 0));
        let mut table = QTable::new();
        table.insert(state.clone(), ActionValues::new([0.0, 0.5, 0.0, 0.0]));
        table.insert(next.clone(), ActionValues::new([1.0, 2.0, -3.0, 0.0]));
        let mut agent = agent_with(table);

        let old = 0.5;
        let lr = 0.2;
        let reward = -0.1;
        let max_future = 2.0;
        let expected = old + lr * (reward + max_future - old);

        let stored = agent.update_value(&state, Action::GoStraight, reward, &next);

        assert_eq!(stored, expected);
        assert_eq!(agent.table().value(&state, Action::GoStraight), expected);
        // Other actions are untouched
        assert_eq!(agent.table().value(&state, Action::TurnLeft), 0.0);
    }

    #[test]
    fn test_update_initialises_missing_state() {
        let state = key(Position::new(1, 1), Position::new(0, 0));
        let next = key(Position::new(1, 2), Position::new(0, 0));
        let mut agent = agent_with(QTable::new());

        let stored = agent.update_value(&state, Action::TurnLeft, 10.0, &next);

        assert_eq!(stored, 0.2 * 10.0);
        let row = agent.values(&state).unwrap();
        assert_eq!(row.get(Action::GoStraight), 0.0);
        assert_eq!(row.get(Action::TurnRight), 0.0);
        assert_eq!(row.get(Action::TurnAround), 0.0);
        // The unseen next state is not inserted
        assert!(agent.values(&next).is_none());
    }

    #[test]
    fn test_terminal_self_loop_update() {
        let state = key(Position::new(1, 0), Position::new(0, 0));
        let mut table = QTable::new();
        table.insert(state.clone(), ActionValues::new([0.0, 0.0, 1.0, 0.0]));
        let mut agent = agent_with(table);

        // next_state == state: the future term reads the row before the write
        let stored = agent.update_value(&state, Action::GoStraight, -10.0, &state);
        assert_eq!(stored, 0.0 + 0.2 * (-10.0 + 1.0 - 0.0));
    }
}
