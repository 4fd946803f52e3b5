//! Episode driver tying the grid world to the agent
//!
//! Each step: encode the snapshot, pick an action, resolve it against the
//! current heading, step the world, and (when learning) feed the reward back.
//! A collision ends the episode with the death penalty and a self-loop
//! update (`next_state = state`). Filling the grid ends it the same way,
//! since there is no food left to chase. A step cap guards against greedy
//! policies that circle forever.

use rand::Rng;
use tracing::{debug, trace};

use super::agent::QLearningAgent;
use super::encoder::{current_direction, StateKey};
use crate::error::{Result, SnakeError};
use crate::game::{Action, CollisionType, Direction, GameConfig, GridWorld, StepOutcome};

/// Whether a step may write to the value table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Learning {
    Enabled,
    Disabled,
}

/// One agent-environment interaction
#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub state: StateKey,
    pub action: Action,
    pub direction: Direction,
    pub outcome: StepOutcome,
    pub reward: f64,
}

/// Why an episode stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EpisodeEnd {
    Collision(CollisionType),
    /// The snake covered every cell
    GridFilled,
    StepLimit,
}

/// Result of one full episode
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeSummary {
    pub score: u32,
    /// Transitions taken, the fatal one included
    pub steps: usize,
    pub total_reward: f64,
    pub end: EpisodeEnd,
}

/// Training and evaluation loop over one grid world and one agent
///
/// Owns the single random source used for food placement, exploration and
/// tie-breaking.
pub struct Trainer<R: Rng> {
    agent: QLearningAgent,
    world: GridWorld,
    rng: R,
    max_steps: usize,
    /// The world still holds the episode set up by `new`, untouched
    fresh: bool,
}

impl<R: Rng> Trainer<R> {
    pub fn new(game_config: GameConfig, agent: QLearningAgent, mut rng: R, max_steps: usize) -> Result<Self> {
        if max_steps == 0 {
            return Err(SnakeError::InvalidConfig(
                "max_steps must be at least 1".to_string(),
            ));
        }

        if agent.config().grid_size != game_config.grid_size {
            return Err(SnakeError::GridSizeMismatch {
                expected: game_config.grid_size,
                found: agent.config().grid_size,
            });
        }

        let world = GridWorld::new(game_config, &mut rng)?;

        Ok(Self {
            agent,
            world,
            rng,
            max_steps,
            fresh: true,
        })
    }

    /// Start a fresh episode: reset the world and place food
    pub fn reset(&mut self) -> Result<()> {
        self.fresh = false;
        self.world.reset(&mut self.rng)
    }

    /// Take one step from the current snapshot.
    ///
    /// Must only be called while the episode is live; call [`reset`](Self::reset)
    /// after a terminal transition.
    pub fn advance(&mut self, epsilon: f64, learning: Learning) -> Result<Transition> {
        self.fresh = false;
        let state = StateKey::encode(self.world.snapshot());
        let action = self.agent.choose_action(&state, epsilon, &mut self.rng);
        let direction = action.resolve(current_direction(&self.world.snapshot().snake.body));

        let outcome = self.world.step(direction, &mut self.rng)?;
        let rewards = self.world.config();
        let (reward, next_state) = match outcome {
            StepOutcome::Moved => (rewards.step_penalty, StateKey::encode(self.world.snapshot())),
            StepOutcome::Grew => (rewards.food_reward, StateKey::encode(self.world.snapshot())),
            StepOutcome::GameOver(_) | StepOutcome::Filled => (rewards.death_penalty, state.clone()),
        };
        trace!(action = action.name(), ?direction, ?outcome, reward, "step");

        if learning == Learning::Enabled {
            self.agent.update_value(&state, action, reward, &next_state);
        }

        Ok(Transition {
            state,
            action,
            direction,
            outcome,
            reward,
        })
    }

    /// Run one episode from a fresh world until it ends or hits the step cap
    pub fn run_episode(&mut self, epsilon: f64, learning: Learning) -> Result<EpisodeSummary> {
        // The first episode plays the world built by `new`
        if !self.fresh {
            self.reset()?;
        }
        self.fresh = false;

        let mut steps = 0;
        let mut total_reward = 0.0;

        let end = loop {
            let transition = self.advance(epsilon, learning)?;
            steps += 1;
            total_reward += transition.reward;

            match transition.outcome {
                StepOutcome::GameOver(collision) => break EpisodeEnd::Collision(collision),
                StepOutcome::Filled => break EpisodeEnd::GridFilled,
                StepOutcome::Moved | StepOutcome::Grew => {}
            }
            if steps >= self.max_steps {
                break EpisodeEnd::StepLimit;
            }
        };

        let summary = EpisodeSummary {
            score: self.world.snapshot().score,
            steps,
            total_reward,
            end,
        };
        debug!(?summary, epsilon, "episode finished");

        Ok(summary)
    }

    /// Episode that explores with `epsilon` and learns from every step
    pub fn train_episode(&mut self, epsilon: f64) -> Result<EpisodeSummary> {
        self.run_episode(epsilon, Learning::Enabled)
    }

    /// Greedy episode that leaves the table untouched
    pub fn evaluate_episode(&mut self) -> Result<EpisodeSummary> {
        self.run_episode(0.0, Learning::Disabled)
    }

    pub fn world(&self) -> &GridWorld {
        &self.world
    }

    pub fn agent(&self) -> &QLearningAgent {
        &self.agent
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// Give back the agent and the random source, e.g. to reuse the source
    /// for another run
    pub fn into_parts(self) -> (QLearningAgent, R) {
        (self.agent, self.rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Position;
    use crate::rl::{AgentConfig, QTable};
    use rand::rngs::mock::StepRng;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn empty_agent(grid_size: usize) -> QLearningAgent {
        QLearningAgent::new(AgentConfig::new(grid_size), QTable::new()).unwrap()
    }

    /// Zero-valued source: food on the first free cell, no exploration at
    /// epsilon 0, ties resolved to the first maximizer
    fn zero_rng() -> StepRng {
        StepRng::new(0, 0)
    }

    #[test]
    fn test_rejects_mismatched_grid() {
        let result = Trainer::new(GameConfig::new(3), empty_agent(4), zero_rng(), 10);
        assert!(matches!(result, Err(SnakeError::GridSizeMismatch { .. })));
    }

    #[test]
    fn test_rejects_zero_step_cap() {
        let result = Trainer::new(GameConfig::new(3), empty_agent(3), zero_rng(), 0);
        assert!(matches!(result, Err(SnakeError::InvalidConfig(_))));
    }

    #[test]
    fn test_scripted_training_episode() {
        let mut trainer = Trainer::new(GameConfig::new(3), empty_agent(3), zero_rng(), 50).unwrap();

        // All-zero rows tie, so the first action (turn_left) wins every time.
        // A length-1 snake counts as facing right: up to (0,1), then up into the wall.
        let summary = trainer.train_episode(0.0).unwrap();

        assert_eq!(summary.end, EpisodeEnd::Collision(CollisionType::Wall));
        assert_eq!(summary.steps, 2);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.total_reward, -0.1 + -10.0);

        let food = Position::new(0, 0);
        let first = StateKey::new(Position::new(1, 1), Direction::Right, &[Position::new(1, 1)], food);
        let second = StateKey::new(Position::new(0, 1), Direction::Right, &[Position::new(0, 1)], food);

        let table = trainer.agent().table();
        assert_eq!(table.value(&first, Action::TurnLeft), 0.0 + 0.2 * (-0.1 + 0.0 - 0.0));
        assert_eq!(table.value(&second, Action::TurnLeft), 0.0 + 0.2 * (-10.0 + 0.0 - 0.0));
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_advance_reports_growth() {
        let mut trainer = Trainer::new(GameConfig::new(3), empty_agent(3), zero_rng(), 50).unwrap();
        assert_eq!(trainer.world().snapshot().food, Position::new(0, 0));

        // turn_left from the default right heading: (1,1) -> (0,1)
        let first = trainer.advance(0.0, Learning::Enabled).unwrap();
        assert_eq!(first.direction, Direction::Up);
        assert_eq!(first.outcome, StepOutcome::Moved);
        assert_eq!(first.reward, -0.1);

        // The up-left corner (0,0) holds the food. Steer there by making
        // turn_left unattractive from the new state.
        let state = StateKey::encode(trainer.world().snapshot());
        trainer.agent.update_value(&state, Action::TurnLeft, -100.0, &state);
        trainer.agent.update_value(&state, Action::GoStraight, -100.0, &state);
        trainer.agent.update_value(&state, Action::TurnRight, -100.0, &state);

        let second = trainer.advance(0.0, Learning::Enabled).unwrap();
        assert_eq!(second.action, Action::TurnAround);
        assert_eq!(second.direction, Direction::Left);
        assert_eq!(second.outcome, StepOutcome::Grew);
        assert_eq!(second.reward, 10.0);
        assert_eq!(trainer.world().snapshot().score, 1);
        assert_eq!(trainer.world().snapshot().snake.len(), 2);
    }

    #[test]
    fn test_filling_the_grid_ends_episode() {
        let mut trainer = Trainer::new(GameConfig::new(2), empty_agent(2), zero_rng(), 50).unwrap();
        // Three cells taken, heading up, food on the last free cell to the left
        let setup = trainer.world.state_mut();
        setup.snake.body = vec![Position::new(0, 1), Position::new(1, 1), Position::new(1, 0)];
        setup.food = Position::new(0, 0);
        let state = StateKey::encode(trainer.world().snapshot());
        for action in [Action::GoStraight, Action::TurnRight, Action::TurnAround] {
            trainer.agent.update_value(&state, action, -100.0, &state);
        }

        let transition = trainer.advance(0.0, Learning::Enabled).unwrap();

        assert_eq!(transition.action, Action::TurnLeft);
        assert_eq!(transition.direction, Direction::Left);
        assert_eq!(transition.outcome, StepOutcome::Filled);
        assert_eq!(transition.reward, -10.0);
        // Terminal self-loop: the future term read the row's own maximum (0)
        assert_eq!(
            trainer.agent().table().value(&state, Action::TurnLeft),
            0.2 * (-10.0 + 0.0 - 0.0)
        );
        assert!(!trainer.world().snapshot().is_alive());
    }

    #[test]
    fn test_two_by_two_training_survives_full_grids() {
        let agent = QLearningAgent::prepopulated(AgentConfig::new(2)).unwrap();
        let mut trainer =
            Trainer::new(GameConfig::new(2), agent, StdRng::seed_from_u64(7), 200).unwrap();

        let mut filled = 0;
        for _ in 0..2000 {
            if trainer.train_episode(0.1).unwrap().end == EpisodeEnd::GridFilled {
                filled += 1;
            }
        }

        assert!(filled > 0);
    }

    #[test]
    fn test_first_episode_plays_initial_world() {
        let mut trainer =
            Trainer::new(GameConfig::new(3), empty_agent(3), StdRng::seed_from_u64(21), 1).unwrap();
        let initial_food = trainer.world().snapshot().food;

        trainer.train_episode(1.0).unwrap();

        // The single learned row is the start state with the food placed by `new`
        let rows: Vec<&StateKey> = trainer.agent().table().iter().map(|(key, _)| key).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].head, Position::new(1, 1));
        assert_eq!(rows[0].food, initial_food);
    }

    #[test]
    fn test_step_cap_truncates() {
        let mut trainer = Trainer::new(GameConfig::new(3), empty_agent(3), zero_rng(), 1).unwrap();
        let summary = trainer.train_episode(0.0).unwrap();

        assert_eq!(summary.end, EpisodeEnd::StepLimit);
        assert_eq!(summary.steps, 1);
    }

    #[test]
    fn test_evaluation_leaves_table_untouched() {
        let rng = StdRng::seed_from_u64(3);
        let agent = QLearningAgent::prepopulated(AgentConfig::new(3)).unwrap();
        let mut trainer = Trainer::new(GameConfig::new(3), agent, rng, 100).unwrap();

        for _ in 0..20 {
            trainer.train_episode(0.3).unwrap();
        }
        let before = trainer.agent().table().clone();

        for _ in 0..20 {
            trainer.evaluate_episode().unwrap();
        }

        assert_eq!(trainer.agent().table(), &before);
    }

    #[test]
    fn test_training_stays_inside_enumerated_space() {
        let rng = StdRng::seed_from_u64(17);
        let agent = QLearningAgent::prepopulated(AgentConfig::new(3)).unwrap();
        let states = agent.table().len();
        let mut trainer = Trainer::new(GameConfig::new(3), agent, rng, 200).unwrap();

        for _ in 0..300 {
            trainer.train_episode(0.2).unwrap();
        }

        // Every visited state was already a row of the table
        assert_eq!(trainer.agent().table().len(), states);
        assert!(trainer.agent().table().visited_len() > 0);
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let run = || {
            let agent = QLearningAgent::new(AgentConfig::new(3), QTable::new()).unwrap();
            let mut trainer =
                Trainer::new(GameConfig::new(3), agent, StdRng::seed_from_u64(99), 100).unwrap();
            (0..50)
                .map(|_| trainer.train_episode(0.1).unwrap().score)
                .collect::<Vec<_>>()
        };

        assert_eq!(run(), run());
    }
}
