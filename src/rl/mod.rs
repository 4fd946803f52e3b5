//! Tabular Q-learning for the grid world
//!
//! Provides:
//! - Order-independent state keys and the full state enumeration
//! - The action-value table and the epsilon-greedy agent
//! - The training/evaluation episode loop
//! - JSON persistence of trained tables

pub mod agent;
pub mod config;
pub mod encoder;
pub mod persistence;
pub mod q_table;
pub mod state_space;
pub mod trainer;

pub use agent::QLearningAgent;
pub use config::{AgentConfig, ExplorationSchedule};
pub use encoder::{current_direction, StateKey};
pub use persistence::{JsonTableStore, StoredTable, TableMetadata, TableStore};
pub use q_table::{ActionValues, QTable};
pub use state_space::{count_states_by_length, enumerate_states};
pub use trainer::{EpisodeEnd, EpisodeSummary, Learning, Trainer, Transition};
