//! Snake Q-learning - a grid Snake game with a tabular Q-learning agent
//!
//! This library provides:
//! - Core game logic (game module)
//! - State encoding, state-space enumeration and Q-learning (rl module)
//! - Training statistics and persisted high scores (metrics module)
//! - TUI rendering and keyboard input (render, input modules)
//! - Execution modes: human, train, evaluate, visualize, curve, states

pub mod error;
pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod rl;

pub use error::{Result, SnakeError};
