pub mod curve;
pub mod evaluate;
pub mod human;
pub mod states;
pub mod train;
pub mod visualize;

pub use curve::{CurveConfig, CurveMode, CurveReport, CurveRun};
pub use evaluate::{EvaluateConfig, EvaluateMode, EvaluationReport};
pub use human::HumanMode;
pub use states::{LengthCount, StatesReport};
pub use train::{TrainConfig, TrainMode, TrainOutcome};
pub use visualize::{VisualizationSpeed, VisualizeConfig, VisualizeMode};

use rand::rngs::StdRng;
use rand::SeedableRng;

/// The random source for one driver run: seeded when a seed is given,
/// otherwise from OS entropy
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    seed.map_or_else(StdRng::from_entropy, StdRng::seed_from_u64)
}
