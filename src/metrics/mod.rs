pub mod game_metrics;
pub mod high_score;
pub mod training_stats;

pub use game_metrics::GameMetrics;
pub use high_score::{FileHighScore, HighScoreStore};
pub use training_stats::{moving_average, TrainingStats};
