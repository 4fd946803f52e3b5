use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use snake_qlearning::game::GameConfig;
use snake_qlearning::metrics::FileHighScore;
use snake_qlearning::modes::{
    CurveConfig, CurveMode, EvaluateConfig, EvaluateMode, HumanMode, StatesReport, TrainConfig,
    TrainMode, VisualizeConfig, VisualizeMode,
};
use snake_qlearning::rl::{AgentConfig, ExplorationSchedule, JsonTableStore};

#[derive(Parser)]
#[command(name = "snake_qlearning")]
#[command(version, about = "Grid Snake with a tabular Q-learning agent")]
struct Cli {
    #[arg(long, value_enum, default_value = "human")]
    mode: Mode,

    /// Side length of the square grid
    #[arg(long, default_value_t = 3)]
    grid_size: usize,

    /// Value table file
    #[arg(long, default_value = "models/q_table.json")]
    table: PathBuf,

    /// High score file
    #[arg(long, default_value = "high_score.txt")]
    high_score: PathBuf,

    /// Episodes to train, evaluate or record per curve run
    #[arg(long, default_value_t = 1000)]
    episodes: usize,

    /// Step cap per episode
    #[arg(long, default_value_t = 200)]
    max_steps: usize,

    #[arg(long, default_value_t = 0.2)]
    learning_rate: f64,

    /// Exploration rate for the first episode
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// Exploration floor (defaults to --epsilon, i.e. no decay)
    #[arg(long)]
    epsilon_end: Option<f64>,

    /// Per-episode multiplicative exploration decay
    #[arg(long, default_value_t = 1.0)]
    epsilon_decay: f64,

    /// Training epsilons compared by the curve mode
    #[arg(long, value_delimiter = ',', default_value = "0.0,1.0,0.1")]
    curve_epsilons: Vec<f64>,

    /// Moving-average window of the curve mode
    #[arg(long, default_value_t = 50)]
    curve_window: usize,

    /// Where the curve mode writes its JSON report
    #[arg(long, default_value = "reports/learning_curve.json")]
    curve_output: PathBuf,

    /// Seed for all randomness (curve mode defaults to 42)
    #[arg(long)]
    seed: Option<u64>,

    /// Save a checkpoint every N training episodes (0 disables)
    #[arg(long, default_value_t = 0)]
    checkpoint_frequency: usize,

    /// Log training progress every N episodes
    #[arg(long, default_value_t = 100)]
    log_frequency: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Mode {
    /// Play snake with keyboard controls
    Human,
    /// Train the Q-learning agent
    Train,
    /// Score the greedy policy of a trained table
    Evaluate,
    /// Watch a trained agent play
    Visualize,
    /// Record learning curves for several exploration rates
    Curve,
    /// Report the size of the state space
    States,
}

impl Mode {
    fn is_interactive(self) -> bool {
        matches!(self, Mode::Human | Mode::Visualize)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Keep the terminal UI clean unless RUST_LOG asks for more
    let default_filter = if cli.mode.is_interactive() {
        "snake_qlearning=warn"
    } else {
        "snake_qlearning=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let game_config = GameConfig::new(cli.grid_size);
    let store = JsonTableStore::new(&cli.table);
    let high_scores = FileHighScore::new(&cli.high_score);

    match cli.mode {
        Mode::Human => {
            let mut human_mode = HumanMode::new(game_config, high_scores, cli.seed)?;
            human_mode.run().await?;
        }
        Mode::Train => {
            let agent_config = AgentConfig {
                learning_rate: cli.learning_rate,
                grid_size: cli.grid_size,
                exploration: ExplorationSchedule {
                    start: cli.epsilon,
                    end: cli.epsilon_end.unwrap_or(cli.epsilon),
                    decay: cli.epsilon_decay,
                },
            };
            let config = TrainConfig {
                episodes: cli.episodes,
                max_steps: cli.max_steps,
                checkpoint_frequency: cli.checkpoint_frequency,
                log_frequency: cli.log_frequency,
                seed: cli.seed,
                game_config,
                agent_config,
            };
            let outcome = TrainMode::new(config, store).run()?;
            println!(
                "Trained {} episodes in total, table saved to {:?}",
                outcome.episodes_trained, cli.table
            );
            println!("{}", outcome.stats.format_summary());
        }
        Mode::Evaluate => {
            let config = EvaluateConfig {
                episodes: cli.episodes,
                max_steps: cli.max_steps,
                seed: cli.seed,
                game_config,
            };
            let report = EvaluateMode::new(config, store, high_scores).run()?;
            println!(
                "Episodes: {} | Mean Score: {:.2} | Best Score: {} | Hit step cap: {}",
                report.scores.len(),
                report.mean_score,
                report.best_score,
                report.truncated
            );
            if report.new_high_score {
                println!("New high score: {}", report.best_score);
            }
        }
        Mode::Visualize => {
            let config = VisualizeConfig {
                epsilon: 0.0,
                max_steps: cli.max_steps,
                seed: cli.seed,
                game_config,
            };
            let mut visualize_mode = VisualizeMode::new(config, &store, high_scores)?;
            visualize_mode.run().await?;
        }
        Mode::Curve => {
            let config = CurveConfig {
                epsilons: cli.curve_epsilons,
                episodes: cli.episodes,
                max_steps: cli.max_steps,
                window: cli.curve_window,
                seed: cli.seed.unwrap_or(42),
                learning_rate: cli.learning_rate,
                game_config,
            };
            let report = CurveMode::new(config).run()?;
            report.write_json(&cli.curve_output)?;
            println!("Learning curves written to {:?}", cli.curve_output);
        }
        Mode::States => {
            println!("{}", StatesReport::build(cli.grid_size));
        }
    }

    Ok(())
}
