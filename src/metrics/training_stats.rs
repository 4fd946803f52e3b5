//! Training statistics tracking
//!
//! Rolling windows over episode rewards, step counts and scores, plus the
//! moving-average helper used by learning-curve reports.

use std::collections::VecDeque;

use crate::rl::EpisodeSummary;

/// Training statistics tracker with rolling averages
///
/// # Example
///
/// ```rust
/// use snake_qlearning::metrics::TrainingStats;
///
/// let mut stats = TrainingStats::new(100);
/// stats.record_episode(9.7, 4, 1);
///
/// println!("{}", stats.format_summary());
/// ```
#[derive(Debug, Clone)]
pub struct TrainingStats {
    /// Episode rewards (rolling window)
    episode_rewards: VecDeque<f64>,

    /// Episode lengths in steps (rolling window)
    episode_lengths: VecDeque<usize>,

    /// Episode scores (food eaten) (rolling window)
    episode_scores: VecDeque<u32>,

    /// Best score over the whole run, not just the window
    highest_score: u32,

    total_episodes: usize,
    total_steps: usize,

    /// Window size for rolling averages
    window_size: usize,
}

impl TrainingStats {
    /// Create a tracker keeping the last `window_size` episodes
    ///
    /// # Arguments
    ///
    /// * `window_size` - Episodes kept for rolling averages, at least 1
    pub fn new(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            episode_rewards: VecDeque::with_capacity(window_size),
            episode_lengths: VecDeque::with_capacity(window_size),
            episode_scores: VecDeque::with_capacity(window_size),
            highest_score: 0,
            total_episodes: 0,
            total_steps: 0,
            window_size,
        }
    }

    /// Record the completion of an episode
    ///
    /// # Arguments
    ///
    /// * `reward` - Total reward accumulated during the episode
    /// * `length` - Transitions taken, the final one included
    /// * `score` - Food eaten
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_qlearning::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(2);
    /// stats.record_episode(9.7, 4, 1);
    /// stats.record_episode(-10.5, 6, 0);
    /// stats.record_episode(19.4, 8, 2);
    ///
    /// // Only the last two episodes are averaged
    /// assert_eq!(stats.mean_episode_length(), 7.0);
    /// assert_eq!(stats.highest_score(), 2);
    /// assert_eq!(stats.total_steps(), 18);
    /// ```
    pub fn record_episode(&mut self, reward: f64, length: usize, score: u32) {
        Self::push_deque(&mut self.episode_rewards, reward, self.window_size);
        Self::push_deque(&mut self.episode_lengths, length, self.window_size);
        Self::push_deque(&mut self.episode_scores, score, self.window_size);
        self.highest_score = self.highest_score.max(score);
        self.total_episodes += 1;
        self.total_steps += length;
    }

    /// Record an episode as reported by the trainer
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_qlearning::game::CollisionType;
    /// use snake_qlearning::metrics::TrainingStats;
    /// use snake_qlearning::rl::{EpisodeEnd, EpisodeSummary};
    ///
    /// let mut stats = TrainingStats::new(100);
    /// stats.record_summary(&EpisodeSummary {
    ///     score: 2,
    ///     steps: 14,
    ///     total_reward: 8.7,
    ///     end: EpisodeEnd::Collision(CollisionType::Wall),
    /// });
    ///
    /// assert_eq!(stats.total_episodes(), 1);
    /// assert_eq!(stats.mean_episode_score(), 2.0);
    /// ```
    pub fn record_summary(&mut self, summary: &EpisodeSummary) {
        self.record_episode(summary.total_reward, summary.steps, summary.score);
    }

    pub fn mean_episode_reward(&self) -> f64 {
        if self.episode_rewards.is_empty() {
            0.0
        } else {
            self.episode_rewards.iter().sum::<f64>() / self.episode_rewards.len() as f64
        }
    }

    pub fn mean_episode_length(&self) -> f64 {
        let sum: usize = self.episode_lengths.iter().sum();
        if self.episode_lengths.is_empty() {
            0.0
        } else {
            sum as f64 / self.episode_lengths.len() as f64
        }
    }

    pub fn mean_episode_score(&self) -> f64 {
        let sum: u32 = self.episode_scores.iter().sum();
        if self.episode_scores.is_empty() {
            0.0
        } else {
            sum as f64 / self.episode_scores.len() as f64
        }
    }

    pub fn highest_score(&self) -> u32 {
        self.highest_score
    }

    pub fn total_episodes(&self) -> usize {
        self.total_episodes
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// One-line progress summary
    ///
    /// # Example
    ///
    /// ```rust
    /// use snake_qlearning::metrics::TrainingStats;
    ///
    /// let mut stats = TrainingStats::new(10);
    /// stats.record_episode(0.0, 10, 1);
    /// stats.record_episode(20.0, 15, 3);
    ///
    /// assert_eq!(
    ///     stats.format_summary(),
    ///     "Avg Score: 2.00 | Highest Score: 3 | Avg Steps: 12.5"
    /// );
    /// ```
    pub fn format_summary(&self) -> String {
        format!(
            "Avg Score: {:.2} | Highest Score: {} | Avg Steps: {:.1}",
            self.mean_episode_score(),
            self.highest_score,
            self.mean_episode_length(),
        )
    }

    fn push_deque<T>(deque: &mut VecDeque<T>, value: T, window_size: usize) {
        if deque.len() >= window_size {
            deque.pop_front();
        }
        deque.push_back(value);
    }
}

/// Trailing moving average of `values`.
///
/// Entry `i` averages the last `window` values up to and including `i`;
/// the first `window - 1` entries average everything seen so far.
///
/// ```rust
/// use snake_qlearning::metrics::moving_average;
///
/// let averages = moving_average(&[1.0, 2.0, 3.0, 4.0], 2);
/// assert_eq!(averages, vec![1.0, 1.5, 2.5, 3.5]);
/// ```
pub fn moving_average(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    let mut averages = Vec::with_capacity(values.len());
    let mut sum = 0.0;

    for (i, value) in values.iter().enumerate() {
        sum += value;
        if i >= window {
            sum -= values[i - window];
        }
        let count = (i + 1).min(window);
        averages.push(sum / count as f64);
    }

    averages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::CollisionType;
    use crate::rl::EpisodeEnd;

    #[test]
    fn test_new() {
        let stats = TrainingStats::new(100);
        assert_eq!(stats.window_size(), 100);
        assert_eq!(stats.total_episodes(), 0);
        assert_eq!(stats.total_steps(), 0);
        assert_eq!(stats.highest_score(), 0);
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let mut stats = TrainingStats::new(0);
        stats.record_episode(1.0, 1, 1);
        assert_eq!(stats.window_size(), 1);
        assert_eq!(stats.mean_episode_score(), 1.0);
    }

    #[test]
    fn test_record_episode() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(10.0, 50, 3);

        assert_eq!(stats.total_episodes(), 1);
        assert_eq!(stats.total_steps(), 50);
        assert!((stats.mean_episode_reward() - 10.0).abs() < 1e-9);
        assert!((stats.mean_episode_length() - 50.0).abs() < 1e-9);
        assert!((stats.mean_episode_score() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_rolling_average() {
        let mut stats = TrainingStats::new(3);

        stats.record_episode(1.0, 10, 1);
        stats.record_episode(2.0, 20, 2);
        stats.record_episode(3.0, 30, 3);
        assert!((stats.mean_episode_reward() - 2.0).abs() < 1e-9);

        // A 4th episode evicts the first
        stats.record_episode(4.0, 40, 0);

        assert_eq!(stats.total_episodes(), 4);
        assert!((stats.mean_episode_reward() - 3.0).abs() < 1e-9);
        assert!((stats.mean_episode_score() - 5.0 / 3.0).abs() < 1e-9);
        // The run-wide best survives eviction
        assert_eq!(stats.highest_score(), 3);
        assert_eq!(stats.total_steps(), 100);
    }

    #[test]
    fn test_record_summary() {
        let mut stats = TrainingStats::new(10);
        stats.record_summary(&EpisodeSummary {
            score: 2,
            steps: 7,
            total_reward: 9.4,
            end: EpisodeEnd::Collision(CollisionType::Wall),
        });

        assert_eq!(stats.highest_score(), 2);
        assert_eq!(stats.total_steps(), 7);
    }

    #[test]
    fn test_format_summary() {
        let mut stats = TrainingStats::new(100);
        stats.record_episode(15.5, 150, 5);
        stats.record_episode(-10.0, 25, 0);

        assert_eq!(
            stats.format_summary(),
            "Avg Score: 2.50 | Highest Score: 5 | Avg Steps: 87.5"
        );
    }

    #[test]
    fn test_empty_stats() {
        let stats = TrainingStats::new(100);

        assert_eq!(stats.mean_episode_reward(), 0.0);
        assert_eq!(stats.mean_episode_length(), 0.0);
        assert_eq!(stats.mean_episode_score(), 0.0);
    }

    #[test]
    fn test_moving_average_prefix_and_window() {
        let values = [2.0, 4.0, 6.0, 8.0, 10.0];
        let averages = moving_average(&values, 3);

        assert_eq!(averages, vec![2.0, 3.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_moving_average_edge_cases() {
        assert!(moving_average(&[], 50).is_empty());
        assert_eq!(moving_average(&[1.0, 3.0], 1), vec![1.0, 3.0]);
        assert_eq!(moving_average(&[1.0, 3.0], 50), vec![1.0, 2.0]);
    }
}
