use std::time::{Duration, Instant};

/// Per-session counters shown by the interactive modes
pub struct GameMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub high_score: u32,
    pub games_played: u32,
    /// Sum of final scores, for the session average
    pub total_score: u64,
}

impl GameMetrics {
    /// Start a session, seeding the best score from persisted storage
    pub fn new(high_score: u32) -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            high_score,
            games_played: 0,
            total_score: 0,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    pub fn on_game_start(&mut self) {
        self.start_time = Instant::now();
        self.elapsed_time = Duration::ZERO;
    }

    /// Returns true when `final_score` beats the best so far
    pub fn on_game_over(&mut self, final_score: u32) -> bool {
        self.games_played += 1;
        self.total_score += u64::from(final_score);
        if final_score > self.high_score {
            self.high_score = final_score;
            return true;
        }
        false
    }

    pub fn average_score(&self) -> f64 {
        if self.games_played == 0 {
            0.0
        } else {
            self.total_score as f64 / f64::from(self.games_played)
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_formatting() {
        let mut metrics = GameMetrics::default();
        metrics.elapsed_time = Duration::from_secs(125);
        assert_eq!(metrics.format_time(), "02:05");

        metrics.elapsed_time = Duration::from_secs(3661);
        assert_eq!(metrics.format_time(), "61:01");
    }

    #[test]
    fn test_high_score_tracking() {
        let mut metrics = GameMetrics::new(4);

        assert!(!metrics.on_game_over(3));
        assert_eq!(metrics.high_score, 4);

        assert!(metrics.on_game_over(6));
        assert_eq!(metrics.high_score, 6);

        assert!(!metrics.on_game_over(6));
        assert_eq!(metrics.games_played, 3);
        assert!((metrics.average_score() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_average_without_games() {
        assert_eq!(GameMetrics::default().average_score(), 0.0);
    }
}
