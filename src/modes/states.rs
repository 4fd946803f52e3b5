//! State-space size report

use std::fmt;

use serde::Serialize;
use tracing::info;

use crate::rl::{count_states_by_length, enumerate_states};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LengthCount {
    pub length: usize,
    pub count: usize,
    /// Share of all states, in percent
    pub percent: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatesReport {
    pub grid_size: usize,
    pub by_length: Vec<LengthCount>,
    pub total: usize,
}

impl StatesReport {
    pub fn build(grid_size: usize) -> Self {
        let states = enumerate_states(grid_size);
        let total = states.len();
        let by_length = count_states_by_length(&states)
            .into_iter()
            .map(|(length, count)| LengthCount {
                length,
                count,
                percent: if total == 0 {
                    0.0
                } else {
                    count as f64 * 100.0 / total as f64
                },
            })
            .collect();

        info!(grid_size, total, "state space enumerated");

        Self {
            grid_size,
            by_length,
            total,
        }
    }
}

impl fmt::Display for StatesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "States on a {0}x{0} grid", self.grid_size)?;
        writeln!(f, "{:>6}  {:>10}  {:>7}", "Length", "States", "Share")?;
        for row in &self.by_length {
            writeln!(f, "{:>6}  {:>10}  {:>6.2}%", row.length, row.count, row.percent)?;
        }
        write!(f, "{:>6}  {:>10}", "Total", self.total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_by_two_report() {
        let report = StatesReport::build(2);

        assert_eq!(report.total, 72);
        let counts: Vec<(usize, usize)> = report.by_length.iter().map(|r| (r.length, r.count)).collect();
        assert_eq!(counts, vec![(1, 48), (2, 16), (3, 8)]);

        let share: f64 = report.by_length.iter().map(|r| r.percent).sum();
        assert!((share - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_display_lists_every_length() {
        let text = StatesReport::build(2).to_string();
        assert!(text.starts_with("States on a 2x2 grid"));
        assert!(text.contains("66.67%"));
        assert!(text.ends_with("72"));
    }
}
