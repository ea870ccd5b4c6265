// Stats aggregation module.
// Derives star, fork, language and commit-activity statistics from a user's repositories.

#![allow(dead_code, unused_imports)]

pub mod activity;
pub mod aggregator;
pub mod languages;

use serde::{Deserialize, Serialize};

pub use activity::{UNKNOWN_DAY, daily_commit_counts, most_active_day, window_start};
pub use aggregator::StatsAggregator;
pub use languages::{MAX_TOP_LANGUAGES, NO_LANGUAGE_DATA, RepositoryTotals, rank_languages};

/// Derived statistics for one user. Recomputed wholesale on every refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub total_stars: u64,
    pub total_forks: u64,
    pub repository_count: usize,
    /// Up to three most frequent primary languages, most frequent first.
    pub top_languages: Vec<String>,
    /// Weekday name with the most recent commits, or "Unknown".
    pub most_active_day: String,
    /// Commits authored in the trailing 30 days.
    pub commits_30d: u64,
}

impl Stats {
    /// Top languages joined with ", ", or "No data" when none were declared.
    pub fn top_languages_label(&self) -> String {
        if self.top_languages.is_empty() {
            NO_LANGUAGE_DATA.to_string()
        } else {
            self.top_languages.join(", ")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_languages_label() {
        let mut stats = Stats {
            total_stars: 0,
            total_forks: 0,
            repository_count: 0,
            top_languages: Vec::new(),
            most_active_day: UNKNOWN_DAY.to_string(),
            commits_30d: 0,
        };
        assert_eq!(stats.top_languages_label(), "No data");

        stats.top_languages = vec!["Go".to_string(), "Rust".to_string()];
        assert_eq!(stats.top_languages_label(), "Go, Rust");
    }
}
