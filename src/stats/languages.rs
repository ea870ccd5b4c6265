// Repository totals and language ranking.

use crate::github::RepositorySummary;

/// Number of languages kept in the ranking.
pub const MAX_TOP_LANGUAGES: usize = 3;

/// Label used when no repository declares a language.
pub const NO_LANGUAGE_DATA: &str = "No data";

/// Star, fork and language figures that need no commit history.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryTotals {
    pub stars: u64,
    pub forks: u64,
    pub repository_count: usize,
    pub top_languages: Vec<String>,
}

impl RepositoryTotals {
    pub fn from_repositories(repos: &[RepositorySummary]) -> Self {
        Self {
            stars: repos.iter().map(|r| r.stars).sum(),
            forks: repos.iter().map(|r| r.forks).sum(),
            repository_count: repos.len(),
            top_languages: rank_languages(repos),
        }
    }
}

/// Rank primary languages by frequency, keeping at most [`MAX_TOP_LANGUAGES`].
///
/// Matching is exact and case-sensitive. Equal counts keep first-seen order.
/// Repositories without a language are ignored.
pub fn rank_languages(repos: &[RepositorySummary]) -> Vec<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for language in repos.iter().filter_map(|r| r.language.as_deref()) {
        match counts.iter_mut().find(|(name, _)| *name == language) {
            Some((_, count)) => *count += 1,
            None => counts.push((language, 1)),
        }
    }

    // Stable sort, so ties stay in first-seen order.
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .take(MAX_TOP_LANGUAGES)
        .map(|(name, _)| name.to_string())
        .collect()
}
