//! Global free-text filtering.
//!
//! Two modes: a generic fuzzy match over every visible cell, or a
//! domain-supplied haystack matched as a case-insensitive substring.

use std::sync::Arc;

use fuzzy_matcher::skim::SkimMatcherV2;
use fuzzy_matcher::FuzzyMatcher;

/// Builds the text a row is searched by in item-search mode.
pub type Haystack<R> = Arc<dyn Fn(&R) -> String + Send + Sync>;

/// How the global filter matches rows.
pub enum GlobalFilterMode<R> {
    /// Fuzzy match against each visible cell; best cell score ranks the row.
    Fuzzy,
    /// Case-insensitive substring match against a combined haystack.
    ItemSearch(Haystack<R>),
}

impl<R> Clone for GlobalFilterMode<R> {
    fn clone(&self) -> Self {
        match self {
            GlobalFilterMode::Fuzzy => GlobalFilterMode::Fuzzy,
            GlobalFilterMode::ItemSearch(f) => GlobalFilterMode::ItemSearch(f.clone()),
        }
    }
}

/// Matches rows against a committed query.
pub struct GlobalMatcher<'a, R> {
    mode: &'a GlobalFilterMode<R>,
    query: String,
    fuzzy: SkimMatcherV2,
}

impl<'a, R> GlobalMatcher<'a, R> {
    /// Prepare a matcher for `query`.
    pub fn new(mode: &'a GlobalFilterMode<R>, query: &str) -> Self {
        Self {
            mode,
            query: query.trim().to_lowercase(),
            fuzzy: SkimMatcherV2::default().ignore_case(),
        }
    }

    /// Whether the query is empty and everything matches.
    pub fn is_empty(&self) -> bool {
        self.query.is_empty()
    }

    /// Score a row. `None` means the row is filtered out.
    ///
    /// `cells` yields the row's visible cell texts; it is only consulted in
    /// fuzzy mode.
    pub fn score<I>(&self, row: &R, cells: I) -> Option<i64>
    where
        I: IntoIterator<Item = String>,
    {
        if self.query.is_empty() {
            return Some(0);
        }
        match self.mode {
            GlobalFilterMode::ItemSearch(haystack) => haystack(row)
                .to_lowercase()
                .contains(&self.query)
                .then_some(0),
            GlobalFilterMode::Fuzzy => cells
                .into_iter()
                .filter_map(|cell| self.fuzzy.fuzzy_match(&cell, &self.query))
                .max(),
        }
    }
}
