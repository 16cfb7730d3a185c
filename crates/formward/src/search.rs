//! Course search widget
//!
//! Debounced, case-insensitive filtering over a course catalog with an
//! optional category filter, `<mark>` highlighting, and a short persisted
//! list of recent searches.

use maud::{html, Markup};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use formward_validation::{contains_ignore_case, eq_ignore_case, match_ranges};

use crate::config::SearchConfig;
use crate::storage::{Storage, StorageExt};
use crate::tasks::{Clock, TaskQueue};

pub const RECENT_SEARCHES_KEY: &str = "recentSearches";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: String,
    pub title: String,
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub level: Option<String>,
}

impl Course {
    fn matches(&self, query: &str) -> bool {
        query.is_empty()
            || contains_ignore_case(&self.title, query)
            || contains_ignore_case(&self.category, query)
            || contains_ignore_case(&self.description, query)
    }
}

pub struct CourseSearch {
    courses: Vec<Course>,
    query: String,
    category: Option<String>,
    results: Vec<usize>,
    recent: VecDeque<String>,
    max_recent: usize,
    debounce: Duration,
    pending: TaskQueue<String>,
    storage: Arc<dyn Storage>,
}

impl CourseSearch {
    pub fn new(courses: Vec<Course>, storage: Arc<dyn Storage>, config: &SearchConfig) -> Self {
        let recent = match storage.get_json::<VecDeque<String>>(RECENT_SEARCHES_KEY) {
            Ok(recent) => recent.unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "ignoring unreadable recent searches");
                VecDeque::new()
            }
        };

        let mut search = Self {
            courses,
            query: String::new(),
            category: None,
            results: Vec::new(),
            recent,
            max_recent: config.max_recent,
            debounce: config.debounce(),
            pending: TaskQueue::new(Clock::new()),
            storage,
        };
        search.recent.truncate(search.max_recent);
        search.refilter();
        search
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.pending = TaskQueue::new(clock);
        self
    }

    /// Record a keystroke. Only the latest input is applied, once the
    /// debounce window passes without further input.
    pub fn input(&mut self, query: impl Into<String>) {
        self.pending.clear();
        self.pending.schedule(self.debounce, query.into());
    }

    /// Apply any input whose debounce window has passed
    pub fn poll(&mut self) {
        let now = self.pending.clock().now();
        while let Some(query) = self.pending.pop_until(now) {
            self.apply(query);
        }
    }

    /// Move the clock forward and apply due input
    pub fn advance(&mut self, by: Duration) {
        for query in self.pending.advance(by) {
            self.apply(query);
        }
    }

    /// Apply a query immediately, dropping pending input
    pub fn search_now(&mut self, query: impl Into<String>) {
        self.pending.clear();
        self.apply(query.into());
    }

    pub fn set_category(&mut self, category: Option<String>) {
        self.category = category.filter(|c| !c.is_empty());
        self.refilter();
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn results(&self) -> impl Iterator<Item = &Course> {
        self.results.iter().map(|&i| &self.courses[i])
    }

    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    /// Most recent first
    pub fn recent_searches(&self) -> impl Iterator<Item = &str> {
        self.recent.iter().map(String::as_str)
    }

    pub fn clear_recent(&mut self) {
        self.recent.clear();
        if let Err(err) = self.storage.remove_item(RECENT_SEARCHES_KEY) {
            tracing::warn!(error = %err, "failed to clear recent searches");
        }
    }

    /// Result titles with the current query highlighted
    pub fn render_results(&self) -> Markup {
        html! {
            ul.course-results {
                @for course in self.results() {
                    li.course-result data-course=(course.id) {
                        span.course-title { (highlight(&course.title, &self.query)) }
                        span.course-category { (course.category) }
                    }
                }
            }
        }
    }

    fn apply(&mut self, query: String) {
        self.query = query.trim().to_string();
        self.refilter();
        if !self.query.is_empty() {
            self.remember(self.query.clone());
        }
        tracing::debug!(query = %self.query, results = self.results.len(), "search applied");
    }

    fn refilter(&mut self) {
        let query = self.query.as_str();
        let category = self.category.as_deref();
        self.results = self
            .courses
            .iter()
            .enumerate()
            .filter(|(_, c)| category.map_or(true, |cat| eq_ignore_case(&c.category, cat)))
            .filter(|(_, c)| c.matches(query))
            .map(|(i, _)| i)
            .collect();
    }

    fn remember(&mut self, query: String) {
        self.recent.retain(|q| !eq_ignore_case(q, &query));
        self.recent.push_front(query);
        self.recent.truncate(self.max_recent);

        if let Err(err) = self.storage.set_json(RECENT_SEARCHES_KEY, &self.recent) {
            tracing::warn!(error = %err, "failed to save recent searches");
        }
    }
}

/// Wrap case-insensitive matches of `query` in `<mark>`, escaping the rest
pub fn highlight(text: &str, query: &str) -> Markup {
    let mut segments = Vec::new();
    let mut last = 0;
    for (start, end) in match_ranges(text, query.trim()) {
        segments.push((&text[last..start], false));
        segments.push((&text[start..end], true));
        last = end;
    }
    segments.push((&text[last..], false));

    html! {
        @for (segment, marked) in segments {
            @if marked {
                mark { (segment) }
            } @else {
                (segment)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use pretty_assertions::assert_eq;

    fn course(id: &str, title: &str, category: &str) -> Course {
        Course {
            id: id.to_string(),
            title: title.to_string(),
            category: category.to_string(),
            description: String::new(),
            level: None,
        }
    }

    fn catalog() -> Vec<Course> {
        vec![
            course("surf-101", "Beginner Surf", "Water"),
            course("yoga-am", "Morning Yoga", "Wellness"),
            course("surf-adv", "Advanced Surf Coaching", "Water"),
        ]
    }

    fn ids(search: &CourseSearch) -> Vec<&str> {
        search.results().map(|c| c.id.as_str()).collect()
    }

    #[test]
    fn test_highlight_escapes_and_marks() {
        assert_eq!(
            highlight("Surf & <Turf> surf", "SURF").into_string(),
            "<mark>Surf</mark> &amp; &lt;Turf&gt; <mark>surf</mark>"
        );
        assert_eq!(highlight("Yoga", "").into_string(), "Yoga");
    }

    #[test]
    fn test_empty_query_matches_all() {
        let search = CourseSearch::new(catalog(), Arc::new(MemoryStorage::new()), &SearchConfig::default());
        assert_eq!(search.result_count(), 3);
    }

    #[test]
    fn test_category_filter() {
        let mut search = CourseSearch::new(catalog(), Arc::new(MemoryStorage::new()), &SearchConfig::default());
        search.set_category(Some("water".to_string()));
        assert_eq!(ids(&search), vec!["surf-101", "surf-adv"]);
        search.search_now("advanced");
        assert_eq!(ids(&search), vec!["surf-adv"]);
        search.set_category(None);
        search.search_now("yoga");
        assert_eq!(ids(&search), vec!["yoga-am"]);
    }
}
