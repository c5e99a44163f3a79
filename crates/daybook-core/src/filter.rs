use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::task::Task;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    All,
    Today,
    Upcoming,
    Completed,
}

impl Category {
    pub const ALL: &[Category] = &[
        Category::All,
        Category::Today,
        Category::Upcoming,
        Category::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::All => "all",
            Category::Today => "today",
            Category::Upcoming => "upcoming",
            Category::Completed => "completed",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Today => "Today",
            Category::Upcoming => "Upcoming",
            Category::Completed => "Completed",
        }
    }

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Category::All),
            "today" => Some(Category::Today),
            "upcoming" => Some(Category::Upcoming),
            "completed" => Some(Category::Completed),
            _ => None,
        }
    }

    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        match self {
            Category::All => true,
            Category::Today => task.is_today(now),
            Category::Upcoming => task.is_upcoming(now),
            Category::Completed => task.completed,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What the task list is currently showing. Every active dimension must
/// match for a task to be included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskView {
    pub date: Option<NaiveDate>,
    pub category: Category,
    pub search: String,
    pub hashtags: Vec<String>,
}

impl TaskView {
    /// Subset of `tasks` passing every predicate, in input order.
    pub fn apply<'a>(&self, tasks: &'a [Task], now: NaiveDateTime) -> Vec<&'a Task> {
        tasks.iter().filter(|t| self.matches(t, now)).collect()
    }

    pub fn matches(&self, task: &Task, now: NaiveDateTime) -> bool {
        self.date.is_none_or(|d| task.is_on(d))
            && self.category.matches(task, now)
            && task.matches_text(&self.search)
            && (self.hashtags.is_empty() || task.has_any_hashtag(&self.hashtags))
    }

    /// Picking a calendar day resets the category; the two are exclusive.
    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
        self.category = Category::All;
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.date = None;
    }

    pub fn toggle_hashtag(&mut self, tag: &str) {
        if let Some(pos) = self.hashtags.iter().position(|t| t == tag) {
            self.hashtags.remove(pos);
        } else {
            self.hashtags.push(tag.to_string());
        }
    }

    pub fn clear_hashtags(&mut self) {
        self.hashtags.clear();
    }

    /// True when a search or hashtag selection narrows the list. The empty
    /// state uses this to suggest loosening filters instead of adding a task.
    pub fn is_narrowed(&self) -> bool {
        !self.search.trim().is_empty() || !self.hashtags.is_empty()
    }

    pub fn is_unfiltered(&self) -> bool {
        self.date.is_none() && self.category == Category::All && !self.is_narrowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{at, day, task};

    fn sample() -> Vec<Task> {
        let mut design = task("1", "Design landing page", day(2024, 6, 1));
        design.hashtags = vec!["work".into(), "design".into()];
        design.description = Some("Modern responsive layout".into());

        let mut groceries = task("2", "Grocery shopping", day(2024, 6, 2));
        groceries.hashtags = vec!["personal".into()];

        let mut meeting = task("3", "Team meeting", day(2024, 6, 1));
        meeting.completed = true;
        meeting.hashtags = vec!["work".into()];

        let book = task("4", "Read new book", day(2024, 6, 3));

        vec![design, groceries, meeting, book]
    }

    fn ids(tasks: &[&Task]) -> Vec<String> {
        tasks.iter().map(|t| t.id.clone()).collect()
    }

    #[test]
    fn default_view_returns_everything() {
        let tasks = sample();
        let now = at(2024, 6, 1, 9, 0);
        assert_eq!(TaskView::default().apply(&tasks, now).len(), 4);
    }

    #[test]
    fn category_today() {
        let tasks = sample();
        let view = TaskView {
            category: Category::Today,
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["1", "3"]);
    }

    #[test]
    fn category_upcoming_excludes_completed_and_today() {
        let mut tasks = sample();
        tasks[3].completed = true;
        let view = TaskView {
            category: Category::Upcoming,
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["2"]);
    }

    #[test]
    fn category_completed() {
        let tasks = sample();
        let view = TaskView {
            category: Category::Completed,
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["3"]);
    }

    #[test]
    fn date_filter_uses_calendar_day() {
        let tasks = sample();
        let mut view = TaskView::default();
        view.select_date(day(2024, 6, 1));
        assert_eq!(ids(&view.apply(&tasks, at(2024, 5, 1, 23, 59))), vec!["1", "3"]);
    }

    #[test]
    fn search_is_case_insensitive_over_title_and_description() {
        let tasks = sample();
        let view = TaskView {
            search: "RESPONSIVE".into(),
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["1"]);
    }

    #[test]
    fn hashtags_use_or_semantics() {
        let tasks = sample();
        let view = TaskView {
            hashtags: vec!["design".into(), "personal".into()],
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["1", "2"]);
    }

    #[test]
    fn dimensions_combine_with_and() {
        let tasks = sample();
        let view = TaskView {
            category: Category::Today,
            hashtags: vec!["work".into()],
            search: "meeting".into(),
            ..Default::default()
        };
        assert_eq!(ids(&view.apply(&tasks, at(2024, 6, 1, 9, 0))), vec!["3"]);
    }

    #[test]
    fn no_match_is_an_empty_result() {
        let tasks = sample();
        let view = TaskView {
            search: "nothing like this".into(),
            ..Default::default()
        };
        assert!(view.apply(&tasks, at(2024, 6, 1, 9, 0)).is_empty());
        assert!(view.is_narrowed());
    }

    #[test]
    fn result_is_subset_and_filtering_is_idempotent() {
        let tasks = sample();
        let now = at(2024, 6, 1, 9, 0);
        let views = [
            TaskView {
                category: Category::Upcoming,
                ..Default::default()
            },
            TaskView {
                hashtags: vec!["work".into()],
                search: "e".into(),
                ..Default::default()
            },
            TaskView {
                date: Some(day(2024, 6, 2)),
                ..Default::default()
            },
        ];
        for view in views {
            let once: Vec<Task> = view.apply(&tasks, now).into_iter().cloned().collect();
            assert!(once.iter().all(|t| tasks.contains(t)));
            let twice: Vec<Task> = view.apply(&once, now).into_iter().cloned().collect();
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn selecting_date_clears_category_and_back() {
        let mut view = TaskView {
            category: Category::Completed,
            ..Default::default()
        };
        view.select_date(day(2024, 6, 1));
        assert_eq!(view.category, Category::All);
        assert_eq!(view.date, Some(day(2024, 6, 1)));

        view.set_category(Category::Today);
        assert_eq!(view.date, None);
        assert_eq!(view.category, Category::Today);
    }

    #[test]
    fn toggle_hashtag_adds_then_removes() {
        let mut view = TaskView::default();
        view.toggle_hashtag("work");
        view.toggle_hashtag("home");
        assert_eq!(view.hashtags, vec!["work", "home"]);
        view.toggle_hashtag("work");
        assert_eq!(view.hashtags, vec!["home"]);
        view.clear_hashtags();
        assert!(view.is_unfiltered());
    }

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(Category::parse_str("Upcoming"), Some(Category::Upcoming));
        assert_eq!(Category::parse_str("bogus"), None);
    }
}
