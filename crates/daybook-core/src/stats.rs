use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::task::{Priority, Task};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityCounts {
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl PriorityCounts {
    pub fn get(&self, priority: Priority) -> usize {
        match priority {
            Priority::High => self.high,
            Priority::Medium => self.medium,
            Priority::Low => self.low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub today: usize,
    pub upcoming: usize,
    /// Whole percent, 0 when there are no tasks.
    pub completion_rate: u8,
    pub remaining: usize,
    pub by_priority: PriorityCounts,
}

impl TaskStats {
    pub fn compute(tasks: &[Task], now: NaiveDateTime) -> Self {
        let mut stats = TaskStats {
            total: tasks.len(),
            ..Default::default()
        };
        for task in tasks {
            if task.completed {
                stats.completed += 1;
            }
            if task.is_today(now) {
                stats.today += 1;
            }
            if task.is_upcoming(now) {
                stats.upcoming += 1;
            }
            match task.priority {
                Priority::High => stats.by_priority.high += 1,
                Priority::Medium => stats.by_priority.medium += 1,
                Priority::Low => stats.by_priority.low += 1,
            }
        }
        stats.remaining = stats.total - stats.completed;
        stats.completion_rate = completion_rate(stats.completed, stats.total);
        stats
    }
}

fn completion_rate(completed: usize, total: usize) -> u8 {
    if total == 0 {
        return 0;
    }
    // Integer round-half-up of completed/total * 100.
    ((completed * 200 + total) / (total * 2)) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::fixtures::{at, day, task};

    #[test]
    fn empty_collection_is_all_zero() {
        let stats = TaskStats::compute(&[], at(2024, 6, 1, 9, 0));
        assert_eq!(stats, TaskStats::default());
        assert_eq!(stats.completion_rate, 0);
    }

    #[test]
    fn one_of_four_completed_is_25_percent() {
        let mut tasks = vec![
            task("1", "a", day(2024, 6, 1)),
            task("2", "b", day(2024, 6, 2)),
            task("3", "c", day(2024, 6, 3)),
            task("4", "d", day(2024, 5, 30)),
        ];
        tasks[0].completed = true;
        tasks[1].priority = Priority::High;

        let stats = TaskStats::compute(&tasks, at(2024, 6, 1, 9, 0));
        assert_eq!(stats.total, 4);
        assert_eq!(stats.completed, 1);
        assert_eq!(stats.completion_rate, 25);
        assert_eq!(stats.today, 1);
        assert_eq!(stats.upcoming, 2);
        assert_eq!(stats.remaining, 3);
        assert_eq!(stats.by_priority.get(Priority::High), 1);
        assert_eq!(stats.by_priority.get(Priority::Medium), 3);
        assert_eq!(stats.by_priority.get(Priority::Low), 0);
    }

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(5, 5), 100);
    }

    #[test]
    fn completing_a_future_task_moves_it_out_of_upcoming() {
        let now = at(2024, 6, 1, 9, 0);
        let mut tasks = vec![task("1", "later", day(2024, 6, 5))];
        let before = TaskStats::compute(&tasks, now);
        tasks[0].completed = true;
        let after = TaskStats::compute(&tasks, now);

        assert_eq!(before.upcoming, 1);
        assert_eq!(after.upcoming, 0);
        assert_eq!(after.completed, before.completed + 1);
    }

    #[test]
    fn today_plus_upcoming_never_exceeds_total() {
        let tasks: Vec<Task> = (0..10)
            .map(|i: u64| task(&i.to_string(), "t", day(2024, 5, 30) + chrono::Days::new(i % 5)))
            .collect();
        let stats = TaskStats::compute(&tasks, at(2024, 6, 1, 0, 0));
        assert!(stats.today + stats.upcoming <= stats.total);
    }
}
