use chrono::{Datelike, Days, NaiveDate, NaiveTime};

use crate::task::{Priority, Task};

/// The Monday-first week containing `date`.
pub fn week_of(date: NaiveDate) -> [NaiveDate; 7] {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let monday = date - Days::new(offset);
    std::array::from_fn(|i| monday + Days::new(i as u64))
}

pub fn tasks_on(tasks: &[Task], date: NaiveDate) -> Vec<&Task> {
    tasks.iter().filter(|t| t.is_on(date)).collect()
}

/// Per-priority task counts for one day, high first, zero counts omitted.
/// The date strip draws one dot per entry.
pub fn day_indicators(tasks: &[Task], date: NaiveDate) -> Vec<(Priority, usize)> {
    Priority::ALL
        .iter()
        .filter_map(|&p| {
            let count = tasks
                .iter()
                .filter(|t| t.is_on(date) && t.priority == p)
                .count();
            (count > 0).then_some((p, count))
        })
        .collect()
}

/// Parse a 24h `HH:MM` time of day.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    let (h, m) = s.split_once(':')?;
    if h.len() != 2 || m.len() != 2 {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M").ok()
}
