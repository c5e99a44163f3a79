pub mod date_strip;
pub mod sidebar;
pub mod task_form;
pub mod task_list;

use daybook_core::task::Priority;
use ratatui::prelude::*;

pub(crate) fn priority_style(p: Priority) -> Style {
    match p {
        Priority::High => Style::default().fg(Color::LightRed).bold(),
        Priority::Medium => Style::default().fg(Color::Yellow),
        Priority::Low => Style::default().fg(Color::Blue),
    }
}

pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};
    use daybook_core::task::{Priority, Task};

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn make_task(id: &str, date: NaiveDate) -> Task {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            user_id: "u1".to_string(),
            title: format!("Task {id}"),
            description: None,
            date,
            time: None,
            completed: false,
            icon: None,
            hashtags: Vec::new(),
            priority: Priority::Medium,
            created_at: ts,
            updated_at: ts,
        }
    }
}
