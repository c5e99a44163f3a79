use chrono::{Days, NaiveDate};
use daybook_core::calendar::{day_indicators, week_of};
use daybook_core::task::Task;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::priority_style;

/// Monday-first week picker. The cursor is the highlighted day; the week
/// shown is always the one containing it.
#[derive(Debug, Clone)]
pub struct DateStrip {
    cursor: NaiveDate,
}

impl DateStrip {
    pub fn new(cursor: NaiveDate) -> Self {
        Self { cursor }
    }

    pub fn cursor(&self) -> NaiveDate {
        self.cursor
    }

    pub fn set_cursor(&mut self, date: NaiveDate) {
        self.cursor = date;
    }

    pub fn shift(&mut self, days: i64) {
        let moved = if days >= 0 {
            self.cursor.checked_add_days(Days::new(days.unsigned_abs()))
        } else {
            self.cursor.checked_sub_days(Days::new(days.unsigned_abs()))
        };
        if let Some(date) = moved {
            self.cursor = date;
        }
    }

    pub fn week(&self) -> [NaiveDate; 7] {
        week_of(self.cursor)
    }

    pub fn render(
        &self,
        frame: &mut Frame,
        area: Rect,
        tasks: &[Task],
        selected: Option<NaiveDate>,
        today: NaiveDate,
    ) {
        let week = self.week();
        let block = Block::default()
            .title(format!(" Week of {} ", week[0].format("%b %-d, %Y")))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let cells = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 7); 7])
            .split(inner);

        for (date, cell) in week.iter().zip(cells.iter()) {
            let mut style = Style::default();
            if *date == today {
                style = style.fg(Color::Yellow).bold();
            }
            if *date == self.cursor {
                style = style.underlined();
            }
            if selected == Some(*date) {
                style = style.fg(Color::Black).bg(Color::Cyan);
            }

            let dots: Vec<Span> = day_indicators(tasks, *date)
                .into_iter()
                .map(|(priority, _)| Span::styled("● ", priority_style(priority)))
                .collect();

            let lines = vec![
                Line::styled(format!("{} {}", date.format("%a"), date.format("%-d")), style),
                Line::from(dots),
            ];
            frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center), *cell);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fixtures::day;

    #[test]
    fn shift_moves_across_weeks() {
        // Sunday
        let mut strip = DateStrip::new(day(2024, 6, 2));
        assert_eq!(strip.week()[0], day(2024, 5, 27));

        strip.shift(1);
        assert_eq!(strip.cursor(), day(2024, 6, 3));
        assert_eq!(strip.week()[0], day(2024, 6, 3));

        strip.shift(-7);
        assert_eq!(strip.cursor(), day(2024, 5, 27));
    }

    #[test]
    fn week_always_contains_cursor() {
        let mut strip = DateStrip::new(day(2024, 2, 26));
        for _ in 0..10 {
            strip.shift(1);
            assert!(strip.week().contains(&strip.cursor()));
        }
    }
}
