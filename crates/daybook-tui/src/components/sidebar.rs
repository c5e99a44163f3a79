//! Left-hand panels: category filters, stats and recent hashtags.

use daybook_core::filter::{Category, TaskView};
use daybook_core::hashtag::HashtagUsage;
use daybook_core::stats::TaskStats;
use daybook_core::task::Priority;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, ListState, Paragraph};

use super::priority_style;

fn category_count(category: Category, stats: &TaskStats) -> usize {
    match category {
        Category::All => stats.total,
        Category::Today => stats.today,
        Category::Upcoming => stats.upcoming,
        Category::Completed => stats.completed,
    }
}

pub fn render_categories(frame: &mut Frame, area: Rect, view: &TaskView, stats: &TaskStats) {
    let block = Block::default()
        .title(" Categories ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    // A selected date overrides the category, so nothing is highlighted then.
    let active = view.date.is_none().then_some(view.category);
    let lines: Vec<Line> = Category::ALL
        .iter()
        .enumerate()
        .map(|(i, &category)| {
            let style = if active == Some(category) {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default()
            };
            Line::from(vec![
                Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow)),
                Span::styled(
                    format!("{:<10}", category.display_name()),
                    style,
                ),
                Span::styled(
                    format!("{:>4}", category_count(category, stats)),
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

pub fn render_stats(frame: &mut Frame, area: Rect, stats: &TaskStats) {
    let block = Block::default()
        .title(" Progress ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .percent(u16::from(stats.completion_rate))
        .label(format!("{}% done", stats.completion_rate));
    frame.render_widget(gauge, rows[0]);

    let mut lines = vec![
        Line::from(format!(
            "{} of {} done, {} left",
            stats.completed, stats.total, stats.remaining
        )),
        Line::from(""),
    ];
    for &priority in Priority::ALL {
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {:<8}", priority.symbol(), priority.display_name()),
                priority_style(priority),
            ),
            Span::raw(format!("{:>4}", stats.by_priority.get(priority))),
        ]));
    }
    frame.render_widget(Paragraph::new(lines), rows[1]);
}

/// `picker` is the cursor when the hashtag picker is open.
pub fn render_hashtags(
    frame: &mut Frame,
    area: Rect,
    tags: &[HashtagUsage],
    selected: &[String],
    picker: Option<&ListState>,
) {
    let border = if picker.is_some() {
        Color::Cyan
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Recent hashtags ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    if tags.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No hashtags yet",
            Style::default().fg(Color::DarkGray),
        ))
        .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = tags
        .iter()
        .map(|tag| {
            let on = selected.contains(&tag.name);
            let marker = if on { "● " } else { "  " };
            let style = if on {
                Style::default().fg(Color::Magenta).bold()
            } else {
                Style::default().fg(Color::Magenta)
            };
            ListItem::new(Line::from(vec![
                Span::raw(marker),
                Span::styled(format!("#{}", tag.name), style),
                Span::styled(format!(" ({})", tag.count), Style::default().fg(Color::DarkGray)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(Color::DarkGray));
    let mut state = picker.cloned().unwrap_or_default();
    frame.render_stateful_widget(list, area, &mut state);
}
