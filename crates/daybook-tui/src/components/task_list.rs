use crossterm::event::{KeyCode, KeyEvent};
use daybook_core::task::Task;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap};

use super::priority_style;

/// The filtered task list with a cursor that follows the selected task
/// across refreshes.
#[derive(Debug, Default)]
pub struct TaskList {
    tasks: Vec<Task>,
    list_state: ListState,
}

impl TaskList {
    /// Replace the visible tasks. The selection sticks to the same task id
    /// when it is still visible, otherwise to the same row.
    pub fn set_tasks(&mut self, tasks: Vec<Task>) {
        let selected_id = self.selected_task().map(|t| t.id.clone());
        let previous_row = self.list_state.selected();
        self.tasks = tasks;

        if self.tasks.is_empty() {
            self.list_state.select(None);
            return;
        }
        let last = self.tasks.len() - 1;
        let row = selected_id
            .and_then(|id| self.tasks.iter().position(|t| t.id == id))
            .or_else(|| previous_row.map(|r| r.min(last)))
            .unwrap_or(0);
        self.list_state.select(Some(row));
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.tasks.get(self.list_state.selected()?)
    }

    pub fn select_task_by_id(&mut self, task_id: &str) -> bool {
        match self.tasks.iter().position(|t| t.id == task_id) {
            Some(row) => {
                self.list_state.select(Some(row));
                true
            }
            None => false,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if self.tasks.is_empty() {
            return;
        }
        let current = self.list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < self.tasks.len() {
                    self.list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    self.list_state.select(Some(current - 1));
                }
            }
            KeyCode::Char('g') | KeyCode::Home => self.list_state.select(Some(0)),
            KeyCode::Char('G') | KeyCode::End => {
                self.list_state.select(Some(self.tasks.len() - 1))
            }
            _ => {}
        }
    }

    /// `narrowed` switches the empty-state hint from "add a task" to
    /// "loosen the search or hashtag selection".
    pub fn render(&self, frame: &mut Frame, area: Rect, title: &str, narrowed: bool) {
        let block = Block::default()
            .title(format!(" {title} ({}) ", self.tasks.len()))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        if self.tasks.is_empty() {
            let hint = if narrowed {
                vec![
                    Line::from("No tasks match your search or hashtags."),
                    Line::from(""),
                    Line::from(Span::styled(
                        "/ edit search   # change hashtags   Esc clear filters",
                        Style::default().fg(Color::DarkGray),
                    )),
                ]
            } else {
                vec![
                    Line::from("Nothing scheduled here."),
                    Line::from(""),
                    Line::from(Span::styled(
                        "Press n to add a task",
                        Style::default().fg(Color::DarkGray),
                    )),
                ]
            };
            let paragraph = Paragraph::new(hint)
                .block(block)
                .alignment(Alignment::Center)
                .wrap(Wrap { trim: true });
            frame.render_widget(paragraph, area);
            return;
        }

        let items: Vec<ListItem> = self.tasks.iter().map(task_line).map(ListItem::new).collect();
        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Black).bg(Color::Cyan).bold())
            .highlight_symbol("> ");

        let mut state = self.list_state.clone();
        frame.render_stateful_widget(list, area, &mut state);
    }
}

fn task_line(task: &Task) -> Line<'_> {
    let check = if task.completed { "[x] " } else { "[ ] " };
    let title_style = if task.completed {
        Style::default().fg(Color::DarkGray).crossed_out()
    } else {
        Style::default()
    };

    let mut spans = vec![
        Span::raw(check),
        Span::styled(format!("{} ", task.priority.symbol()), priority_style(task.priority)),
    ];
    if let Some(icon) = &task.icon {
        spans.push(Span::raw(format!("{icon} ")));
    }
    spans.push(Span::styled(task.title.as_str(), title_style));
    spans.push(Span::styled(
        format!("  {}", task.date.format("%a %b %-d")),
        Style::default().fg(Color::DarkGray),
    ));
    if let Some(time) = &task.time {
        spans.push(Span::styled(format!(" {time}"), Style::default().fg(Color::DarkGray)));
    }
    for tag in &task.hashtags {
        spans.push(Span::styled(format!(" #{tag}"), Style::default().fg(Color::Magenta)));
    }
    Line::from(spans)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::fixtures::{day, make_task};
    use crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn list_of(ids: &[&str]) -> TaskList {
        let mut list = TaskList::default();
        list.set_tasks(ids.iter().map(|id| make_task(id, day(2024, 6, 1))).collect());
        list
    }

    #[test]
    fn first_task_selected_by_default() {
        let list = list_of(&["a", "b"]);
        assert_eq!(list.selected_task().unwrap().id, "a");
    }

    #[test]
    fn empty_list_has_no_selection() {
        let list = list_of(&[]);
        assert!(list.selected_task().is_none());
    }

    #[test]
    fn navigation_is_bounded() {
        let mut list = list_of(&["a", "b", "c"]);
        list.handle_key(key(KeyCode::Char('k')));
        assert_eq!(list.selected_task().unwrap().id, "a");
        list.handle_key(key(KeyCode::Char('G')));
        assert_eq!(list.selected_task().unwrap().id, "c");
        list.handle_key(key(KeyCode::Down));
        assert_eq!(list.selected_task().unwrap().id, "c");
        list.handle_key(key(KeyCode::Char('g')));
        assert_eq!(list.selected_task().unwrap().id, "a");
    }

    #[test]
    fn selection_follows_task_id() {
        let mut list = list_of(&["a", "b", "c"]);
        assert!(list.select_task_by_id("b"));
        list.set_tasks(vec![
            make_task("c", day(2024, 6, 1)),
            make_task("b", day(2024, 6, 1)),
        ]);
        assert_eq!(list.selected_task().unwrap().id, "b");
    }

    #[test]
    fn selection_clamps_when_task_disappears() {
        let mut list = list_of(&["a", "b", "c"]);
        list.select_task_by_id("c");
        list.set_tasks(vec![make_task("a", day(2024, 6, 1))]);
        assert_eq!(list.selected_task().unwrap().id, "a");
        assert!(!list.select_task_by_id("c"));
    }
}
