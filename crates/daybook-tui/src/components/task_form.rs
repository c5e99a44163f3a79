use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use daybook_core::task::{CreateTask, Priority, Task, UpdateTask};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use super::{centered_rect, priority_style};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Date,
    Time,
    Icon,
    Hashtags,
    Priority,
}

impl FormField {
    pub const ALL: [FormField; 7] = [
        FormField::Title,
        FormField::Description,
        FormField::Date,
        FormField::Time,
        FormField::Icon,
        FormField::Hashtags,
        FormField::Priority,
    ];

    fn label(self) -> &'static str {
        match self {
            FormField::Title => "Title",
            FormField::Description => "Description",
            FormField::Date => "Date",
            FormField::Time => "Time",
            FormField::Icon => "Icon",
            FormField::Hashtags => "Hashtags",
            FormField::Priority => "Priority",
        }
    }

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// What the owner of a form should do after a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Continue,
    Submit,
    Cancel,
}

/// Editable text buffers for every task field. Parsing happens on submit so
/// half-typed dates and times are allowed while editing.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub title: String,
    pub description: String,
    pub date: String,
    pub time: String,
    pub icon: String,
    /// Space or comma separated, a leading `#` is optional.
    pub hashtags: String,
    pub priority: Priority,
    pub focus: FormField,
}

impl TaskForm {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: date.format(DATE_FORMAT).to_string(),
            time: String::new(),
            icon: String::new(),
            hashtags: String::new(),
            priority: Priority::default(),
            focus: FormField::Title,
        }
    }

    pub fn from_task(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            date: task.date.format(DATE_FORMAT).to_string(),
            time: task.time.clone().unwrap_or_default(),
            icon: task.icon.clone().unwrap_or_default(),
            hashtags: task.hashtags.join(" "),
            priority: task.priority,
            focus: FormField::Title,
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> FormAction {
        match key.code {
            KeyCode::Esc => return FormAction::Cancel,
            KeyCode::Enter => return FormAction::Submit,
            KeyCode::Tab | KeyCode::Down => self.focus = self.focus.next(),
            KeyCode::BackTab | KeyCode::Up => self.focus = self.focus.prev(),
            KeyCode::Left if self.focus == FormField::Priority => {
                self.priority = cycle_priority(self.priority, false)
            }
            KeyCode::Right | KeyCode::Char(' ') if self.focus == FormField::Priority => {
                self.priority = cycle_priority(self.priority, true)
            }
            KeyCode::Backspace => {
                if let Some(buf) = self.buffer_mut() {
                    buf.pop();
                }
            }
            KeyCode::Char(c) => {
                if let Some(buf) = self.buffer_mut() {
                    buf.push(c);
                }
            }
            _ => {}
        }
        FormAction::Continue
    }

    fn buffer_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::Date => Some(&mut self.date),
            FormField::Time => Some(&mut self.time),
            FormField::Icon => Some(&mut self.icon),
            FormField::Hashtags => Some(&mut self.hashtags),
            FormField::Priority => None,
        }
    }

    fn parse_date(&self) -> Result<NaiveDate, String> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| format!("date must be YYYY-MM-DD, got {:?}", self.date.trim()))
    }

    fn parse_hashtags(&self) -> Vec<String> {
        self.hashtags
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }

    /// Title and time are checked by the store; only the date must parse here.
    pub fn to_create(&self) -> Result<CreateTask, String> {
        let mut input = CreateTask::new(self.title.clone(), self.parse_date()?);
        input.description = non_empty(&self.description);
        input.time = non_empty(&self.time);
        input.icon = non_empty(&self.icon);
        input.hashtags = self.parse_hashtags();
        input.priority = self.priority;
        Ok(input)
    }

    /// A full patch: cleared text fields clear the stored value.
    pub fn to_update(&self) -> Result<UpdateTask, String> {
        Ok(UpdateTask {
            title: Some(self.title.clone()),
            description: Some(non_empty(&self.description)),
            date: Some(self.parse_date()?),
            time: Some(non_empty(&self.time)),
            completed: None,
            icon: Some(non_empty(&self.icon)),
            hashtags: Some(self.parse_hashtags()),
            priority: Some(self.priority),
        })
    }

    pub fn render(&self, frame: &mut Frame, heading: &str, area: Rect) {
        let popup = centered_rect(60, 50, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(format!(" {heading} "))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let mut lines = Vec::new();
        for field in FormField::ALL {
            let focused = field == self.focus;
            let label_style = if focused {
                Style::default().fg(Color::Cyan).bold()
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let mut spans = vec![Span::styled(format!("{:>12}: ", field.label()), label_style)];
            match field {
                FormField::Priority => {
                    spans.push(Span::styled(
                        format!("< {} >", self.priority.display_name()),
                        priority_style(self.priority),
                    ));
                }
                _ => {
                    let value = match field {
                        FormField::Title => &self.title,
                        FormField::Description => &self.description,
                        FormField::Date => &self.date,
                        FormField::Time => &self.time,
                        FormField::Icon => &self.icon,
                        _ => &self.hashtags,
                    };
                    spans.push(Span::raw(value.as_str()));
                    if focused {
                        spans.push(Span::styled("█", Style::default().fg(Color::Cyan)));
                    }
                }
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Tab next field   ←/→ priority   Enter save   Esc cancel",
            Style::default().fg(Color::DarkGray),
        )));

        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

fn cycle_priority(p: Priority, up: bool) -> Priority {
    match (p, up) {
        (Priority::Low, true) | (Priority::High, false) => Priority::Medium,
        (Priority::Medium, true) | (Priority::Low, false) => Priority::High,
        (Priority::High, true) | (Priority::Medium, false) => Priority::Low,
    }
}
