use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use daybook_core::filter::{Category, TaskView};
use daybook_core::hashtag::{recent_hashtags, HashtagUsage};
use daybook_core::task::{Priority, Task, UpdateTask};
use daybook_service::BlockingTaskStore;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, ListState, Paragraph, Wrap};

use crate::components::date_strip::DateStrip;
use crate::components::sidebar;
use crate::components::task_form::{FormAction, TaskForm};
use crate::components::task_list::TaskList;
use crate::components::{centered_rect, priority_style};

/// What the app is currently doing
#[derive(Debug, Clone)]
pub enum Mode {
    /// Browsing the filtered list
    Normal,
    /// Typing a search query; `previous` is restored on Esc
    Search { previous: String },
    /// Toggling hashtags from the recent list
    HashtagPick { list_state: ListState },
    /// Filling in a new task
    NewTask { form: TaskForm },
    /// Editing every field of an existing task
    EditTask { task_id: String, form: TaskForm },
    /// Viewing task detail
    TaskDetail { task_id: String },
    /// Confirm delete task
    ConfirmDelete { task_id: String, title: String },
    /// Priority picker
    PriorityPick { task_id: String, current: Priority },
}

pub struct App {
    store: BlockingTaskStore,
    username: Option<String>,
    view: TaskView,
    list: TaskList,
    strip: DateStrip,
    mode: Mode,
    status_message: Option<String>,
}

impl App {
    pub fn new(mut store: BlockingTaskStore) -> Result<Self> {
        if !store.is_loaded() {
            store.load()?;
        }
        let username = store.me().ok().map(|u| u.username);
        let today = daybook_core::local_now().date();

        let mut app = Self {
            store,
            username,
            view: TaskView::default(),
            list: TaskList::default(),
            strip: DateStrip::new(today),
            mode: Mode::Normal,
            status_message: None,
        };
        app.sync_list();
        Ok(app)
    }

    /// Re-run the filter over the store snapshot.
    fn sync_list(&mut self) {
        let now = daybook_core::local_now();
        let visible = self
            .view
            .apply(self.store.list(), now)
            .into_iter()
            .cloned()
            .collect();
        self.list.set_tasks(visible);
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn view(&self) -> &TaskView {
        &self.view
    }

    pub fn store(&self) -> &BlockingTaskStore {
        &self.store
    }

    pub fn into_store(self) -> BlockingTaskStore {
        self.store
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn visible_tasks(&self) -> &[Task] {
        self.list.tasks()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.list.selected_task()
    }

    pub fn cursor_date(&self) -> NaiveDate {
        self.strip.cursor()
    }

    /// The recent hashtags, followed by any selected tag that has dropped
    /// out of them so it can still be toggled off.
    pub fn hashtag_choices(&self) -> Vec<HashtagUsage> {
        let mut choices = self.store.recent_hashtags();
        let missing: Vec<&String> = self
            .view
            .hashtags
            .iter()
            .filter(|tag| !choices.iter().any(|c| &c.name == *tag))
            .collect();
        if missing.is_empty() {
            return choices;
        }

        let all = recent_hashtags(self.store.list(), usize::MAX);
        for tag in missing {
            let usage = all
                .iter()
                .find(|u| &u.name == tag)
                .cloned()
                .unwrap_or_else(|| HashtagUsage {
                    name: tag.clone(),
                    count: 0,
                    last_used: DateTime::<Utc>::MIN_UTC,
                });
            choices.push(usage);
        }
        choices
    }

    pub fn is_input_mode(&self) -> bool {
        matches!(
            self.mode,
            Mode::Search { .. } | Mode::NewTask { .. } | Mode::EditTask { .. }
        )
    }

    fn report_error(&mut self, e: impl std::fmt::Display) {
        self.status_message = Some(format!("Error: {e}"));
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        self.status_message = None;

        match self.mode.clone() {
            Mode::Normal => self.handle_normal(key),
            Mode::Search { previous } => self.handle_search(key, previous),
            Mode::HashtagPick { list_state } => self.handle_hashtag_pick(key, list_state),
            Mode::NewTask { form } => self.handle_new_task(key, form),
            Mode::EditTask { task_id, form } => self.handle_edit_task(key, task_id, form),
            Mode::TaskDetail { task_id } => self.handle_task_detail(key, task_id),
            Mode::ConfirmDelete { task_id, title } => {
                self.handle_confirm_delete(key, task_id, title)
            }
            Mode::PriorityPick { task_id, .. } => self.handle_priority_pick(key, task_id),
        }

        self.sync_list();
    }

    fn handle_normal(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('n') => {
                let date = self.view.date.unwrap_or(self.strip.cursor());
                self.mode = Mode::NewTask {
                    form: TaskForm::new(date),
                };
            }
            KeyCode::Enter => {
                if let Some(task) = self.list.selected_task() {
                    self.mode = Mode::TaskDetail {
                        task_id: task.id.clone(),
                    };
                }
            }
            KeyCode::Char('x') | KeyCode::Char(' ') => {
                if let Some(id) = self.list.selected_task().map(|t| t.id.clone()) {
                    self.toggle_completed(&id);
                }
            }
            KeyCode::Char('e') => {
                if let Some(task) = self.list.selected_task() {
                    self.mode = Mode::EditTask {
                        task_id: task.id.clone(),
                        form: TaskForm::from_task(task),
                    };
                }
            }
            KeyCode::Char('d') => {
                if let Some(task) = self.list.selected_task() {
                    self.mode = Mode::ConfirmDelete {
                        task_id: task.id.clone(),
                        title: task.title.clone(),
                    };
                }
            }
            KeyCode::Char('p') => {
                if let Some(task) = self.list.selected_task() {
                    self.mode = Mode::PriorityPick {
                        task_id: task.id.clone(),
                        current: task.priority,
                    };
                }
            }
            KeyCode::Char('/') => {
                self.mode = Mode::Search {
                    previous: self.view.search.clone(),
                };
            }
            KeyCode::Char('#') => {
                if self.hashtag_choices().is_empty() {
                    self.status_message = Some("No hashtags yet".into());
                } else {
                    let mut list_state = ListState::default();
                    list_state.select(Some(0));
                    self.mode = Mode::HashtagPick { list_state };
                }
            }
            KeyCode::Char('r') => match self.store.refresh() {
                Ok(()) => self.status_message = Some("Refreshed".into()),
                Err(e) => self.report_error(e),
            },
            // Categories
            KeyCode::Tab => self.shift_category(1),
            KeyCode::BackTab => self.shift_category(-1),
            KeyCode::Char(c @ '1'..='4') => {
                let idx = (c as usize) - ('1' as usize);
                if let Some(&category) = Category::ALL.get(idx) {
                    self.view.set_category(category);
                }
            }
            // Calendar
            KeyCode::Char('h') | KeyCode::Left => self.move_date(-1),
            KeyCode::Char('l') | KeyCode::Right => self.move_date(1),
            KeyCode::Char('H') => self.move_date(-7),
            KeyCode::Char('L') => self.move_date(7),
            KeyCode::Char('t') => {
                let today = daybook_core::local_now().date();
                self.strip.set_cursor(today);
                self.view.select_date(today);
            }
            KeyCode::Esc => {
                if !self.view.is_unfiltered() {
                    self.view = TaskView::default();
                    self.status_message = Some("Filters cleared".into());
                }
            }
            _ => self.list.handle_key(key),
        }
    }

    fn shift_category(&mut self, step: isize) {
        let all = Category::ALL;
        let current = all
            .iter()
            .position(|c| *c == self.view.category)
            .unwrap_or(0) as isize;
        let next = (current + step).rem_euclid(all.len() as isize) as usize;
        self.view.set_category(all[next]);
    }

    fn move_date(&mut self, days: i64) {
        self.strip.shift(days);
        self.view.select_date(self.strip.cursor());
    }

    fn toggle_completed(&mut self, task_id: &str) {
        match self.store.toggle_completed(task_id) {
            Ok(task) => {
                let verb = if task.completed { "Completed" } else { "Reopened" };
                self.status_message = Some(format!("{verb}: {}", task.title));
            }
            Err(e) => self.report_error(e),
        }
    }

    fn handle_search(&mut self, key: KeyEvent, previous: String) {
        match key.code {
            KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Esc => {
                self.view.search = previous;
                self.mode = Mode::Normal;
            }
            KeyCode::Backspace => {
                self.view.search.pop();
            }
            KeyCode::Char(c) => self.view.search.push(c),
            _ => {}
        }
    }

    fn handle_hashtag_pick(&mut self, key: KeyEvent, mut list_state: ListState) {
        let tags = self.hashtag_choices();
        let current = list_state.selected().unwrap_or(0);
        match key.code {
            KeyCode::Esc | KeyCode::Char('#') => {
                self.mode = Mode::Normal;
                return;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                if current + 1 < tags.len() {
                    list_state.select(Some(current + 1));
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                if current > 0 {
                    list_state.select(Some(current - 1));
                }
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(tag) = tags.get(current) {
                    self.view.toggle_hashtag(&tag.name);
                }
            }
            KeyCode::Char('c') => self.view.clear_hashtags(),
            _ => {}
        }
        self.mode = Mode::HashtagPick { list_state };
    }

    fn handle_new_task(&mut self, key: KeyEvent, mut form: TaskForm) {
        match form.handle_key(key) {
            FormAction::Continue => self.mode = Mode::NewTask { form },
            FormAction::Cancel => self.mode = Mode::Normal,
            FormAction::Submit => {
                let created = form
                    .to_create()
                    .map_err(|msg| format!("Error: {msg}"))
                    .and_then(|input| {
                        self.store
                            .create(input)
                            .map_err(|e| format!("Error: {e}"))
                    });
                match created {
                    Ok(task) => {
                        self.status_message = Some(format!("Created: {}", task.title));
                        self.sync_list();
                        self.list.select_task_by_id(&task.id);
                        self.mode = Mode::Normal;
                    }
                    // Keep the form open so the input can be fixed.
                    Err(msg) => {
                        self.status_message = Some(msg);
                        self.mode = Mode::NewTask { form };
                    }
                }
            }
        }
    }

    fn handle_edit_task(&mut self, key: KeyEvent, task_id: String, mut form: TaskForm) {
        match form.handle_key(key) {
            FormAction::Continue => self.mode = Mode::EditTask { task_id, form },
            FormAction::Cancel => self.mode = Mode::TaskDetail { task_id },
            FormAction::Submit => {
                let updated = form
                    .to_update()
                    .map_err(|msg| format!("Error: {msg}"))
                    .and_then(|patch| {
                        self.store
                            .update(&task_id, patch)
                            .map_err(|e| format!("Error: {e}"))
                    });
                match updated {
                    Ok(task) => {
                        self.status_message = Some(format!("Saved: {}", task.title));
                        self.mode = Mode::TaskDetail { task_id };
                    }
                    Err(msg) => {
                        self.status_message = Some(msg);
                        self.mode = Mode::EditTask { task_id, form };
                    }
                }
            }
        }
    }

    fn handle_task_detail(&mut self, key: KeyEvent, task_id: String) {
        let Some(task) = self.store.get(&task_id).cloned() else {
            self.mode = Mode::Normal;
            return;
        };
        match key.code {
            KeyCode::Esc | KeyCode::Enter => self.mode = Mode::Normal,
            KeyCode::Char('e') => {
                self.mode = Mode::EditTask {
                    form: TaskForm::from_task(&task),
                    task_id,
                };
            }
            KeyCode::Char('x') | KeyCode::Char(' ') => self.toggle_completed(&task_id),
            KeyCode::Char('p') => {
                self.mode = Mode::PriorityPick {
                    task_id,
                    current: task.priority,
                };
            }
            KeyCode::Char('d') => {
                self.mode = Mode::ConfirmDelete {
                    task_id,
                    title: task.title,
                };
            }
            _ => {}
        }
    }

    fn handle_confirm_delete(&mut self, key: KeyEvent, task_id: String, title: String) {
        if let KeyCode::Char('y') | KeyCode::Char('Y') = key.code {
            match self.store.delete(&task_id) {
                Ok(()) => self.status_message = Some(format!("Deleted: {title}")),
                Err(e) => self.report_error(e),
            }
        }
        self.mode = Mode::Normal;
    }

    fn handle_priority_pick(&mut self, key: KeyEvent, task_id: String) {
        let priority = match key.code {
            KeyCode::Char('1') => Some(Priority::High),
            KeyCode::Char('2') => Some(Priority::Medium),
            KeyCode::Char('3') => Some(Priority::Low),
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                return;
            }
            _ => None,
        };

        if let Some(p) = priority {
            let patch = UpdateTask {
                priority: Some(p),
                ..Default::default()
            };
            match self.store.update(&task_id, patch) {
                Ok(_) => self.status_message = Some(format!("Priority: {p}")),
                Err(e) => self.report_error(e),
            }
        }
        self.mode = Mode::Normal;
    }

    // -- Rendering --

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let now = daybook_core::local_now();
        let stats = self.store.stats();
        let tags = self.hashtag_choices();

        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(area);

        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(32), Constraint::Min(0)])
            .split(layout[1]);

        let sidebar_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(6),
                Constraint::Length(8),
                Constraint::Min(0),
            ])
            .split(body[0]);

        let main_rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0)])
            .split(body[1]);

        self.render_title_bar(frame, layout[0]);
        sidebar::render_categories(frame, sidebar_rows[0], &self.view, &stats);
        sidebar::render_stats(frame, sidebar_rows[1], &stats);
        let picker = match &self.mode {
            Mode::HashtagPick { list_state } => Some(list_state),
            _ => None,
        };
        sidebar::render_hashtags(frame, sidebar_rows[2], &tags, &self.view.hashtags, picker);

        self.strip
            .render(frame, main_rows[0], self.store.list(), self.view.date, now.date());
        self.list
            .render(frame, main_rows[1], &self.list_title(), self.view.is_narrowed());
        self.render_status_bar(frame, layout[2]);

        // Overlays
        match &self.mode {
            Mode::Normal | Mode::HashtagPick { .. } => {}
            Mode::Search { .. } => self.render_input_bar(frame, "Search: ", &self.view.search, area),
            Mode::NewTask { form } => form.render(frame, "New Task", area),
            Mode::EditTask { form, .. } => form.render(frame, "Edit Task", area),
            Mode::TaskDetail { task_id } => {
                if let Some(task) = self.store.get(task_id) {
                    self.render_task_detail(frame, task, area);
                }
            }
            Mode::ConfirmDelete { title, .. } => {
                self.render_confirm_delete_dialog(frame, title, area)
            }
            Mode::PriorityPick { current, .. } => {
                self.render_priority_pick(frame, *current, area)
            }
        }
    }

    fn list_title(&self) -> String {
        match self.view.date {
            Some(date) => date.format("%A, %B %-d").to_string(),
            None => format!("{} tasks", self.view.category.display_name()),
        }
    }

    fn render_title_bar(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            " daybook ",
            Style::default().bold().fg(Color::Cyan),
        )];
        if let Some(name) = &self.username {
            spans.push(Span::raw("| "));
            spans.push(Span::styled(name.as_str(), Style::default().fg(Color::Yellow)));
        }
        if !self.view.search.trim().is_empty() {
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(
                format!("search: \"{}\"", self.view.search),
                Style::default().fg(Color::Green),
            ));
        }
        if !self.view.hashtags.is_empty() {
            let tags: Vec<String> = self.view.hashtags.iter().map(|t| format!("#{t}")).collect();
            spans.push(Span::raw(" | "));
            spans.push(Span::styled(tags.join(" "), Style::default().fg(Color::Magenta)));
        }
        frame.render_widget(Line::from(spans), area);
    }

    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if let Some(ref msg) = self.status_message {
            let color = if msg.starts_with("Error") {
                Color::Red
            } else {
                Color::Green
            };
            let line = Line::from(Span::styled(format!(" {msg}"), Style::default().fg(color)));
            frame.render_widget(line, area);
            return;
        }

        let hints = match &self.mode {
            Mode::Normal => vec![
                ("q", "quit"),
                ("j/k", "tasks"),
                ("h/l", "day"),
                ("H/L", "week"),
                ("t", "today"),
                ("Tab/1-4", "category"),
                ("/", "search"),
                ("#", "tags"),
                ("n", "new"),
                ("x", "done"),
                ("e", "edit"),
                ("d", "del"),
                ("p", "priority"),
                ("r", "refresh"),
                ("Esc", "clear"),
            ],
            Mode::Search { .. } => vec![("Enter", "keep"), ("Esc", "revert")],
            Mode::HashtagPick { .. } => vec![
                ("j/k", "nav"),
                ("Space", "toggle"),
                ("c", "clear"),
                ("Esc", "back"),
            ],
            Mode::NewTask { .. } | Mode::EditTask { .. } => vec![
                ("Tab", "field"),
                ("←/→", "priority"),
                ("Enter", "save"),
                ("Esc", "cancel"),
            ],
            Mode::TaskDetail { .. } => vec![
                ("e", "edit"),
                ("x", "done"),
                ("p", "priority"),
                ("d", "del"),
                ("Esc", "back"),
            ],
            Mode::ConfirmDelete { .. } => vec![("y", "confirm"), ("any", "cancel")],
            Mode::PriorityPick { .. } => vec![
                ("1", "high"),
                ("2", "medium"),
                ("3", "low"),
                ("Esc", "cancel"),
            ],
        };

        let spans: Vec<Span> = hints
            .into_iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(format!(" {key}"), Style::default().fg(Color::Yellow).bold()),
                    Span::raw(format!(" {desc} ")),
                ]
            })
            .collect();

        frame.render_widget(Line::from(spans), area);
    }

    fn render_input_bar(&self, frame: &mut Frame, label: &str, input: &str, area: Rect) {
        let input_area = Rect {
            x: area.x,
            y: area.y + area.height.saturating_sub(3),
            width: area.width,
            height: 3.min(area.height),
        };
        frame.render_widget(Clear, input_area);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(label);
        frame.render_widget(Paragraph::new(input).block(block), input_area);
    }

    fn render_task_detail(&self, frame: &mut Frame, task: &Task, area: Rect) {
        let popup = centered_rect(60, 60, area);
        frame.render_widget(Clear, popup);

        let title = match &task.icon {
            Some(icon) => format!(" {icon} {} ", task.title),
            None => format!(" {} ", task.title),
        };
        let block = Block::default()
            .title(title)
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));

        let label = Style::default().fg(Color::DarkGray);
        let when = match &task.time {
            Some(time) => format!("{} at {time}", task.date.format("%A, %B %-d, %Y")),
            None => task.date.format("%A, %B %-d, %Y").to_string(),
        };
        let (state, state_style) = if task.completed {
            ("Completed", Style::default().fg(Color::Green))
        } else {
            ("Open", Style::default().fg(Color::Yellow))
        };
        let tags = if task.hashtags.is_empty() {
            "(none)".to_string()
        } else {
            task.hashtags
                .iter()
                .map(|t| format!("#{t}"))
                .collect::<Vec<_>>()
                .join(" ")
        };

        let mut lines = vec![
            Line::from(vec![Span::styled("When:     ", label), Span::raw(when)]),
            Line::from(vec![
                Span::styled("Status:   ", label),
                Span::styled(state, state_style),
            ]),
            Line::from(vec![
                Span::styled("Priority: ", label),
                Span::styled(task.priority.display_name(), priority_style(task.priority)),
            ]),
            Line::from(vec![
                Span::styled("Tags:     ", label),
                Span::styled(tags, Style::default().fg(Color::Magenta)),
            ]),
            Line::from(vec![
                Span::styled("Updated:  ", label),
                Span::raw(task.updated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
            ]),
            Line::from(""),
        ];
        match &task.description {
            Some(desc) => lines.extend(desc.lines().map(|l| Line::from(l.to_string()))),
            None => lines.push(Line::from(Span::styled("(no description)", label))),
        }

        let paragraph = Paragraph::new(lines)
            .block(block)
            .wrap(Wrap { trim: false });
        frame.render_widget(paragraph, popup);
    }

    fn render_confirm_delete_dialog(&self, frame: &mut Frame, title: &str, area: Rect) {
        let popup = centered_rect(50, 20, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Confirm Delete ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red));

        let text = format!("Delete \"{title}\"?\n\n(y)es / (any key) cancel");
        let paragraph = Paragraph::new(text)
            .block(block)
            .wrap(Wrap { trim: false })
            .alignment(Alignment::Center);
        frame.render_widget(paragraph, popup);
    }

    fn render_priority_pick(&self, frame: &mut Frame, current: Priority, area: Rect) {
        let popup = centered_rect(30, 25, area);
        frame.render_widget(Clear, popup);

        let block = Block::default()
            .title(" Set Priority ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Yellow));

        let lines: Vec<Line> = Priority::ALL
            .iter()
            .enumerate()
            .map(|(i, &p)| {
                let marker = if p == current { "> " } else { "  " };
                Line::from(vec![
                    Span::raw(marker),
                    Span::styled(format!("[{}] ", i + 1), Style::default().fg(Color::Yellow).bold()),
                    Span::styled(p.display_name(), priority_style(p)),
                ])
            })
            .collect();

        frame.render_widget(Paragraph::new(lines).block(block), popup);
    }
}
