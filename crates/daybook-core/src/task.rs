use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::calendar::parse_time;
use crate::DaybookError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "LOW", alias = "Low")]
    Low,
    #[default]
    #[serde(alias = "MEDIUM", alias = "Medium")]
    Medium,
    #[serde(alias = "HIGH", alias = "High")]
    High,
}

impl Priority {
    /// Highest first, the order the stats panel and day indicators use.
    pub const ALL: &[Priority] = &[Priority::High, Priority::Medium, Priority::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Priority::Low => "↓",
            Priority::Medium => "-",
            Priority::High => "↑",
        }
    }

    /// Case-insensitive; `"HIGH"`, `"High"` and `"high"` all parse.
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Some(Priority::Low),
            "medium" => Some(Priority::Medium),
            "high" => Some(Priority::High),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub user_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    pub completed: bool,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    pub priority: Priority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Calendar-day equality; the time of day never participates.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date == day
    }

    pub fn is_today(&self, now: NaiveDateTime) -> bool {
        self.is_on(now.date())
    }

    /// Scheduled strictly after `now` and still open. A task dated today
    /// starts at midnight, which is never after `now`, so "today" and
    /// "upcoming" cannot overlap.
    pub fn is_upcoming(&self, now: NaiveDateTime) -> bool {
        !self.completed && self.date.and_time(NaiveTime::MIN) > now
    }

    pub fn has_any_hashtag(&self, tags: &[String]) -> bool {
        tags.iter().any(|tag| self.hashtags.contains(tag))
    }

    /// Case-insensitive substring match on title or description.
    pub fn matches_text(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        self.title.to_lowercase().contains(&needle)
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(&needle))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub date: NaiveDate,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub priority: Priority,
}

impl CreateTask {
    pub fn new(title: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            date,
            time: None,
            icon: None,
            hashtags: Vec::new(),
            priority: Priority::default(),
        }
    }

    pub fn validate(&self) -> Result<(), DaybookError> {
        validate_title(&self.title)?;
        validate_time(self.time.as_deref())
    }

    /// Trim text fields, drop blank optionals and clean up the hashtag list.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.description = blank_to_none(self.description);
        self.time = blank_to_none(self.time);
        self.icon = blank_to_none(self.icon);
        self.hashtags = normalize_hashtags(self.hashtags);
        self
    }
}

/// Partial edit. Absent fields are left alone; for the nullable ones an
/// explicit `null` clears the stored value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTask {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub time: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub icon: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hashtags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
}

impl UpdateTask {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn validate(&self) -> Result<(), DaybookError> {
        if let Some(ref title) = self.title {
            validate_title(title)?;
        }
        if let Some(Some(ref time)) = self.time {
            validate_time(Some(time))?;
        }
        Ok(())
    }

    pub fn normalized(mut self) -> Self {
        self.title = self.title.map(|t| t.trim().to_string());
        self.description = self.description.map(blank_to_none);
        self.time = self.time.map(blank_to_none);
        self.icon = self.icon.map(blank_to_none);
        self.hashtags = self.hashtags.map(normalize_hashtags);
        self
    }

    /// Merge the patch into `task` in place. Only supplied fields change.
    pub fn apply_to(&self, task: &mut Task) {
        if let Some(ref title) = self.title {
            task.title = title.clone();
        }
        if let Some(ref description) = self.description {
            task.description = description.clone();
        }
        if let Some(date) = self.date {
            task.date = date;
        }
        if let Some(ref time) = self.time {
            task.time = time.clone();
        }
        if let Some(completed) = self.completed {
            task.completed = completed;
        }
        if let Some(ref icon) = self.icon {
            task.icon = icon.clone();
        }
        if let Some(ref hashtags) = self.hashtags {
            task.hashtags = hashtags.clone();
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
    }
}

/// Trim each tag, strip a leading `#`, drop empties and repeats while
/// keeping first-seen order.
pub fn normalize_hashtags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim().trim_start_matches('#').trim();
        if !tag.is_empty() && !out.iter().any(|t| t == tag) {
            out.push(tag.to_string());
        }
    }
    out
}

fn validate_title(title: &str) -> Result<(), DaybookError> {
    if title.trim().is_empty() {
        return Err(DaybookError::InvalidInput("title must not be empty".into()));
    }
    Ok(())
}

fn validate_time(time: Option<&str>) -> Result<(), DaybookError> {
    match time.map(str::trim) {
        None | Some("") => Ok(()),
        Some(t) if parse_time(t).is_some() => Ok(()),
        Some(t) => Err(DaybookError::InvalidInput(format!(
            "time must be HH:MM, got {t:?}"
        ))),
    }
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(de).map(Some)
}
