use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::task::Task;

/// How many tags the sidebar offers as quick filters.
pub const RECENT_HASHTAG_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HashtagUsage {
    pub name: String,
    pub count: usize,
    pub last_used: DateTime<Utc>,
}

/// Most recently used hashtags, newest first, at most `limit` entries.
///
/// `last_used` is the latest `updated_at` among the tasks carrying the tag and
/// `count` is its total number of occurrences. Tags sharing a timestamp keep
/// the order in which they were first seen.
pub fn recent_hashtags(tasks: &[Task], limit: usize) -> Vec<HashtagUsage> {
    let mut usage: Vec<HashtagUsage> = Vec::new();
    for task in tasks {
        for tag in &task.hashtags {
            match usage.iter_mut().find(|u| &u.name == tag) {
                Some(entry) => {
                    entry.count += 1;
                    entry.last_used = entry.last_used.max(task.updated_at);
                }
                None => usage.push(HashtagUsage {
                    name: tag.clone(),
                    count: 1,
                    last_used: task.updated_at,
                }),
            }
        }
    }

    usage.sort_by(|a, b| b.last_used.cmp(&a.last_used));
    usage.truncate(limit);
    usage
}
