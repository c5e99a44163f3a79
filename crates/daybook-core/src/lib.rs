pub mod calendar;
pub mod error;
pub mod filter;
pub mod hashtag;
pub mod stats;
pub mod task;
pub mod user;

pub use error::DaybookError;
pub use filter::{Category, TaskView};
pub use hashtag::{recent_hashtags, HashtagUsage, RECENT_HASHTAG_LIMIT};
pub use stats::{PriorityCounts, TaskStats};
pub use task::{CreateTask, Priority, Task, UpdateTask};
pub use user::{AuthResponse, Credentials, Session, User};

/// Wall-clock time in the local timezone, the reference point for the
/// "today" and "upcoming" predicates.
pub fn local_now() -> chrono::NaiveDateTime {
    chrono::Local::now().naive_local()
}
