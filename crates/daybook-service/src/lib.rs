mod blocking;
mod http;
mod local;
mod store;
mod traits;

pub use blocking::BlockingTaskStore;
pub use http::HttpService;
pub use local::LocalService;
pub use store::TaskStore;
pub use traits::{ServiceError, TaskService};
