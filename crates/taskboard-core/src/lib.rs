pub mod errors;
pub mod ids;
pub mod notification;
pub mod task;

pub use errors::{RemoteError, ValidationError};
pub use ids::{NotificationId, TaskId};
pub use notification::{Notification, Severity};
pub use task::{Task, TaskDraft, TaskStatus};
