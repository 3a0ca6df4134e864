pub mod notifications;
pub mod tasks;

pub use notifications::{DismissReason, NotificationEvent, NotificationQueue};
pub use tasks::TaskStore;
