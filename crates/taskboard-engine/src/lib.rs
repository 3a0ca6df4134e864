pub mod board;
pub mod error;
pub mod fetch;
pub mod form;
pub mod view;

pub use board::TaskBoard;
pub use error::EngineError;
pub use fetch::{FetchCoordinator, TASKS_KEY};
pub use form::{parse_due_date, FormMode, TaskForm};
pub use view::{filter_and_sort, SortOrder, StatusFilter};
