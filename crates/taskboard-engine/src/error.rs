use taskboard_core::{RemoteError, TaskId, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("remote error: {0}")]
    Remote(#[from] RemoteError),

    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    #[error("no task form is open")]
    NoFormOpen,
}
