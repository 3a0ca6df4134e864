use std::sync::Arc;

use async_trait::async_trait;
use taskboard_core::{RemoteError, Task, TaskDraft, TaskId};

/// CRUD over the remote task resource. Each call is exactly one round-trip;
/// implementations never retry.
#[async_trait]
pub trait TaskGateway: Send + Sync {
    /// Current task collection, pagination envelope already stripped.
    async fn list(&self) -> Result<Vec<Task>, RemoteError>;

    /// Create a task. The server assigns `id` and `created_at`.
    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError>;

    /// Send a partial or full draft. Absent fields are passed through as absent.
    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, RemoteError>;

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError>;
}

#[async_trait]
impl<G: TaskGateway + ?Sized> TaskGateway for Arc<G> {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        (**self).list().await
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        (**self).create(draft).await
    }

    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, RemoteError> {
        (**self).update(id, draft).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        (**self).delete(id).await
    }
}
