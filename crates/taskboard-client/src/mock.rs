use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use taskboard_core::{RemoteError, Task, TaskDraft, TaskId};

use crate::gateway::TaskGateway;

/// Pre-programmed gateway outcomes for deterministic tests without a server.
#[derive(Clone, Debug)]
pub enum MockResponse {
    /// Result of `list()`.
    Tasks(Vec<Task>),
    /// Result of `create()` / `update()`.
    Task(Task),
    /// Result of `delete()`.
    Deleted,
    Error(RemoteError),
    /// Wait (on the tokio clock), then resolve with the inner response.
    Delay(Duration, Box<MockResponse>),
}

impl MockResponse {
    pub fn delayed(delay: Duration, inner: MockResponse) -> Self {
        Self::Delay(delay, Box::new(inner))
    }
}

/// A recorded gateway invocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MockCall {
    List,
    Create(TaskDraft),
    Update(TaskId, TaskDraft),
    Delete(TaskId),
}

#[derive(Default)]
struct Script {
    list: VecDeque<MockResponse>,
    create: VecDeque<MockResponse>,
    update: VecDeque<MockResponse>,
    delete: VecDeque<MockResponse>,
}

/// Gateway returning scripted responses per operation, in order.
/// The last response scripted for an operation repeats once the others
/// are used up.
#[derive(Default)]
pub struct MockGateway {
    script: Mutex<Script>,
    calls: Mutex<Vec<MockCall>>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_list(self, response: MockResponse) -> Self {
        self.script.lock().list.push_back(response);
        self
    }

    pub fn on_create(self, response: MockResponse) -> Self {
        self.script.lock().create.push_back(response);
        self
    }

    pub fn on_update(self, response: MockResponse) -> Self {
        self.script.lock().update.push_back(response);
        self
    }

    pub fn on_delete(self, response: MockResponse) -> Self {
        self.script.lock().delete.push_back(response);
        self
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    pub fn list_calls(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, MockCall::List))
            .count()
    }

    fn next(&self, call: MockCall) -> Option<MockResponse> {
        let mut script = self.script.lock();
        let queue = match &call {
            MockCall::List => &mut script.list,
            MockCall::Create(_) => &mut script.create,
            MockCall::Update(..) => &mut script.update,
            MockCall::Delete(_) => &mut script.delete,
        };
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        self.calls.lock().push(call);
        response
    }

    async fn resolve(&self, op: &str, response: Option<MockResponse>) -> Result<MockResponse, RemoteError> {
        let mut response = response.ok_or_else(|| {
            RemoteError::Network(format!("MockGateway: no response configured for {op}"))
        })?;
        loop {
            match response {
                MockResponse::Delay(delay, inner) => {
                    tokio::time::sleep(delay).await;
                    response = *inner;
                }
                MockResponse::Error(e) => return Err(e),
                other => return Ok(other),
            }
        }
    }
}

fn unexpected(op: &str, response: &MockResponse) -> RemoteError {
    RemoteError::Decode(format!("MockGateway: {op} scripted with {response:?}"))
}

#[async_trait]
impl TaskGateway for MockGateway {
    async fn list(&self) -> Result<Vec<Task>, RemoteError> {
        let scripted = self.next(MockCall::List);
        match self.resolve("list", scripted).await? {
            MockResponse::Tasks(tasks) => Ok(tasks),
            other => Err(unexpected("list", &other)),
        }
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let scripted = self.next(MockCall::Create(draft.clone()));
        match self.resolve("create", scripted).await? {
            MockResponse::Task(task) => Ok(task),
            other => Err(unexpected("create", &other)),
        }
    }

    async fn update(&self, id: &TaskId, draft: &TaskDraft) -> Result<Task, RemoteError> {
        let scripted = self.next(MockCall::Update(id.clone(), draft.clone()));
        match self.resolve("update", scripted).await? {
            MockResponse::Task(task) => Ok(task),
            other => Err(unexpected("update", &other)),
        }
    }

    async fn delete(&self, id: &TaskId) -> Result<(), RemoteError> {
        let scripted = self.next(MockCall::Delete(id.clone()));
        match self.resolve("delete", scripted).await? {
            MockResponse::Deleted => Ok(()),
            other => Err(unexpected("delete", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use taskboard_core::TaskStatus;

    fn task(id: &str) -> Task {
        Task {
            id: TaskId::from_raw(id),
            title: id.to_uppercase(),
            description: None,
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn responses_are_consumed_in_order_and_last_repeats() {
        let mock = MockGateway::new()
            .on_list(MockResponse::Tasks(vec![task("a")]))
            .on_list(MockResponse::Tasks(vec![task("a"), task("b")]));

        assert_eq!(mock.list().await.unwrap().len(), 1);
        assert_eq!(mock.list().await.unwrap().len(), 2);
        assert_eq!(mock.list().await.unwrap().len(), 2);
        assert_eq!(mock.list_calls(), 3);
    }

    #[tokio::test]
    async fn unscripted_operation_fails() {
        let mock = MockGateway::new();
        assert!(mock.delete(&TaskId::from_raw("x")).await.is_err());
        assert_eq!(mock.calls(), vec![MockCall::Delete(TaskId::from_raw("x"))]);
    }

    #[tokio::test]
    async fn records_update_payloads() {
        let mock = MockGateway::new().on_update(MockResponse::Error(RemoteError::Server {
            status: 500,
            body: "boom".into(),
        }));
        let draft = TaskDraft::status_only(TaskStatus::Done);
        let err = mock.update(&TaskId::from_raw("a"), &draft).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert_eq!(mock.calls(), vec![MockCall::Update(TaskId::from_raw("a"), draft)]);
    }

    #[tokio::test(start_paused = true)]
    async fn delay_waits_on_tokio_clock() {
        let mock = MockGateway::new().on_list(MockResponse::delayed(
            Duration::from_secs(5),
            MockResponse::Tasks(vec![]),
        ));
        let started = tokio::time::Instant::now();
        mock.list().await.unwrap();
        assert!(started.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test]
    async fn mismatched_script_is_reported() {
        let mock = MockGateway::new().on_create(MockResponse::Deleted);
        let err = mock.create(&TaskDraft::default()).await.unwrap_err();
        assert!(err.to_string().contains("create"));
    }
}
