use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use taskboard_client::TaskGateway;
use taskboard_core::{Notification, NotificationId, Task, TaskDraft, TaskId, TaskStatus};
use taskboard_settings::TaskboardSettings;
use taskboard_store::{NotificationQueue, TaskStore};

use crate::error::EngineError;
use crate::fetch::{FetchCoordinator, TASKS_KEY};
use crate::form::TaskForm;
use crate::view::{filter_and_sort, SortOrder, StatusFilter};

pub const LOAD_FAILED: &str = "Failed to load tasks";
pub const STATUS_UPDATED: &str = "Task status updated";
pub const STATUS_FAILED: &str = "Failed to update task status";
pub const TASK_SAVED: &str = "Task saved";
pub const SAVE_FAILED: &str = "Failed to save task";
pub const TASK_DELETED: &str = "Task deleted";
pub const DELETE_FAILED: &str = "Failed to delete task";

#[derive(Default)]
struct ViewState {
    filter: StatusFilter,
    sort: SortOrder,
    form: Option<TaskForm>,
    detail: Option<TaskId>,
    open_menu: Option<TaskId>,
}

/// The task list as a user interacts with it.
///
/// Every mutating action follows the same shape: one gateway call, then on
/// success a store update, a success notification and an awaited
/// revalidation of the list. On failure exactly one error notification is
/// raised and the store is left as it was.
pub struct TaskBoard {
    gateway: Arc<dyn TaskGateway>,
    store: TaskStore,
    notifications: NotificationQueue,
    fetcher: FetchCoordinator,
    view: Mutex<ViewState>,
}

impl TaskBoard {
    pub fn new(gateway: Arc<dyn TaskGateway>, store: TaskStore, notifications: NotificationQueue) -> Self {
        let fetcher = FetchCoordinator::new(Arc::clone(&gateway), store.clone());
        Self {
            gateway,
            store,
            notifications,
            fetcher,
            view: Mutex::new(ViewState::default()),
        }
    }

    /// Board with an empty cache and notification lifetimes from settings.
    pub fn from_settings(gateway: Arc<dyn TaskGateway>, settings: &TaskboardSettings) -> Self {
        let notifications = NotificationQueue::new(settings.notifications.clone());
        Self::new(gateway, TaskStore::new(), notifications)
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub fn notification_queue(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn fetcher(&self) -> &FetchCoordinator {
        &self.fetcher
    }

    // ── Loading ──

    /// Initial fetch of the list.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<(), EngineError> {
        match self.fetcher.fetch(TASKS_KEY).await {
            Ok(tasks) => {
                info!(count = tasks.len(), "tasks loaded");
                Ok(())
            }
            Err(e) => Err(self.reject(LOAD_FAILED, e)),
        }
    }

    // ── List view ──

    pub fn visible_tasks(&self) -> Vec<Task> {
        let (filter, sort) = {
            let view = self.view.lock();
            (view.filter, view.sort)
        };
        filter_and_sort(&self.store.snapshot(), filter, sort)
    }

    pub fn filter(&self) -> StatusFilter {
        self.view.lock().filter
    }

    pub fn set_filter(&self, filter: StatusFilter) {
        self.view.lock().filter = filter;
    }

    pub fn sort(&self) -> SortOrder {
        self.view.lock().sort
    }

    pub fn set_sort(&self, sort: SortOrder) {
        self.view.lock().sort = sort;
    }

    /// Open the row menu for `id`, or close it if it is already open.
    /// Opening one menu closes any other.
    pub fn toggle_menu(&self, id: &TaskId) {
        let mut view = self.view.lock();
        view.open_menu = match view.open_menu.take() {
            Some(open) if open == *id => None,
            _ => Some(id.clone()),
        };
    }

    pub fn open_menu(&self) -> Option<TaskId> {
        self.view.lock().open_menu.clone()
    }

    // ── Detail view ──

    pub fn select(&self, id: &TaskId) -> Result<(), EngineError> {
        self.require(id)?;
        let mut view = self.view.lock();
        view.detail = Some(id.clone());
        view.open_menu = None;
        Ok(())
    }

    pub fn close_detail(&self) {
        self.view.lock().detail = None;
    }

    /// The selected task as currently cached. `None` once it is deleted.
    pub fn detail(&self) -> Option<Task> {
        let selected = self.view.lock().detail.clone()?;
        self.store.get(&selected)
    }

    // ── Actions ──

    /// Swap between done and pending. An in-progress task becomes done.
    pub async fn toggle_completion(&self, id: &TaskId) -> Result<(), EngineError> {
        let task = self.require(id)?;
        self.change_status(id, task.status.toggled()).await
    }

    #[instrument(skip(self, id, status), fields(task_id = %id, status = status.as_wire()))]
    pub async fn change_status(&self, id: &TaskId, status: TaskStatus) -> Result<(), EngineError> {
        let draft = TaskDraft::status_only(status);
        if let Err(e) = self.gateway.update(id, &draft).await {
            return Err(self.reject(STATUS_FAILED, e));
        }
        self.store.apply_status_change(id, status);
        self.close_menu_for(id);
        self.succeed(STATUS_UPDATED).await;
        Ok(())
    }

    #[instrument(skip(self, id), fields(task_id = %id))]
    pub async fn delete(&self, id: &TaskId) -> Result<(), EngineError> {
        if let Err(e) = self.gateway.delete(id).await {
            return Err(self.reject(DELETE_FAILED, e));
        }
        self.store.apply_delete(id);
        {
            let mut view = self.view.lock();
            if view.detail.as_ref() == Some(id) {
                view.detail = None;
            }
            if view.open_menu.as_ref() == Some(id) {
                view.open_menu = None;
            }
        }
        self.succeed(TASK_DELETED).await;
        Ok(())
    }

    // ── Form ──

    pub fn open_create_form(&self) {
        self.view.lock().form = Some(TaskForm::create());
    }

    pub fn open_edit_form(&self, id: &TaskId) -> Result<(), EngineError> {
        let task = self.require(id)?;
        let mut view = self.view.lock();
        view.form = Some(TaskForm::edit(&task));
        view.open_menu = None;
        Ok(())
    }

    /// Discard the open form and its input.
    pub fn close_form(&self) {
        self.view.lock().form = None;
    }

    pub fn form(&self) -> Option<TaskForm> {
        self.view.lock().form.clone()
    }

    /// Edit the open form's fields in place.
    pub fn update_form(&self, edit: impl FnOnce(&mut TaskForm)) -> Result<(), EngineError> {
        let mut view = self.view.lock();
        let form = view.form.as_mut().ok_or(EngineError::NoFormOpen)?;
        edit(form);
        Ok(())
    }

    /// Create or update from the open form. The form stays open on failure.
    #[instrument(skip(self))]
    pub async fn submit_form(&self) -> Result<Task, EngineError> {
        let form = self.form().ok_or(EngineError::NoFormOpen)?;
        let draft = match form.to_draft() {
            Ok(draft) => draft,
            Err(e) => {
                let message = format!("{SAVE_FAILED}: {e}");
                return Err(self.reject(&message, e));
            }
        };

        let saved = match form.editing() {
            Some(id) => {
                let saved = self
                    .gateway
                    .update(id, &draft)
                    .await
                    .map_err(|e| self.reject(SAVE_FAILED, e))?;
                self.store.apply_update(id, &draft);
                saved
            }
            None => {
                let created = self
                    .gateway
                    .create(&draft)
                    .await
                    .map_err(|e| self.reject(SAVE_FAILED, e))?;
                self.store.apply_create(created.clone());
                created
            }
        };
        debug!(task_id = %saved.id, "task saved");

        {
            let mut view = self.view.lock();
            if view.form.as_ref() == Some(&form) {
                view.form = None;
            }
        }
        self.succeed(TASK_SAVED).await;
        Ok(saved)
    }

    // ── Notifications ──

    pub fn notifications(&self) -> Vec<Notification> {
        self.notifications.snapshot()
    }

    pub fn dismiss_notification(&self, id: &NotificationId) -> bool {
        self.notifications.dismiss(id)
    }

    // ── Helpers ──

    fn require(&self, id: &TaskId) -> Result<Task, EngineError> {
        self.store
            .get(id)
            .ok_or_else(|| EngineError::TaskNotFound(id.clone()))
    }

    fn close_menu_for(&self, id: &TaskId) {
        let mut view = self.view.lock();
        if view.open_menu.as_ref() == Some(id) {
            view.open_menu = None;
        }
    }

    async fn succeed(&self, message: &str) {
        self.notifications.success(message);
        // The mutation already landed; a failed refresh keeps the local copy.
        if let Err(e) = self.fetcher.revalidate(TASKS_KEY).await {
            warn!(error = %e, kind = e.error_kind(), "revalidation after mutation failed");
        }
    }

    fn reject(&self, message: &str, err: impl Into<EngineError>) -> EngineError {
        let err = err.into();
        warn!(error = %err, "{message}");
        self.notifications.error(message);
        err
    }
}
