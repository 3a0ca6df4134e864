use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::{debug, trace};

use taskboard_core::{Task, TaskDraft, TaskId, TaskStatus};

/// Client-held cache of the task collection.
///
/// Cheap to clone; clones share state. Every mutator takes the write lock,
/// reads the latest contents and writes back in one step, so back-to-back
/// mutations never work from a stale snapshot. Ids stay unique.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<Inner>,
}

struct Inner {
    tasks: RwLock<Vec<Task>>,
    revision: watch::Sender<u64>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                tasks: RwLock::new(Vec::new()),
                revision,
            }),
        }
    }

    /// Current cached sequence, in cache order.
    pub fn snapshot(&self) -> Vec<Task> {
        self.inner.tasks.read().clone()
    }

    pub fn get(&self, id: &TaskId) -> Option<Task> {
        self.inner.tasks.read().iter().find(|t| t.id == *id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.tasks.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.tasks.read().is_empty()
    }

    /// Bumped after every mutation that changed the cache.
    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Receiver that wakes whenever the revision changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Replace the whole cache with a fetch result, keeping input order.
    /// A duplicated id keeps its first position with the last value.
    pub fn replace_all(&self, tasks: Vec<Task>) {
        let mut positions: HashMap<TaskId, usize> = HashMap::with_capacity(tasks.len());
        let mut deduped: Vec<Task> = Vec::with_capacity(tasks.len());
        for task in tasks {
            match positions.get(&task.id) {
                Some(&pos) => {
                    debug!(task_id = %task.id, "duplicate id in fetch result, keeping latest");
                    deduped[pos] = task;
                }
                None => {
                    positions.insert(task.id.clone(), deduped.len());
                    deduped.push(task);
                }
            }
        }
        let count = deduped.len();
        *self.inner.tasks.write() = deduped;
        self.bump();
        debug!(count, "task cache replaced");
    }

    /// Replace only the status of one task. No-op when the id is unknown.
    pub fn apply_status_change(&self, id: &TaskId, status: TaskStatus) -> bool {
        self.mutate_one(id, |task| task.status = status)
    }

    /// Shallow-merge a draft into one task. No-op when the id is unknown.
    pub fn apply_update(&self, id: &TaskId, draft: &TaskDraft) -> bool {
        self.mutate_one(id, |task| task.merge(draft))
    }

    /// Append a newly created task. An id already in the cache is
    /// overwritten in place instead.
    pub fn apply_create(&self, task: Task) {
        {
            let mut tasks = self.inner.tasks.write();
            if let Some(existing) = tasks.iter_mut().find(|t| t.id == task.id) {
                debug!(task_id = %task.id, "created task already cached, replacing");
                *existing = task;
            } else {
                tasks.push(task);
            }
        }
        self.bump();
    }

    /// Remove one task. No-op when the id is unknown.
    pub fn apply_delete(&self, id: &TaskId) -> bool {
        let removed = {
            let mut tasks = self.inner.tasks.write();
            let before = tasks.len();
            tasks.retain(|t| t.id != *id);
            tasks.len() != before
        };
        if removed {
            self.bump();
        } else {
            trace!(task_id = %id, "delete for unknown task ignored");
        }
        removed
    }

    fn mutate_one(&self, id: &TaskId, f: impl FnOnce(&mut Task)) -> bool {
        let applied = {
            let mut tasks = self.inner.tasks.write();
            match tasks.iter_mut().find(|t| t.id == *id) {
                Some(task) => {
                    f(task);
                    true
                }
                None => false,
            }
        };
        if applied {
            self.bump();
        } else {
            trace!(task_id = %id, "mutation for unknown task ignored");
        }
        applied
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|r| *r += 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn task(id: &str, title: &str, status: TaskStatus) -> Task {
        Task {
            id: TaskId::from_raw(id),
            title: title.into(),
            description: None,
            status,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            completed_at: None,
        }
    }

    fn id(s: &str) -> TaskId {
        TaskId::from_raw(s)
    }

    #[test]
    fn replace_all_round_trips_in_order() {
        let store = TaskStore::new();
        let tasks = vec![
            task("c", "C", TaskStatus::Done),
            task("a", "A", TaskStatus::Pending),
            task("b", "B", TaskStatus::InProgress),
        ];
        store.replace_all(tasks.clone());
        assert_eq!(store.snapshot(), tasks);
    }

    #[test]
    fn replace_all_collapses_duplicate_ids() {
        let store = TaskStore::new();
        store.replace_all(vec![
            task("a", "old", TaskStatus::Pending),
            task("b", "B", TaskStatus::Pending),
            task("a", "new", TaskStatus::Done),
        ]);
        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].title, "new");
        assert_eq!(snap[1].id, id("b"));
    }

    #[test]
    fn status_change_touches_only_status() {
        let store = TaskStore::new();
        store.replace_all(vec![task("a", "A", TaskStatus::Pending)]);
        assert!(store.apply_status_change(&id("a"), TaskStatus::Done));
        let t = store.get(&id("a")).unwrap();
        assert_eq!(t.status, TaskStatus::Done);
        assert_eq!(t.title, "A");
    }

    #[test]
    fn mutations_on_unknown_id_are_noops() {
        let store = TaskStore::new();
        store.replace_all(vec![task("a", "A", TaskStatus::Pending)]);
        let before = (store.snapshot(), store.revision());
        assert!(!store.apply_status_change(&id("zz"), TaskStatus::Done));
        assert!(!store.apply_update(&id("zz"), &TaskDraft::status_only(TaskStatus::Done)));
        assert!(!store.apply_delete(&id("zz")));
        assert_eq!((store.snapshot(), store.revision()), before);
    }

    #[test]
    fn update_merges_draft() {
        let store = TaskStore::new();
        store.replace_all(vec![task("a", "A", TaskStatus::Pending)]);
        let due = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        store.apply_update(
            &id("a"),
            &TaskDraft {
                description: Some(Some("notes".into())),
                completed_at: Some(Some(due)),
                ..Default::default()
            },
        );
        let t = store.get(&id("a")).unwrap();
        assert_eq!(t.title, "A");
        assert_eq!(t.description.as_deref(), Some("notes"));
        assert_eq!(t.completed_at, Some(due));
    }

    #[test]
    fn create_appends_and_delete_removes() {
        let store = TaskStore::new();
        store.replace_all(vec![task("a", "A", TaskStatus::Pending)]);
        store.apply_create(task("b", "B", TaskStatus::Pending));
        let ids: Vec<_> = store.snapshot().into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![id("a"), id("b")]);

        assert!(store.apply_delete(&id("a")));
        assert_eq!(store.len(), 1);
        assert!(store.get(&id("a")).is_none());
    }

    #[test]
    fn create_with_existing_id_replaces_in_place() {
        let store = TaskStore::new();
        store.replace_all(vec![
            task("a", "A", TaskStatus::Pending),
            task("b", "B", TaskStatus::Pending),
        ]);
        store.apply_create(task("a", "A2", TaskStatus::Done));
        let snap = store.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap[0].title, "A2");
    }

    #[test]
    fn back_to_back_mutations_compose() {
        let store = TaskStore::new();
        store.replace_all(vec![task("a", "A", TaskStatus::Pending)]);
        let handle = store.clone();
        handle.apply_status_change(&id("a"), TaskStatus::InProgress);
        store.apply_update(
            &id("a"),
            &TaskDraft {
                title: Some("A!".into()),
                ..Default::default()
            },
        );
        let t = store.get(&id("a")).unwrap();
        assert_eq!(t.status, TaskStatus::InProgress);
        assert_eq!(t.title, "A!");
    }

    #[tokio::test]
    async fn subscribers_see_revision_changes() {
        let store = TaskStore::new();
        let mut rx = store.subscribe();
        store.apply_create(task("a", "A", TaskStatus::Pending));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 1);
        assert_eq!(store.revision(), 1);
    }

    #[derive(Clone, Debug)]
    enum Op {
        Create(u8),
        Update(u8),
        Status(u8),
        Delete(u8),
        Replace(Vec<u8>),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0u8..8).prop_map(Op::Create),
            (0u8..8).prop_map(Op::Update),
            (0u8..8).prop_map(Op::Status),
            (0u8..8).prop_map(Op::Delete),
            proptest::collection::vec(0u8..8, 0..6).prop_map(Op::Replace),
        ]
    }

    proptest! {
        #[test]
        fn ids_stay_unique(ops in proptest::collection::vec(op(), 0..40)) {
            let store = TaskStore::new();
            for op in ops {
                match op {
                    Op::Create(n) => store.apply_create(task(&n.to_string(), "t", TaskStatus::Pending)),
                    Op::Update(n) => {
                        store.apply_update(&id(&n.to_string()), &TaskDraft::status_only(TaskStatus::Done));
                    }
                    Op::Status(n) => {
                        store.apply_status_change(&id(&n.to_string()), TaskStatus::InProgress);
                    }
                    Op::Delete(n) => {
                        store.apply_delete(&id(&n.to_string()));
                    }
                    Op::Replace(ns) => store.replace_all(
                        ns.iter().map(|n| task(&n.to_string(), "r", TaskStatus::Pending)).collect(),
                    ),
                }
                let snap = store.snapshot();
                let unique: HashSet<_> = snap.iter().map(|t| t.id.clone()).collect();
                prop_assert_eq!(unique.len(), snap.len());
            }
        }
    }
}
