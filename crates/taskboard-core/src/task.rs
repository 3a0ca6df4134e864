use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::ValidationError;
use crate::ids::TaskId;

/// Workflow state of a task. Serialized with the remote API's names.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    #[serde(rename = "PENDENTE")]
    Pending,
    #[serde(rename = "EM_ANDAMENTO")]
    InProgress,
    #[serde(rename = "CONCLUIDO")]
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [Self::Pending, Self::InProgress, Self::Done];

    /// Value used on the wire.
    pub fn as_wire(self) -> &'static str {
        match self {
            Self::Pending => "PENDENTE",
            Self::InProgress => "EM_ANDAMENTO",
            Self::Done => "CONCLUIDO",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::InProgress => "In progress",
            Self::Done => "Done",
        }
    }

    /// Completion toggle target. Only swaps between `Done` and `Pending`,
    /// so toggling an in-progress task marks it done.
    pub fn toggled(self) -> Self {
        match self {
            Self::Done => Self::Pending,
            Self::Pending | Self::InProgress => Self::Done,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TaskStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "pending" | "pendente" => Ok(Self::Pending),
            "in_progress" | "inprogress" | "em_andamento" => Ok(Self::InProgress),
            "done" | "completed" | "concluido" => Ok(Self::Done),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

/// A task as held by the remote API and mirrored in the local cache.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    pub status: TaskStatus,
    #[serde(rename = "dataCriacao")]
    pub created_at: DateTime<Utc>,
    #[serde(rename = "dataConclusao", default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Shallow merge: every field present in the draft overrides, absent
    /// fields are left untouched. `id` and `created_at` never change.
    pub fn merge(&mut self, draft: &TaskDraft) {
        if let Some(title) = &draft.title {
            self.title.clone_from(title);
        }
        if let Some(description) = &draft.description {
            self.description.clone_from(description);
        }
        if let Some(status) = draft.status {
            self.status = status;
        }
        if let Some(completed_at) = draft.completed_at {
            self.completed_at = completed_at;
        }
    }
}

/// Create/update payload.
///
/// Every field is optional so the same type carries partial updates.
/// `description` and `completed_at` distinguish "absent" (`None`, omitted
/// from the JSON) from "cleared" (`Some(None)`, sent as `null`).
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    #[serde(rename = "titulo", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(
        rename = "descricao",
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TaskStatus>,
    #[serde(
        rename = "dataConclusao",
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TaskDraft {
    /// Partial update that only touches the status.
    pub fn status_only(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Full draft with every field present, as submitted by the edit form.
    pub fn full(
        title: impl Into<String>,
        description: Option<String>,
        status: TaskStatus,
        completed_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            title: Some(title.into()),
            description: Some(description),
            status: Some(status),
            completed_at: Some(completed_at),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.completed_at.is_none()
    }

    /// A create needs a non-blank title; an update only rejects a title
    /// that is present but blank.
    pub fn validate(&self, creating: bool) -> Result<(), ValidationError> {
        match &self.title {
            Some(title) if title.trim().is_empty() => Err(ValidationError::EmptyTitle),
            None if creating => Err(ValidationError::EmptyTitle),
            _ => Ok(()),
        }
    }
}

fn double_option<'de, T, D>(de: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(de).map(Some)
}
