use chrono::{DateTime, NaiveDate, Utc};

use taskboard_core::{Task, TaskDraft, TaskId, TaskStatus, ValidationError};

/// What submitting the form will do.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// Edits keep the status the task had when the form was opened.
    Edit { id: TaskId, status: TaskStatus },
}

/// Shared create/edit form. Fields hold raw user input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskForm {
    mode: FormMode,
    pub title: String,
    pub description: String,
    /// `YYYY-MM-DD`, or empty for none.
    pub due_date: String,
}

impl TaskForm {
    /// Empty form for a new task.
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
        }
    }

    /// Form pre-populated from an existing task.
    pub fn edit(task: &Task) -> Self {
        Self {
            mode: FormMode::Edit {
                id: task.id.clone(),
                status: task.status,
            },
            title: task.title.clone(),
            description: task.description.clone().unwrap_or_default(),
            due_date: task
                .completed_at
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    /// Id of the task being edited, `None` when creating.
    pub fn editing(&self) -> Option<&TaskId> {
        match &self.mode {
            FormMode::Create => None,
            FormMode::Edit { id, .. } => Some(id),
        }
    }

    /// Full payload for submission. Blank description is sent as null.
    pub fn to_draft(&self) -> Result<TaskDraft, ValidationError> {
        let description = match self.description.trim() {
            "" => None,
            _ => Some(self.description.clone()),
        };
        let status = match &self.mode {
            FormMode::Create => TaskStatus::Pending,
            FormMode::Edit { status, .. } => *status,
        };
        let mut draft = TaskDraft::full(self.title.trim(), description, status, None);
        draft.validate(self.editing().is_none())?;
        draft.completed_at = Some(parse_due_date(&self.due_date)?);
        Ok(draft)
    }
}

/// `YYYY-MM-DD` to midnight UTC. Empty input means no date.
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Utc>>, ValidationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDueDate(input.to_string()))?;
    let midnight = date
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| ValidationError::InvalidDueDate(input.to_string()))?;
    Ok(Some(midnight.and_utc()))
}
