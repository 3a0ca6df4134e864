use std::fmt::Write;

use taskboard_core::{Notification, Task};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// One row per task: id, status, due date, title.
pub fn task_table(tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return "No tasks.\n".to_string();
    }
    let id_width = tasks
        .iter()
        .map(|t| t.id.as_str().len())
        .max()
        .unwrap_or(0)
        .max("ID".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<id_width$}  {:<11}  {:<10}  TITLE", "ID", "STATUS", "DUE");
    for task in tasks {
        let due = task
            .completed_at
            .map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<id_width$}  {:<11}  {:<10}  {}",
            task.id.as_str(),
            task.status.label(),
            due,
            task.title
        );
    }
    out
}

pub fn detail(task: &Task) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", task.title);
    let _ = writeln!(out, "  id:          {}", task.id);
    let _ = writeln!(out, "  status:      {}", task.status);
    let _ = writeln!(out, "  created:     {}", task.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(due) = task.completed_at {
        let _ = writeln!(out, "  due:         {}", due.format(DATE_FORMAT));
    }
    if let Some(description) = &task.description {
        let _ = writeln!(out, "  description: {description}");
    }
    out
}

pub fn notifications(notes: &[Notification]) -> String {
    notes.iter().fold(String::new(), |mut out, n| {
        let _ = writeln!(out, "[{}] {}", n.severity, n.message);
        out
    })
}
