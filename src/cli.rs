use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use taskboard_core::{TaskId, TaskStatus};
use taskboard_engine::{EngineError, SortOrder, StatusFilter, TaskBoard};
use taskboard_settings::{load_settings, load_settings_from_path, TaskboardSettings};

use crate::render;

#[derive(Debug, Parser)]
#[command(name = "taskboard", version, about = "Manage tasks on a /tarefas REST API")]
pub struct Cli {
    /// Base URL of the task API (overrides settings and TASKBOARD_API_URL).
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Settings file (default: ~/.taskboard/settings.json).
    #[arg(long, global = true, env = "TASKBOARD_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Log level: trace, debug, info, warn or error.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// List tasks.
    List {
        /// `all`, `pending`, `in-progress` or `done`.
        #[arg(long, default_value = "all")]
        filter: StatusFilter,
        /// `title-asc`, `title-desc`, `pending-first` or `in-progress-first`.
        #[arg(long, default_value = "title-asc")]
        sort: SortOrder,
    },
    /// Show one task.
    Show { id: TaskId },
    /// Create a task.
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        /// Due date as YYYY-MM-DD.
        #[arg(long)]
        due: Option<String>,
    },
    /// Edit a task. Omitted fields keep their current value; pass an empty
    /// string to clear the description or due date.
    Edit {
        id: TaskId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        due: Option<String>,
    },
    /// Set a task's status.
    Status { id: TaskId, status: TaskStatus },
    /// Mark a task done, or a done task pending again.
    Toggle { id: TaskId },
    /// Delete a task.
    Delete { id: TaskId },
}

/// Settings file and environment, then command-line overrides.
pub fn resolve_settings(cli: &Cli) -> anyhow::Result<TaskboardSettings> {
    let mut settings = match &cli.settings {
        Some(path) => load_settings_from_path(path),
        None => load_settings(),
    }
    .context("failed to load settings")?;

    if let Some(url) = &cli.api_url {
        settings.api.base_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level = level.clone();
    }
    settings.validate().context("invalid settings")?;
    Ok(settings)
}

/// Load the list, perform `command`, and return the text to print.
/// Notifications raised along the way stay on the board for the caller.
pub async fn run(board: &TaskBoard, command: Command) -> Result<String, EngineError> {
    board.load().await?;

    match command {
        Command::List { filter, sort } => {
            board.set_filter(filter);
            board.set_sort(sort);
        }
        Command::Show { id } => {
            board.select(&id)?;
            return Ok(board.detail().map(|t| render::detail(&t)).unwrap_or_default());
        }
        Command::Create {
            title,
            description,
            due,
        } => {
            board.open_create_form();
            board.update_form(|form| {
                form.title = title;
                form.description = description.unwrap_or_default();
                form.due_date = due.unwrap_or_default();
            })?;
            board.submit_form().await?;
        }
        Command::Edit {
            id,
            title,
            description,
            due,
        } => {
            board.open_edit_form(&id)?;
            board.update_form(|form| {
                if let Some(title) = title {
                    form.title = title;
                }
                if let Some(description) = description {
                    form.description = description;
                }
                if let Some(due) = due {
                    form.due_date = due;
                }
            })?;
            board.submit_form().await?;
        }
        Command::Status { id, status } => board.change_status(&id, status).await?,
        Command::Toggle { id } => board.toggle_completion(&id).await?,
        Command::Delete { id } => board.delete(&id).await?,
    }

    Ok(render::task_table(&board.visible_tasks()))
}
