use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use taskboard_core::{Task, TaskStatus, ValidationError};

/// Which tasks the list shows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(TaskStatus),
}

impl StatusFilter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(status) => task.status == status,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str("All"),
            Self::Only(status) => status.fmt(f),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(Self::All)
        } else {
            s.parse().map(Self::Only)
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    TitleAsc,
    TitleDesc,
    /// Pending, then in progress, then done.
    StatusPendingFirst,
    /// In progress, then pending, then done.
    StatusInProgressFirst,
}

impl SortOrder {
    pub const ALL: [SortOrder; 4] = [
        Self::TitleAsc,
        Self::TitleDesc,
        Self::StatusPendingFirst,
        Self::StatusInProgressFirst,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TitleAsc => "title-asc",
            Self::TitleDesc => "title-desc",
            Self::StatusPendingFirst => "pending-first",
            Self::StatusInProgressFirst => "in-progress-first",
        }
    }

    fn compare(self, a: &Task, b: &Task) -> Ordering {
        match self {
            Self::TitleAsc => compare_titles(&a.title, &b.title),
            Self::TitleDesc => compare_titles(&b.title, &a.title),
            Self::StatusPendingFirst | Self::StatusInProgressFirst => {
                self.status_rank(a.status).cmp(&self.status_rank(b.status))
            }
        }
    }

    fn status_rank(self, status: TaskStatus) -> u8 {
        match (self, status) {
            (_, TaskStatus::Done) => 2,
            (Self::StatusInProgressFirst, TaskStatus::InProgress) => 0,
            (Self::StatusInProgressFirst, TaskStatus::Pending) => 1,
            (_, TaskStatus::Pending) => 0,
            (_, TaskStatus::InProgress) => 1,
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "title-asc" | "asc" => Ok(Self::TitleAsc),
            "title-desc" | "desc" => Ok(Self::TitleDesc),
            "pending-first" | "status" => Ok(Self::StatusPendingFirst),
            "in-progress-first" => Ok(Self::StatusInProgressFirst),
            _ => Err(ValidationError::UnknownSortOrder(s.to_string())),
        }
    }
}

/// Case-insensitive title order; exact case only breaks ties.
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Visible rows for the given filter and sort. Stable: tasks that compare
/// equal keep their cache order.
pub fn filter_and_sort(tasks: &[Task], filter: StatusFilter, sort: SortOrder) -> Vec<Task> {
    let mut visible: Vec<Task> = tasks.iter().filter(|t| filter.matches(t)).cloned().collect();
    visible.sort_by(|a, b| sort.compare(a, b));
    visible
}
