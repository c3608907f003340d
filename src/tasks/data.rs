use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use super::category::TaskCategory;
pub use crate::data::{MilestoneID, ProjectID, TaskID};
use crate::notice::Notice;

/// The column a task sits in.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    Doing,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::Doing, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::Doing => "doing",
            TaskStatus::Done => "done",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "Todo",
            TaskStatus::Doing => "In Progress",
            TaskStatus::Done => "Done",
        }
    }

    /// Target of a single click on a card in this column. `Done` is terminal.
    pub fn advance(&self) -> Option<TaskStatus> {
        match self {
            TaskStatus::Todo => Some(TaskStatus::Doing),
            TaskStatus::Doing => Some(TaskStatus::Done),
            TaskStatus::Done => None,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::Doing => 1,
            TaskStatus::Done => 2,
        }
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "todo" => Ok(TaskStatus::Todo),
            "doing" => Ok(TaskStatus::Doing),
            "done" => Ok(TaskStatus::Done),
            _ => Err(format!("Invalid task status: {}", s)),
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Task {
    pub id: TaskID,
    pub title: String,
    pub status: TaskStatus,
    pub project_id: ProjectID,
    pub milestone_id: Option<MilestoneID>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub status: TaskStatus,
    pub project_id: ProjectID,
    pub milestone_id: Option<MilestoneID>,
}

#[derive(Deserialize, Debug)]
pub struct AddTaskRequest {
    pub project_id: ProjectID,
    pub title: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub milestone_id: Option<MilestoneID>,
}

#[derive(Deserialize, Debug)]
pub struct AdvanceTaskRequest {
    pub project_id: ProjectID,
    pub task_id: TaskID,
}

#[derive(Deserialize, Debug)]
pub struct MoveTaskRequest {
    pub project_id: ProjectID,
    pub task_id: TaskID,
    pub to_status: TaskStatus,
}

#[derive(Deserialize, Debug)]
pub struct DeleteTaskRequest {
    pub project_id: ProjectID,
    pub task_id: TaskID,
}

#[derive(Serialize, Debug, Clone)]
pub struct CardView {
    #[serde(flatten)]
    pub task: Task,
    pub category: TaskCategory,
    pub inert: bool,
    pub advance_to: Option<TaskStatus>,
}

#[derive(Serialize, Debug, Clone)]
pub struct ColumnView {
    pub status: TaskStatus,
    pub title: &'static str,
    pub count: usize,
    pub cards: Vec<CardView>,
}

#[derive(Serialize, Debug, Clone)]
pub struct BoardView {
    pub project_id: ProjectID,
    pub columns: Vec<ColumnView>,
}

#[derive(Serialize, Debug)]
pub struct BoardResponse {
    pub board: BoardView,
    pub notices: Vec<Notice>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in TaskStatus::ALL.iter() {
            assert_eq!(status.as_str().parse::<TaskStatus>(), Ok(*status));
        }
        assert!("TODO".parse::<TaskStatus>().is_err());
        assert!("blocked".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_click_advance_targets() {
        assert_eq!(TaskStatus::Todo.advance(), Some(TaskStatus::Doing));
        assert_eq!(TaskStatus::Doing.advance(), Some(TaskStatus::Done));
        assert_eq!(TaskStatus::Done.advance(), None);
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&TaskStatus::Doing).unwrap(),
            "\"doing\""
        );
        let parsed: MoveTaskRequest =
            serde_json::from_str(r#"{"project_id": 1, "task_id": 2, "to_status": "done"}"#)
                .unwrap();
        assert_eq!(parsed.to_status, TaskStatus::Done);
    }
}
