use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use tracing::warn;

use crate::data::DBConnection;
use crate::internal_error::StoreError;

use super::data::*;

/// The persistence operations the board depends on.
pub trait TaskStore {
    fn list_by_project(&self, project_id: ProjectID) -> Result<Vec<Task>, StoreError>;
    fn insert(&self, new_task: &NewTask) -> Result<Task, StoreError>;
    fn update_status(&self, task_id: TaskID, status: TaskStatus) -> Result<(), StoreError>;
    fn delete(&self, task_id: TaskID) -> Result<(), StoreError>;
    fn delete_many(&self, task_ids: &[TaskID]) -> Result<(), StoreError>;
    /// Owning project of a milestone, `None` when the milestone does not exist.
    fn milestone_project(&self, milestone_id: MilestoneID) -> Result<Option<ProjectID>, StoreError>;
}

const TASK_COLUMNS: &str = "id, title, status, project_id, milestone_id, created_at";

/// Decode one `kanban_tasks` row. Rows with a status outside the three
/// columns come back as `None` so they never reach a board.
fn get_task_from_row(row: &Row) -> rusqlite::Result<Option<Task>> {
    let id: TaskID = row.get(0)?;
    let raw_status: String = row.get(2)?;

    let status = match raw_status.parse::<TaskStatus>() {
        Ok(status) => status,
        Err(e) => {
            warn!(task_id = id, "dropping task: {}", e);
            return Ok(None);
        }
    };

    Ok(Some(Task {
        id,
        title: row.get(1)?,
        status,
        project_id: row.get(3)?,
        milestone_id: row.get(4)?,
        created_at: row.get(5)?,
    }))
}

pub fn get_project_tasks_from_db(
    project_id: ProjectID,
    db_connection: &Connection,
) -> Result<Vec<Task>, StoreError> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM kanban_tasks WHERE project_id = (?1) ORDER BY created_at ASC, id ASC",
        TASK_COLUMNS
    ))?;

    let rows = statement.query_map(params![project_id], get_task_from_row)?;

    let mut tasks = vec![];
    for row_result in rows {
        if let Some(task) = row_result? {
            tasks.push(task);
        }
    }

    Ok(tasks)
}

pub fn get_task_from_db(task_id: TaskID, db_connection: &Connection) -> Result<Task, StoreError> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM kanban_tasks WHERE id = (?1)",
        TASK_COLUMNS
    ))?;

    let mut rows = statement.query_map(params![task_id], get_task_from_row)?;

    match rows.next() {
        Some(row_result) => row_result?.ok_or(StoreError::MissingRow {
            table: "kanban_tasks",
            id: task_id,
        }),
        None => Err(StoreError::MissingRow {
            table: "kanban_tasks",
            id: task_id,
        }),
    }
}

pub fn add_task_to_db(new_task: &NewTask, db_connection: &Connection) -> Result<Task, StoreError> {
    db_connection.execute(
        "INSERT INTO kanban_tasks (title, status, project_id, milestone_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            new_task.title,
            new_task.status.as_str(),
            new_task.project_id,
            new_task.milestone_id,
            Utc::now(),
        ],
    )?;
    let id = db_connection.last_insert_rowid();

    get_task_from_db(id, db_connection)
}

pub fn get_milestone_project_from_db(
    milestone_id: MilestoneID,
    db_connection: &Connection,
) -> Result<Option<ProjectID>, StoreError> {
    let project_id = db_connection
        .query_row(
            "SELECT project_id FROM project_milestones WHERE id = (?1)",
            params![milestone_id],
            |row| row.get(0),
        )
        .optional()?;

    Ok(project_id)
}

pub fn update_task_status_in_db(
    task_id: TaskID,
    status: TaskStatus,
    db_connection: &Connection,
) -> Result<(), StoreError> {
    let changed = db_connection.execute(
        "UPDATE kanban_tasks SET status = (?1) WHERE id = (?2)",
        params![status.as_str(), task_id],
    )?;

    if changed == 0 {
        return Err(StoreError::MissingRow {
            table: "kanban_tasks",
            id: task_id,
        });
    }

    Ok(())
}

pub fn delete_tasks_from_db(task_ids: &[TaskID], db_connection: &Connection) -> Result<(), StoreError> {
    if task_ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; task_ids.len()].join(", ");
    db_connection.execute(
        &format!("DELETE FROM kanban_tasks WHERE id IN ({})", placeholders),
        params_from_iter(task_ids.iter()),
    )?;

    Ok(())
}

impl TaskStore for Connection {
    fn list_by_project(&self, project_id: ProjectID) -> Result<Vec<Task>, StoreError> {
        get_project_tasks_from_db(project_id, self)
    }

    fn insert(&self, new_task: &NewTask) -> Result<Task, StoreError> {
        add_task_to_db(new_task, self)
    }

    fn update_status(&self, task_id: TaskID, status: TaskStatus) -> Result<(), StoreError> {
        update_task_status_in_db(task_id, status, self)
    }

    fn delete(&self, task_id: TaskID) -> Result<(), StoreError> {
        delete_tasks_from_db(&[task_id], self)
    }

    fn delete_many(&self, task_ids: &[TaskID]) -> Result<(), StoreError> {
        delete_tasks_from_db(task_ids, self)
    }

    fn milestone_project(&self, milestone_id: MilestoneID) -> Result<Option<ProjectID>, StoreError> {
        get_milestone_project_from_db(milestone_id, self)
    }
}

// The shared handle locks the connection for each call only.
impl TaskStore for DBConnection {
    fn list_by_project(&self, project_id: ProjectID) -> Result<Vec<Task>, StoreError> {
        self.lock()?.list_by_project(project_id)
    }

    fn insert(&self, new_task: &NewTask) -> Result<Task, StoreError> {
        self.lock()?.insert(new_task)
    }

    fn update_status(&self, task_id: TaskID, status: TaskStatus) -> Result<(), StoreError> {
        self.lock()?.update_status(task_id, status)
    }

    fn delete(&self, task_id: TaskID) -> Result<(), StoreError> {
        self.lock()?.delete(task_id)
    }

    fn delete_many(&self, task_ids: &[TaskID]) -> Result<(), StoreError> {
        self.lock()?.delete_many(task_ids)
    }

    fn milestone_project(&self, milestone_id: MilestoneID) -> Result<Option<ProjectID>, StoreError> {
        self.lock()?.milestone_project(milestone_id)
    }
}
