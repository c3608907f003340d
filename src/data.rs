use rusqlite::Connection;
use tracing::info;

use std::sync::{Arc, Mutex};

use crate::internal_error::StoreError;

pub type DBConnection = Arc<Mutex<Connection>>;

pub type ProjectID = i64;
pub type MilestoneID = i64;
pub type TaskID = i64;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS projects (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        description TEXT NOT NULL DEFAULT '',
        status TEXT NOT NULL DEFAULT 'active',
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS project_milestones (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id),
        title TEXT NOT NULL,
        due_date TEXT,
        completed INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE IF NOT EXISTS kanban_tasks (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        project_id INTEGER NOT NULL REFERENCES projects(id),
        milestone_id INTEGER REFERENCES project_milestones(id),
        title TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'todo' CHECK (status IN ('todo', 'doing', 'done')),
        created_at TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_milestones_project ON project_milestones(project_id);
    CREATE INDEX IF NOT EXISTS idx_tasks_project ON kanban_tasks(project_id, created_at);
    CREATE INDEX IF NOT EXISTS idx_tasks_milestone ON kanban_tasks(milestone_id);
";

pub fn init_schema(connection: &Connection) -> Result<(), StoreError> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;
    connection.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open (or create) the database at `path` and make sure the tables exist.
/// `:memory:` opens a private in-memory database.
pub fn open_database(path: &str) -> Result<DBConnection, StoreError> {
    let connection = if path == ":memory:" {
        Connection::open_in_memory()?
    } else {
        Connection::open(path)?
    };
    init_schema(&connection)?;
    info!(path, "database ready");

    Ok(Arc::new(Mutex::new(connection)))
}

#[cfg(test)]
pub fn test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("in-memory database");
    init_schema(&connection).expect("schema");
    connection
}
