use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info, warn};

use crate::internal_error::{InternalError, InternalResult, StoreError};
use crate::milestones::helpers::{delete_milestones_from_db, get_project_milestones_from_db};
use crate::milestones::status::milestone_view;
use crate::tasks::data::{MilestoneID, TaskID};
use crate::tasks::store::TaskStore;

use super::data::*;

const PROJECT_COLUMNS: &str = "id, title, description, status, created_at";

fn get_project_from_row(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn project_not_found(project_id: ProjectID) -> InternalError {
    InternalError::not_found(format!("Project {} not found", project_id))
}

/// Newest first.
pub fn get_projects_from_db(db_connection: &Connection) -> InternalResult<Vec<Project>> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM projects ORDER BY created_at DESC, id DESC",
        PROJECT_COLUMNS
    ))?;

    let rows = statement.query_map([], get_project_from_row)?;

    let mut projects = vec![];
    for row_result in rows {
        projects.push(row_result?);
    }

    Ok(projects)
}

pub fn get_project_from_db(
    project_id: ProjectID,
    db_connection: &Connection,
) -> InternalResult<Option<Project>> {
    let project = db_connection
        .query_row(
            &format!("SELECT {} FROM projects WHERE id = (?1)", PROJECT_COLUMNS),
            params![project_id],
            get_project_from_row,
        )
        .optional()?;

    Ok(project)
}

pub fn add_project_to_db(
    title: &str,
    description: &str,
    db_connection: &Connection,
) -> InternalResult<Project> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InternalError::validation("Project title is required"));
    }

    db_connection.execute(
        "INSERT INTO projects (title, description, status, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![title, description.trim(), ACTIVE_STATUS, Utc::now()],
    )?;
    let id = db_connection.last_insert_rowid();

    get_project_from_db(id, db_connection)?.ok_or_else(|| project_not_found(id))
}

pub fn get_project_detail_from_db(
    project_id: ProjectID,
    today: NaiveDate,
    db_connection: &Connection,
) -> InternalResult<ProjectDetail> {
    let project =
        get_project_from_db(project_id, db_connection)?.ok_or_else(|| project_not_found(project_id))?;

    let milestones: Vec<_> = get_project_milestones_from_db(project_id, db_connection)?
        .into_iter()
        .map(|m| milestone_view(m, today))
        .collect();
    let completed_milestones = milestones.iter().filter(|m| m.milestone.completed).count();

    Ok(ProjectDetail {
        project,
        total_milestones: milestones.len(),
        completed_milestones,
        milestones,
    })
}

pub fn get_dashboard_stats_from_db(db_connection: &Connection) -> InternalResult<DashboardStats> {
    let active_projects = db_connection.query_row(
        "SELECT COUNT(*) FROM projects WHERE status = (?1)",
        params![ACTIVE_STATUS],
        |row| row.get(0),
    )?;

    Ok(DashboardStats { active_projects })
}

/// The dependent rows removed before a project, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeStep {
    Tasks,
    Milestones,
    Project,
}

impl CascadeStep {
    pub const ORDER: [CascadeStep; 3] = [
        CascadeStep::Tasks,
        CascadeStep::Milestones,
        CascadeStep::Project,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CascadeStep::Tasks => "tasks",
            CascadeStep::Milestones => "milestones",
            CascadeStep::Project => "project",
        }
    }

    fn run(
        &self,
        project_id: ProjectID,
        milestone_ids: &[MilestoneID],
        db_connection: &Connection,
    ) -> InternalResult<()> {
        match self {
            CascadeStep::Tasks => {
                let task_ids = get_cascade_task_ids(project_id, db_connection)?;
                db_connection.delete_many(&task_ids)?;
            }
            CascadeStep::Milestones => {
                delete_milestones_from_db(milestone_ids, db_connection)?;
            }
            CascadeStep::Project => {
                let changed = db_connection
                    .execute("DELETE FROM projects WHERE id = (?1)", params![project_id])?;
                if changed == 0 {
                    return Err(InternalError::from(StoreError::MissingRow {
                        table: "projects",
                        id: project_id,
                    }));
                }
            }
        }

        Ok(())
    }
}

// Tasks owned by the project directly or through one of its milestones.
fn get_cascade_task_ids(
    project_id: ProjectID,
    db_connection: &Connection,
) -> InternalResult<Vec<TaskID>> {
    let mut statement = db_connection.prepare(
        "SELECT id FROM kanban_tasks WHERE project_id = (?1)
             OR milestone_id IN (SELECT id FROM project_milestones WHERE project_id = (?1))",
    )?;

    let rows = statement.query_map(params![project_id], |row| row.get::<_, TaskID>(0))?;

    let mut task_ids = vec![];
    for row_result in rows {
        task_ids.push(row_result?);
    }

    Ok(task_ids)
}

/// Delete a project with its milestones and tasks.
///
/// The steps of `CascadeStep::ORDER` run inside one transaction. The first
/// failing step stops the cascade and everything done so far is rolled back.
pub fn delete_project_from_db(project_id: ProjectID, db_connection: &Connection) -> InternalResult<()> {
    if get_project_from_db(project_id, db_connection)?.is_none() {
        return Err(project_not_found(project_id));
    }

    let transaction = db_connection.unchecked_transaction()?;

    let milestone_ids: Vec<MilestoneID> = get_project_milestones_from_db(project_id, &transaction)?
        .iter()
        .map(|m| m.id)
        .collect();

    for step in CascadeStep::ORDER.iter() {
        if let Err(e) = step.run(project_id, &milestone_ids, &transaction) {
            warn!(project_id, step = step.name(), "project delete halted: {}", e);
            return Err(e);
        }
        debug!(project_id, step = step.name(), "cascade step done");
    }

    transaction.commit()?;
    info!(project_id, "project deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_connection;
    use crate::milestones::helpers::{add_milestone_to_db, get_milestone_from_db};
    use crate::tasks::data::{NewTask, TaskStatus};

    fn add_task(connection: &Connection, project_id: ProjectID, milestone_id: Option<MilestoneID>) {
        connection
            .insert(&NewTask {
                title: "Develop API".to_string(),
                status: TaskStatus::Todo,
                project_id,
                milestone_id,
            })
            .unwrap();
    }

    fn task_count(connection: &Connection) -> i64 {
        connection
            .query_row("SELECT COUNT(*) FROM kanban_tasks", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn test_add_and_list_projects() {
        let connection = test_connection();

        let first = add_project_to_db("Garden", "", &connection).unwrap();
        let second = add_project_to_db(" LifeOS ", " planner ", &connection).unwrap();

        assert_eq!(second.title, "LifeOS");
        assert_eq!(second.description, "planner");
        assert_eq!(second.status, ACTIVE_STATUS);

        let ids: Vec<ProjectID> = get_projects_from_db(&connection)
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_add_project_requires_title() {
        let connection = test_connection();

        let result = add_project_to_db(" ", "desc", &connection);
        assert!(matches!(result, Err(InternalError::Validation(_))));
        assert!(get_projects_from_db(&connection).unwrap().is_empty());
    }

    #[test]
    fn test_dashboard_counts_active_projects() {
        let connection = test_connection();
        add_project_to_db("one", "", &connection).unwrap();
        let two = add_project_to_db("two", "", &connection).unwrap();
        connection
            .execute(
                "UPDATE projects SET status = 'archived' WHERE id = (?1)",
                params![two.id],
            )
            .unwrap();

        assert_eq!(
            get_dashboard_stats_from_db(&connection).unwrap(),
            DashboardStats { active_projects: 1 }
        );
    }

    #[test]
    fn test_project_detail_counts_completed_milestones() {
        let connection = test_connection();
        let project = add_project_to_db("LifeOS", "", &connection).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let done = add_milestone_to_db(project.id, "Alpha", None, &connection).unwrap();
        crate::milestones::helpers::toggle_milestone_in_db(done.id, &connection).unwrap();
        add_milestone_to_db(project.id, "Beta", NaiveDate::from_ymd_opt(2024, 6, 1), &connection)
            .unwrap();

        let detail = get_project_detail_from_db(project.id, today, &connection).unwrap();

        assert_eq!(detail.total_milestones, 2);
        assert_eq!(detail.completed_milestones, 1);
        assert_eq!(detail.milestones[0].status_label, "Overdue");
        assert_eq!(detail.milestones[1].status_label, "Complete");

        assert!(matches!(
            get_project_detail_from_db(999, today, &connection),
            Err(InternalError::NotFound(_))
        ));
    }

    #[test]
    fn test_delete_project_cascades() {
        let connection = test_connection();
        let project = add_project_to_db("LifeOS", "", &connection).unwrap();
        let other = add_project_to_db("Garden", "", &connection).unwrap();
        let milestone = add_milestone_to_db(project.id, "Alpha", None, &connection).unwrap();

        add_task(&connection, project.id, Some(milestone.id));
        add_task(&connection, project.id, None);
        add_task(&connection, other.id, None);

        delete_project_from_db(project.id, &connection).unwrap();

        assert!(get_project_from_db(project.id, &connection).unwrap().is_none());
        assert!(get_milestone_from_db(milestone.id, &connection).unwrap().is_none());
        assert_eq!(task_count(&connection), 1);
        assert_eq!(connection.list_by_project(other.id).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_step_rolls_back_cascade() {
        let connection = test_connection();
        let project = add_project_to_db("LifeOS", "", &connection).unwrap();
        let milestone = add_milestone_to_db(project.id, "Alpha", None, &connection).unwrap();
        add_task(&connection, project.id, Some(milestone.id));
        connection
            .execute_batch(
                "CREATE TRIGGER keep_projects BEFORE DELETE ON projects
                 BEGIN SELECT RAISE(ABORT, 'projects are locked'); END;",
            )
            .unwrap();

        let result = delete_project_from_db(project.id, &connection);

        assert!(matches!(result, Err(InternalError::Store(_))));
        assert!(get_project_from_db(project.id, &connection).unwrap().is_some());
        assert!(get_milestone_from_db(milestone.id, &connection).unwrap().is_some());
        assert_eq!(task_count(&connection), 1);
    }

    #[test]
    fn test_delete_missing_project() {
        let connection = test_connection();

        assert!(matches!(
            delete_project_from_db(5, &connection),
            Err(InternalError::NotFound(_))
        ));
    }
}
