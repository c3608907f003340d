use chrono::NaiveDate;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};

use crate::internal_error::{InternalError, InternalResult, StoreError};

use super::data::*;

const MILESTONE_COLUMNS: &str = "id, project_id, title, due_date, completed";

fn get_milestone_from_row(row: &Row) -> rusqlite::Result<Milestone> {
    Ok(Milestone {
        id: row.get(0)?,
        project_id: row.get(1)?,
        title: row.get(2)?,
        due_date: row.get(3)?,
        completed: row.get(4)?,
    })
}

fn validate_title(title: &str) -> InternalResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(InternalError::validation("Title is required"));
    }
    Ok(title.to_string())
}

fn missing_milestone(milestone_id: MilestoneID) -> InternalError {
    InternalError::from(StoreError::MissingRow {
        table: "project_milestones",
        id: milestone_id,
    })
}

/// Milestones without a due date sort last.
pub fn get_project_milestones_from_db(
    project_id: ProjectID,
    db_connection: &Connection,
) -> InternalResult<Vec<Milestone>> {
    let mut statement = db_connection.prepare(&format!(
        "SELECT {} FROM project_milestones WHERE project_id = (?1) ORDER BY due_date IS NULL, due_date ASC, id ASC",
        MILESTONE_COLUMNS
    ))?;

    let rows = statement.query_map(params![project_id], get_milestone_from_row)?;

    let mut milestones = vec![];
    for row_result in rows {
        milestones.push(row_result?);
    }

    Ok(milestones)
}

pub fn get_milestone_from_db(
    milestone_id: MilestoneID,
    db_connection: &Connection,
) -> InternalResult<Option<Milestone>> {
    let milestone = db_connection
        .query_row(
            &format!(
                "SELECT {} FROM project_milestones WHERE id = (?1)",
                MILESTONE_COLUMNS
            ),
            params![milestone_id],
            get_milestone_from_row,
        )
        .optional()?;

    Ok(milestone)
}

pub fn add_milestone_to_db(
    project_id: ProjectID,
    title: &str,
    due_date: Option<NaiveDate>,
    db_connection: &Connection,
) -> InternalResult<Milestone> {
    let title = validate_title(title)?;

    db_connection.execute(
        "INSERT INTO project_milestones (project_id, title, due_date) VALUES (?1, ?2, ?3)",
        params![project_id, title, due_date],
    )?;
    let id = db_connection.last_insert_rowid();

    get_milestone_from_db(id, db_connection)?.ok_or_else(|| missing_milestone(id))
}

pub fn update_milestone_in_db(
    milestone_id: MilestoneID,
    title: &str,
    due_date: Option<NaiveDate>,
    db_connection: &Connection,
) -> InternalResult<Milestone> {
    let title = validate_title(title)?;

    let changed = db_connection.execute(
        "UPDATE project_milestones SET title = (?1), due_date = (?2) WHERE id = (?3)",
        params![title, due_date, milestone_id],
    )?;
    if changed == 0 {
        return Err(missing_milestone(milestone_id));
    }

    get_milestone_from_db(milestone_id, db_connection)?.ok_or_else(|| missing_milestone(milestone_id))
}

pub fn toggle_milestone_in_db(
    milestone_id: MilestoneID,
    db_connection: &Connection,
) -> InternalResult<Milestone> {
    let changed = db_connection.execute(
        "UPDATE project_milestones SET completed = NOT completed WHERE id = (?1)",
        params![milestone_id],
    )?;
    if changed == 0 {
        return Err(missing_milestone(milestone_id));
    }

    get_milestone_from_db(milestone_id, db_connection)?.ok_or_else(|| missing_milestone(milestone_id))
}

pub fn delete_milestones_from_db(
    milestone_ids: &[MilestoneID],
    db_connection: &Connection,
) -> InternalResult<()> {
    if milestone_ids.is_empty() {
        return Ok(());
    }

    let placeholders = vec!["?"; milestone_ids.len()].join(", ");
    db_connection.execute(
        &format!(
            "DELETE FROM project_milestones WHERE id IN ({})",
            placeholders
        ),
        params_from_iter(milestone_ids.iter()),
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::test_connection;
    use crate::tasks::data::{NewTask, TaskStatus};
    use crate::tasks::store::TaskStore;

    fn connection_with_project() -> Connection {
        let connection = test_connection();
        connection
            .execute(
                "INSERT INTO projects (title, created_at) VALUES ('LifeOS', '2024-01-01 00:00:00+00:00')",
                [],
            )
            .unwrap();
        connection
    }

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn test_add_milestone() {
        let connection = connection_with_project();

        let milestone =
            add_milestone_to_db(1, " Beta release ", date(2024, 9, 1), &connection).unwrap();

        assert!(milestone.id > 0);
        assert_eq!(milestone.project_id, 1);
        assert_eq!(milestone.title, "Beta release");
        assert_eq!(milestone.due_date, date(2024, 9, 1));
        assert!(!milestone.completed);
    }

    #[test]
    fn test_add_milestone_requires_title() {
        let connection = connection_with_project();

        let result = add_milestone_to_db(1, "  ", None, &connection);
        assert!(matches!(result, Err(InternalError::Validation(_))));
        assert!(get_project_milestones_from_db(1, &connection).unwrap().is_empty());
    }

    #[test]
    fn test_list_orders_by_due_date_with_undated_last() {
        let connection = connection_with_project();
        add_milestone_to_db(1, "undated", None, &connection).unwrap();
        add_milestone_to_db(1, "later", date(2024, 12, 1), &connection).unwrap();
        add_milestone_to_db(1, "sooner", date(2024, 3, 1), &connection).unwrap();

        let titles: Vec<String> = get_project_milestones_from_db(1, &connection)
            .unwrap()
            .into_iter()
            .map(|m| m.title)
            .collect();
        assert_eq!(titles, vec!["sooner", "later", "undated"]);
    }

    #[test]
    fn test_update_and_toggle() {
        let connection = connection_with_project();
        let milestone = add_milestone_to_db(1, "Alpha", None, &connection).unwrap();

        let updated =
            update_milestone_in_db(milestone.id, "Alpha 2", date(2025, 1, 1), &connection)
                .unwrap();
        assert_eq!(updated.title, "Alpha 2");
        assert_eq!(updated.due_date, date(2025, 1, 1));

        let cleared = update_milestone_in_db(milestone.id, "Alpha 2", None, &connection).unwrap();
        assert_eq!(cleared.due_date, None);

        assert!(toggle_milestone_in_db(milestone.id, &connection).unwrap().completed);
        assert!(!toggle_milestone_in_db(milestone.id, &connection).unwrap().completed);
    }

    #[test]
    fn test_writes_to_missing_milestone_fail() {
        let connection = connection_with_project();

        assert!(matches!(
            toggle_milestone_in_db(77, &connection),
            Err(InternalError::Store(StoreError::MissingRow { id: 77, .. }))
        ));
        assert!(matches!(
            update_milestone_in_db(77, "x", None, &connection),
            Err(InternalError::Store(StoreError::MissingRow { id: 77, .. }))
        ));
        assert!(get_milestone_from_db(77, &connection).unwrap().is_none());
    }

    #[test]
    fn test_delete_referenced_milestone_is_refused() {
        let connection = connection_with_project();
        let milestone = add_milestone_to_db(1, "Alpha", None, &connection).unwrap();
        connection
            .insert(&NewTask {
                title: "Design homepage".to_string(),
                status: TaskStatus::Todo,
                project_id: 1,
                milestone_id: Some(milestone.id),
            })
            .unwrap();

        let result = delete_milestones_from_db(&[milestone.id], &connection);
        assert!(matches!(result, Err(InternalError::Store(_))));

        let unreferenced = add_milestone_to_db(1, "Beta", None, &connection).unwrap();
        delete_milestones_from_db(&[unreferenced.id], &connection).unwrap();
        assert!(get_milestone_from_db(unreferenced.id, &connection).unwrap().is_none());
    }
}
