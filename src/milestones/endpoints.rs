use rocket::serde::json::Json;
use rocket::{get, post, State};
use tracing::info;

use crate::data::DBConnection;
use crate::internal_error::InternalResult;

use super::data::*;
use super::helpers::*;
use super::status::{milestone_view, today};

#[get("/get_milestones/<project_id>")]
pub fn get_milestones(
    project_id: ProjectID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Vec<MilestoneView>>> {
    let db_connection = db_connection.lock()?;

    let today = today();
    let milestones = get_project_milestones_from_db(project_id, &db_connection)?
        .into_iter()
        .map(|m| milestone_view(m, today))
        .collect();

    Ok(Json(milestones))
}

#[post("/add_milestone", format = "json", data = "<add_milestone_request>")]
pub fn add_milestone(
    add_milestone_request: Json<AddMilestoneRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Milestone>> {
    let db_connection = db_connection.lock()?;

    let milestone = add_milestone_to_db(
        add_milestone_request.project_id,
        &add_milestone_request.title,
        add_milestone_request.due_date,
        &db_connection,
    )?;
    info!(milestone_id = milestone.id, project_id = milestone.project_id, "milestone added");

    Ok(Json(milestone))
}

#[post("/update_milestone", format = "json", data = "<update_milestone_request>")]
pub fn update_milestone(
    update_milestone_request: Json<UpdateMilestoneRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Milestone>> {
    let db_connection = db_connection.lock()?;

    update_milestone_in_db(
        update_milestone_request.milestone_id,
        &update_milestone_request.title,
        update_milestone_request.due_date,
        &db_connection,
    )
    .map(Json)
}

#[post("/toggle_milestone", format = "json", data = "<toggle_milestone_request>")]
pub fn toggle_milestone(
    toggle_milestone_request: Json<ToggleMilestoneRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Milestone>> {
    let db_connection = db_connection.lock()?;

    toggle_milestone_in_db(toggle_milestone_request.milestone_id, &db_connection).map(Json)
}

#[post("/delete_milestone", format = "json", data = "<delete_milestone_request>")]
pub fn delete_milestone(
    delete_milestone_request: Json<DeleteMilestoneRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    delete_milestones_from_db(&[delete_milestone_request.milestone_id], &db_connection)?;
    info!(milestone_id = delete_milestone_request.milestone_id, "milestone deleted");

    Ok(())
}
