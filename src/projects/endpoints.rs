use rocket::serde::json::Json;
use rocket::{get, post, State};
use tracing::info;

use crate::data::DBConnection;
use crate::internal_error::InternalResult;
use crate::milestones::status::today;

use super::data::*;
use super::helpers::*;

#[get("/get_projects")]
pub fn get_projects(db_connection: &State<DBConnection>) -> InternalResult<Json<Vec<Project>>> {
    let db_connection = db_connection.lock()?;

    let projects = get_projects_from_db(&db_connection)?;

    Ok(Json(projects))
}

#[post("/add_project", format = "json", data = "<add_project_request>")]
pub fn add_project(
    add_project_request: Json<AddProjectRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<Project>> {
    let db_connection = db_connection.lock()?;

    let project = add_project_to_db(
        &add_project_request.title,
        &add_project_request.description,
        &db_connection,
    )?;
    info!(project_id = project.id, "project created");

    Ok(Json(project))
}

#[get("/get_project/<project_id>")]
pub fn get_project(
    project_id: ProjectID,
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<ProjectDetail>> {
    let db_connection = db_connection.lock()?;

    get_project_detail_from_db(project_id, today(), &db_connection).map(Json)
}

#[get("/get_dashboard_stats")]
pub fn get_dashboard_stats(
    db_connection: &State<DBConnection>,
) -> InternalResult<Json<DashboardStats>> {
    let db_connection = db_connection.lock()?;

    get_dashboard_stats_from_db(&db_connection).map(Json)
}

#[post("/delete_project", format = "json", data = "<delete_project_request>")]
pub fn delete_project(
    delete_project_request: Json<DeleteProjectRequest>,
    db_connection: &State<DBConnection>,
) -> InternalResult<()> {
    let db_connection = db_connection.lock()?;

    delete_project_from_db(delete_project_request.project_id, &db_connection)
}
