use rocket::figment::Figment;
use rocket::fs::FileServer;
use rocket::{Build, Rocket};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use std::error::Error;

mod config;
mod data;
mod internal_error;
mod milestones;
mod notice;
mod projects;
mod tasks;

use config::AppConfig;
use internal_error::StoreError;
use milestones::endpoints as milestone_endpoints;
use projects::endpoints as project_endpoints;
use tasks::controller::TaskLocks;
use tasks::endpoints as task_endpoints;

#[macro_use]
extern crate rocket;

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build_rocket(figment: Figment, config: &AppConfig) -> Result<Rocket<Build>, StoreError> {
    let connection = data::open_database(&config.database_path)?;

    let rocket = rocket::custom(figment)
        .manage(connection)
        .manage(TaskLocks::new())
        .mount(
            "/api",
            routes![
                project_endpoints::get_projects,
                project_endpoints::add_project,
                project_endpoints::get_project,
                project_endpoints::get_dashboard_stats,
                project_endpoints::delete_project,
                milestone_endpoints::get_milestones,
                milestone_endpoints::add_milestone,
                milestone_endpoints::update_milestone,
                milestone_endpoints::toggle_milestone,
                milestone_endpoints::delete_milestone,
                task_endpoints::get_board,
                task_endpoints::add_task,
                task_endpoints::advance_task,
                task_endpoints::move_task,
                task_endpoints::delete_task,
            ],
        );

    match &config.static_dir {
        Some(static_dir) if static_dir.is_dir() => {
            Ok(rocket.mount("/", FileServer::from(static_dir).rank(15)))
        }
        Some(static_dir) => {
            warn!(path = %static_dir.display(), "static directory missing, not serving a front end");
            Ok(rocket)
        }
        None => Ok(rocket),
    }
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let figment = rocket::Config::figment();
    let config = AppConfig::from_figment(&figment)?;

    init_tracing(&config.log_filter);

    build_rocket(figment, &config)?.launch().await?;

    Ok(())
}
