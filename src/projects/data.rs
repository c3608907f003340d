use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use crate::data::ProjectID;
use crate::milestones::data::MilestoneView;

pub const ACTIVE_STATUS: &str = "active";

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Project {
    pub id: ProjectID,
    pub title: String,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Debug)]
pub struct ProjectDetail {
    pub project: Project,
    pub milestones: Vec<MilestoneView>,
    pub completed_milestones: usize,
    pub total_milestones: usize,
}

#[derive(Serialize, Debug, PartialEq)]
pub struct DashboardStats {
    pub active_projects: i64,
}

#[derive(Deserialize, Debug)]
pub struct AddProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Debug)]
pub struct DeleteProjectRequest {
    pub project_id: ProjectID,
}
