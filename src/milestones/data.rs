use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::status::MilestoneStatus;
pub use crate::data::{MilestoneID, ProjectID};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Milestone {
    pub id: MilestoneID,
    pub project_id: ProjectID,
    pub title: String,
    pub due_date: Option<NaiveDate>,
    pub completed: bool,
}

/// A milestone together with its status as of today.
#[derive(Serialize, Debug, Clone)]
pub struct MilestoneView {
    #[serde(flatten)]
    pub milestone: Milestone,
    pub status: MilestoneStatus,
    pub status_label: &'static str,
}

#[derive(Deserialize, Debug)]
pub struct AddMilestoneRequest {
    pub project_id: ProjectID,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug)]
pub struct UpdateMilestoneRequest {
    pub milestone_id: MilestoneID,
    pub title: String,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

#[derive(Deserialize, Debug)]
pub struct ToggleMilestoneRequest {
    pub milestone_id: MilestoneID,
}

#[derive(Deserialize, Debug)]
pub struct DeleteMilestoneRequest {
    pub milestone_id: MilestoneID,
}
