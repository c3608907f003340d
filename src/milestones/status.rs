use chrono::{Local, NaiveDate};
use serde::Serialize;

use super::data::{Milestone, MilestoneView};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MilestoneStatus {
    Complete,
    Overdue,
    InProgress,
    NotStarted,
}

impl MilestoneStatus {
    pub fn label(&self) -> &'static str {
        match self {
            MilestoneStatus::Complete => "Complete",
            MilestoneStatus::Overdue => "Overdue",
            MilestoneStatus::InProgress => "In Progress",
            MilestoneStatus::NotStarted => "Not Started",
        }
    }
}

/// Completion wins over any date. Dates compare by day only, so a
/// milestone due today is still in progress.
pub fn derive_status(milestone: &Milestone, today: NaiveDate) -> MilestoneStatus {
    if milestone.completed {
        return MilestoneStatus::Complete;
    }

    match milestone.due_date {
        Some(due_date) if due_date < today => MilestoneStatus::Overdue,
        Some(_) => MilestoneStatus::InProgress,
        None => MilestoneStatus::NotStarted,
    }
}

/// The local calendar date statuses are derived against.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn milestone_view(milestone: Milestone, today: NaiveDate) -> MilestoneView {
    let status = derive_status(&milestone, today);
    MilestoneView {
        milestone,
        status,
        status_label: status.label(),
    }
}
