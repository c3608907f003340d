use crate::internal_error::{InternalError, InternalResult};

use super::category::TaskCategory;
use super::data::*;

/// A project's tasks split into the three status columns.
///
/// Each column keeps the order tasks were loaded or added in, which is
/// ascending creation time for anything that came from the store. A task is
/// in exactly one column, the one matching its `status`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoardState {
    project_id: ProjectID,
    columns: [Vec<Task>; 3],
}

impl BoardState {
    pub fn empty(project_id: ProjectID) -> BoardState {
        BoardState {
            project_id,
            columns: Default::default(),
        }
    }

    pub fn load(project_id: ProjectID, tasks: impl IntoIterator<Item = Task>) -> BoardState {
        let mut board = BoardState::empty(project_id);
        for task in tasks {
            board.apply_insert(task);
        }
        board
    }

    pub fn project_id(&self) -> ProjectID {
        self.project_id
    }

    pub fn column(&self, status: TaskStatus) -> &[Task] {
        &self.columns[status.index()]
    }

    pub fn find(&self, task_id: TaskID) -> Option<&Task> {
        self.columns.iter().flatten().find(|t| t.id == task_id)
    }

    pub fn len(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }

    /// Take the task out of `from` and append it to the end of `to`.
    /// Leaves the board untouched when the task is not in `from`.
    pub fn apply_move(
        &mut self,
        task_id: TaskID,
        from: TaskStatus,
        to: TaskStatus,
    ) -> InternalResult<()> {
        let position = self.columns[from.index()]
            .iter()
            .position(|t| t.id == task_id)
            .ok_or_else(|| {
                InternalError::not_found(format!("Task {} is not in the {} column", task_id, from))
            })?;

        let mut task = self.columns[from.index()].remove(position);
        task.status = to;
        self.columns[to.index()].push(task);

        Ok(())
    }

    pub fn apply_insert(&mut self, task: Task) {
        self.columns[task.status.index()].push(task);
    }

    pub fn apply_remove(&mut self, task_id: TaskID) {
        for column in self.columns.iter_mut() {
            column.retain(|t| t.id != task_id);
        }
    }

    pub fn view(&self) -> BoardView {
        let columns = TaskStatus::ALL
            .iter()
            .map(|status| {
                let cards: Vec<CardView> = self
                    .column(*status)
                    .iter()
                    .map(|task| CardView {
                        task: task.clone(),
                        category: TaskCategory::from_title(&task.title),
                        inert: status.advance().is_none(),
                        advance_to: status.advance(),
                    })
                    .collect();

                ColumnView {
                    status: *status,
                    title: status.title(),
                    count: cards.len(),
                    cards,
                }
            })
            .collect();

        BoardView {
            project_id: self.project_id,
            columns,
        }
    }
}

#[cfg(test)]
pub(crate) fn task(id: TaskID, title: &str, status: TaskStatus) -> Task {
    use chrono::{TimeZone, Utc};

    Task {
        id,
        title: title.to_string(),
        status,
        project_id: 1,
        milestone_id: None,
        created_at: Utc.timestamp_opt(1_700_000_000 + id, 0).unwrap(),
    }
}
