use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, Weak};

use crate::internal_error::{InternalError, InternalResult};
use crate::notice::Notices;

use super::board::BoardState;
use super::data::*;
use super::store::TaskStore;

// Dead entries are purged once the map grows past this size.
const LOCK_CLEANUP_THRESHOLD: usize = 128;

const TASK_NOT_FOUND: &str = "Task not found";

/// Per-task lock map. At most one board mutation per task id is in flight;
/// different ids do not contend.
#[derive(Clone, Default)]
pub struct TaskLocks {
    locks: Arc<std::sync::Mutex<HashMap<TaskID, Weak<Mutex<()>>>>>,
}

/// Exclusive right to mutate one task. Board mutations take the task id
/// from the guard, so they cannot run without holding it.
pub struct TaskGuard {
    task_id: TaskID,
    _guard: OwnedMutexGuard<()>,
}

impl TaskGuard {
    pub fn task_id(&self) -> TaskID {
        self.task_id
    }
}

impl TaskLocks {
    pub fn new() -> TaskLocks {
        TaskLocks::default()
    }

    pub async fn acquire(&self, task_id: TaskID) -> TaskGuard {
        let mutex = {
            let mut map = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

            if map.len() > LOCK_CLEANUP_THRESHOLD {
                map.retain(|_, weak| weak.strong_count() > 0);
            }

            map.get(&task_id)
                .and_then(Weak::upgrade)
                .unwrap_or_else(|| {
                    let mutex = Arc::new(Mutex::new(()));
                    map.insert(task_id, Arc::downgrade(&mutex));
                    mutex
                })
        };

        TaskGuard {
            task_id,
            _guard: mutex.lock_owned().await,
        }
    }
}

/// Drives the board: click-advance, drag-and-drop, add and delete.
///
/// Every mutation is confirm-then-apply. The store is written first and the
/// board only changes once the write succeeded. Errors never escape; they
/// are logged and turned into a failure notice, and the board that came in
/// is handed back unchanged.
pub struct BoardController<S> {
    store: S,
    locks: TaskLocks,
}

impl<S: TaskStore> BoardController<S> {
    pub fn new(store: S, locks: TaskLocks) -> BoardController<S> {
        BoardController { store, locks }
    }

    /// Wait until no other mutation of `task_id` is in flight.
    pub async fn lock(&self, task_id: TaskID) -> TaskGuard {
        self.locks.acquire(task_id).await
    }

    pub fn open(&self, project_id: ProjectID, notices: &mut Notices) -> BoardState {
        match self.store.list_by_project(project_id) {
            Ok(tasks) => {
                let board = BoardState::load(project_id, tasks);
                debug!(project_id, tasks = board.len(), "board opened");
                board
            }
            Err(e) => {
                warn!(project_id, "failed to load tasks: {}", e);
                notices.failure("Failed to load tasks");
                BoardState::empty(project_id)
            }
        }
    }

    /// Single click on a card: todo -> doing -> done. Done cards are inert.
    pub fn advance(
        &self,
        guard: &TaskGuard,
        board: BoardState,
        notices: &mut Notices,
    ) -> BoardState {
        let task_id = guard.task_id();

        let Some(from) = board.find(task_id).map(|t| t.status) else {
            debug!(task_id, project_id = board.project_id(), "advance of task not on board");
            notices.failure(TASK_NOT_FOUND);
            return board;
        };
        let Some(to) = from.advance() else {
            debug!(task_id, "advance ignored, task already done");
            return board;
        };

        self.commit_move(board, task_id, from, to, notices)
    }

    /// Drop a dragged card onto a column. Any column may be targeted; a drop
    /// onto the card's own column changes nothing.
    pub fn drop_task(
        &self,
        guard: &TaskGuard,
        board: BoardState,
        to: TaskStatus,
        notices: &mut Notices,
    ) -> BoardState {
        let task_id = guard.task_id();

        let Some(from) = board.find(task_id).map(|t| t.status) else {
            debug!(task_id, project_id = board.project_id(), "drop of task not on board");
            notices.failure(TASK_NOT_FOUND);
            return board;
        };
        if from == to {
            debug!(task_id, %to, "drop onto own column");
            return board;
        }

        self.commit_move(board, task_id, from, to, notices)
    }

    pub fn add_task(
        &self,
        mut board: BoardState,
        new_task: NewTask,
        notices: &mut Notices,
    ) -> BoardState {
        match self.try_add(&board, new_task) {
            Ok(task) => {
                info!(task_id = task.id, status = %task.status, "task added");
                board.apply_insert(task);
                notices.success("Task added successfully");
            }
            Err(InternalError::Validation(message)) => {
                debug!("task rejected: {}", message);
                notices.failure(message);
            }
            Err(e) => {
                warn!(project_id = board.project_id(), "failed to add task: {}", e);
                notices.failure("Failed to add task");
            }
        }

        board
    }

    pub fn delete_task(
        &self,
        guard: &TaskGuard,
        mut board: BoardState,
        notices: &mut Notices,
    ) -> BoardState {
        let task_id = guard.task_id();

        // Only tasks of the loaded project may be deleted through its board.
        if board.find(task_id).is_none() {
            debug!(task_id, project_id = board.project_id(), "delete of task not on board");
            notices.failure(TASK_NOT_FOUND);
            return board;
        }

        match self.store.delete(task_id) {
            Ok(()) => {
                info!(task_id, "task deleted");
                board.apply_remove(task_id);
                notices.success("Task deleted");
            }
            Err(e) => {
                warn!(task_id, "failed to delete task: {}", e);
                notices.failure("Failed to delete task");
            }
        }

        board
    }

    fn commit_move(
        &self,
        mut board: BoardState,
        task_id: TaskID,
        from: TaskStatus,
        to: TaskStatus,
        notices: &mut Notices,
    ) -> BoardState {
        match self.try_move(&mut board, task_id, from, to) {
            Ok(()) => {
                info!(task_id, %from, %to, "task moved");
                notices.success("Task moved successfully");
            }
            Err(e) => {
                warn!(task_id, %from, %to, "failed to move task: {}", e);
                notices.failure("Failed to move task");
            }
        }

        board
    }

    fn try_move(
        &self,
        board: &mut BoardState,
        task_id: TaskID,
        from: TaskStatus,
        to: TaskStatus,
    ) -> InternalResult<()> {
        self.store.update_status(task_id, to)?;
        board.apply_move(task_id, from, to)
    }

    fn try_add(&self, board: &BoardState, mut new_task: NewTask) -> InternalResult<Task> {
        new_task.title = new_task.title.trim().to_string();
        if new_task.title.is_empty() {
            return Err(InternalError::validation("Task title is required"));
        }
        if new_task.project_id != board.project_id() {
            return Err(InternalError::validation(
                "Task belongs to a different project",
            ));
        }
        if let Some(milestone_id) = new_task.milestone_id {
            if self.store.milestone_project(milestone_id)? != Some(new_task.project_id) {
                return Err(InternalError::validation(
                    "Milestone belongs to a different project",
                ));
            }
        }

        Ok(self.store.insert(&new_task)?)
    }
}
