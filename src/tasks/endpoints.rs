use rocket::serde::json::Json;
use rocket::{get, post, State};

use crate::data::DBConnection;
use crate::notice::Notices;

use super::board::BoardState;
use super::controller::{BoardController, TaskLocks};
use super::data::*;

// Board routes never fail: problems come back as failure notices.

fn board_controller(
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> BoardController<DBConnection> {
    BoardController::new(db_connection.inner().clone(), task_locks.inner().clone())
}

fn board_response(board: BoardState, notices: Notices) -> Json<BoardResponse> {
    Json(BoardResponse {
        board: board.view(),
        notices: notices.into_vec(),
    })
}

#[get("/get_board/<project_id>")]
pub fn get_board(
    project_id: ProjectID,
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> Json<BoardResponse> {
    let controller = board_controller(db_connection, task_locks);
    let mut notices = Notices::new();

    let board = controller.open(project_id, &mut notices);

    board_response(board, notices)
}

#[post("/add_task", format = "json", data = "<add_task_request>")]
pub fn add_task(
    add_task_request: Json<AddTaskRequest>,
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> Json<BoardResponse> {
    let controller = board_controller(db_connection, task_locks);
    let mut notices = Notices::new();
    let request = add_task_request.into_inner();

    let board = controller.open(request.project_id, &mut notices);
    let new_task = NewTask {
        title: request.title,
        status: request.status,
        project_id: request.project_id,
        milestone_id: request.milestone_id,
    };
    let board = controller.add_task(board, new_task, &mut notices);

    board_response(board, notices)
}

#[post("/advance_task", format = "json", data = "<advance_task_request>")]
pub async fn advance_task(
    advance_task_request: Json<AdvanceTaskRequest>,
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> Json<BoardResponse> {
    let controller = board_controller(db_connection, task_locks);
    let mut notices = Notices::new();

    // The board is read after the lock so it reflects any move that was
    // in flight for the same task.
    let guard = controller.lock(advance_task_request.task_id).await;
    let board = controller.open(advance_task_request.project_id, &mut notices);
    let board = controller.advance(&guard, board, &mut notices);

    board_response(board, notices)
}

#[post("/move_task", format = "json", data = "<move_task_request>")]
pub async fn move_task(
    move_task_request: Json<MoveTaskRequest>,
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> Json<BoardResponse> {
    let controller = board_controller(db_connection, task_locks);
    let mut notices = Notices::new();

    let guard = controller.lock(move_task_request.task_id).await;
    let board = controller.open(move_task_request.project_id, &mut notices);
    let board = controller.drop_task(&guard, board, move_task_request.to_status, &mut notices);

    board_response(board, notices)
}

#[post("/delete_task", format = "json", data = "<delete_task_request>")]
pub async fn delete_task(
    delete_task_request: Json<DeleteTaskRequest>,
    db_connection: &State<DBConnection>,
    task_locks: &State<TaskLocks>,
) -> Json<BoardResponse> {
    let controller = board_controller(db_connection, task_locks);
    let mut notices = Notices::new();

    let guard = controller.lock(delete_task_request.task_id).await;
    let board = controller.open(delete_task_request.project_id, &mut notices);
    let board = controller.delete_task(&guard, board, &mut notices);

    board_response(board, notices)
}
