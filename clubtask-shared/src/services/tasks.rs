/// Task creation and status updates
///
/// Like membership, each operation mutates the caller's [`TaskBoard`]
/// snapshot and then overwrites the whole `Tasks` table. Whether the
/// assignee is one of the assigner's subordinates is checked by the caller
/// before [`TaskService::create`] runs.

use std::collections::HashSet;

use rand::Rng;
use tracing::{info, warn};

use super::error::{ServiceError, ServiceResult};
use crate::models::member::MemberRole;
use crate::models::task::{NewTask, Task, TaskBoard, TaskId, TaskStatus, TASK_ID_MAX, TASK_ID_MIN};
use crate::store::tasks::TaskSheet;

/// Draws a task id in `[100000, 999999]` that is not in `existing`
///
/// Resamples until a free id is found, so `existing` must not cover the
/// whole range.
pub fn generate_unique_id<R: Rng + ?Sized>(existing: &HashSet<u32>, rng: &mut R) -> u32 {
    loop {
        let id = rng.gen_range(TASK_ID_MIN..=TASK_ID_MAX);
        if !existing.contains(&id) {
            return id;
        }
    }
}

/// Task operations over the `Tasks` table
#[derive(Clone)]
pub struct TaskService {
    sheet: TaskSheet,
}

impl TaskService {
    pub fn new(sheet: TaskSheet) -> Self {
        Self { sheet }
    }

    /// Loads the board
    pub async fn load(&self) -> ServiceResult<TaskBoard> {
        Ok(self.sheet.load().await?)
    }

    /// Loads the board, falling back to an empty one if the read fails
    pub async fn load_or_empty(&self) -> TaskBoard {
        match self.sheet.load().await {
            Ok(board) => board,
            Err(e) => {
                warn!(error = %e, "Failed to load tasks, showing an empty board");
                TaskBoard::new()
            }
        }
    }

    /// Overwrites the table with `board`
    pub async fn persist(&self, board: &TaskBoard) -> ServiceResult<()> {
        self.sheet.save(board).await?;
        Ok(())
    }

    /// Creates a Pending task with a fresh id
    ///
    /// # Errors
    ///
    /// - `Validation` if the name, assignee or description is empty
    /// - `Persistence` if the write fails
    pub async fn create(
        &self,
        board: &mut TaskBoard,
        new_task: NewTask,
        assigner_role: MemberRole,
    ) -> ServiceResult<Task> {
        if new_task.name.trim().is_empty()
            || new_task.assigned_to.trim().is_empty()
            || new_task.description.trim().is_empty()
        {
            return Err(ServiceError::Validation(
                "Please fill all required fields.".to_string(),
            ));
        }

        let id = generate_unique_id(&board.existing_ids(), &mut rand::thread_rng());

        let task = Task {
            id: TaskId(id),
            name: new_task.name,
            assigned_to: new_task.assigned_to,
            role: assigner_role,
            status: TaskStatus::Pending,
            deadline: new_task.deadline,
            priority: new_task.priority,
            description: new_task.description,
            extra: Vec::new(),
        };

        board.push(task.clone());
        self.persist(board).await?;

        info!(
            task_id = %task.id,
            assignee = %task.assigned_to,
            role = %task.role,
            "Task created"
        );

        Ok(task)
    }

    /// Sets the status of task `id`
    ///
    /// # Errors
    ///
    /// - `NotFound` if no parsed task has this id
    /// - `Persistence` if the write fails
    pub async fn update_status(
        &self,
        board: &mut TaskBoard,
        id: TaskId,
        status: TaskStatus,
    ) -> ServiceResult<Task> {
        let task = board
            .get_mut(id)
            .ok_or_else(|| ServiceError::NotFound(format!("Task {} not found", id)))?;
        task.status = status;
        let task = task.clone();

        self.persist(board).await?;

        info!(task_id = %id, status = %status, "Task status updated");
        Ok(task)
    }

    /// Empties the board and writes the header only
    pub async fn clear_all(&self, board: &mut TaskBoard) -> ServiceResult<usize> {
        let removed = board.len() + board.unparsed_count();
        board.clear();
        self.persist(board).await?;

        warn!(removed, "All tasks cleared");
        Ok(removed)
    }
}
