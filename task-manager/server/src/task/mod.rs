use crate::entities::*;
use chrono::NaiveDate;
use sea_orm::*;

pub use crate::entities::sea_orm_active_enums::{TaskPriority, TaskStatus};

pub mod api;

pub use api::{TaskState, create_task_router};

/// Maximum number of characters allowed in a task title.
pub const TITLE_MAX_CHARS: usize = 200;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    priority: TaskPriority,
    due_date: Option<NaiveDate>,
}

impl Task {
    pub fn new(
        id: u32,
        title: String,
        description: Option<String>,
        status: TaskStatus,
        priority: TaskPriority,
        due_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            id,
            title,
            description,
            status,
            priority,
            due_date,
        }
    }

    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn priority(&self) -> TaskPriority {
        self.priority
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Task::new(
            model.id as u32,
            model.title,
            model.description,
            model.status,
            model.priority,
            model.due_date,
        )
    }
}

/// Fields for a task that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    /// Creates a pending, medium priority task with only a title.
    pub fn with_title(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            status: TaskStatus::default(),
            priority: TaskPriority::default(),
            due_date: None,
        }
    }
}

/// A partial update. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskChanges {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub due_date: Option<NaiveDate>,
}

impl TaskChanges {
    /// Returns true when no field would be overwritten.
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.status.is_none()
            && self.priority.is_none()
            && self.due_date.is_none()
    }

    fn apply_to(self, active_model: &mut task::ActiveModel) {
        if let Some(title) = self.title {
            active_model.title = ActiveValue::Set(title);
        }
        if let Some(description) = self.description {
            active_model.description = ActiveValue::Set(Some(description));
        }
        if let Some(status) = self.status {
            active_model.status = ActiveValue::Set(status);
        }
        if let Some(priority) = self.priority {
            active_model.priority = ActiveValue::Set(priority);
        }
        if let Some(due_date) = self.due_date {
            active_model.due_date = ActiveValue::Set(Some(due_date));
        }
    }
}

/// Reasons a title is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TitleError {
    #[error("Title must not be empty")]
    Empty,
    #[error("Title must be at most {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },
}

/// Checks a title against the stored column constraints.
pub fn validate_title(title: &str) -> Result<(), TitleError> {
    if title.trim().is_empty() {
        return Err(TitleError::Empty);
    }
    let actual = title.chars().count();
    if actual > TITLE_MAX_CHARS {
        return Err(TitleError::TooLong {
            max: TITLE_MAX_CHARS,
            actual,
        });
    }
    Ok(())
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
    /// Represents a task not found error.
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
}

pub struct TaskService<'a> {
    db: &'a sea_orm::DatabaseConnection,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService { db }
    }

    /// Retrieves all tasks, ordered by ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_all_tasks(&self) -> Result<Vec<Task>, TaskServiceError> {
        let tasks = task::Entity::find()
            .order_by_asc(task::Column::Id)
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `Task`, or `TaskNotFound` if no row has that ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let model = find_task(self.db, id).await?;
        Ok(Task::from(model))
    }

    /// Stores a new task. The ID is assigned by the database.
    ///
    /// # Arguments
    ///
    /// * `new_task` - The fields of the task to create.
    ///
    /// # Returns
    ///
    /// A `Result` containing the created `Task` including its ID.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, new_task: NewTask) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(new_task.title),
            description: ActiveValue::Set(new_task.description),
            status: ActiveValue::Set(new_task.status),
            priority: ActiveValue::Set(new_task.priority),
            due_date: ActiveValue::Set(new_task.due_date),
            ..Default::default()
        };
        let created_model = active_model.insert(&txn).await?;
        txn.commit().await?;
        tracing::info!("Created task {}", created_model.id);
        Ok(Task::from(created_model))
    }

    /// Overwrites the supplied fields of a task, leaving the others as stored.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `changes` - The fields to overwrite.
    ///
    /// # Returns
    ///
    /// A `Result` containing the updated `Task`, or `TaskNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: u32,
        changes: TaskChanges,
    ) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let task_to_update = find_task(&txn, id).await?;
        if changes.is_empty() {
            return Ok(Task::from(task_to_update));
        }

        let mut active_model: task::ActiveModel = task_to_update.into();
        changes.apply_to(&mut active_model);
        let updated_model = active_model.update(&txn).await?;
        txn.commit().await?;
        Ok(Task::from(updated_model))
    }

    /// Deletes a task by its ID.
    ///
    /// # Returns
    ///
    /// A `Result` containing the deleted `Task`, or `TaskNotFound`.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let txn = self.db.begin().await?;
        let task_to_delete = find_task(&txn, id).await?;
        task::Entity::delete_by_id(task_to_delete.id)
            .exec(&txn)
            .await?;
        txn.commit().await?;
        tracing::info!("Deleted task {}", id);
        Ok(Task::from(task_to_delete))
    }
}

async fn find_task<C: ConnectionTrait>(db: &C, id: u32) -> Result<task::Model, TaskServiceError> {
    // IDs beyond the column range cannot exist.
    let Ok(key) = i32::try_from(id) else {
        return Err(TaskServiceError::TaskNotFound(id));
    };
    task::Entity::find_by_id(key)
        .one(db)
        .await?
        .ok_or(TaskServiceError::TaskNotFound(id))
}
