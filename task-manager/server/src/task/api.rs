use crate::task::{
    NewTask, Task, TaskChanges, TaskPriority, TaskService, TaskStatus, validate_title,
};
use crate::web::error::{
    ApiError, ApiPath, DetailResponse, ValidatedJson, ValidationErrorResponse,
};
use axum::{Router, extract::State, response::Json, routing::get};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Shared state for the task routes.
#[derive(Clone)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

/// JSON representation of a Task for API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier assigned on creation
    pub id: u32,
    /// Short summary of the work
    pub title: String,
    /// Longer free-form notes
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: TaskPriority,
    /// Calendar date the task is due, formatted `YYYY-MM-DD`
    pub due_date: Option<NaiveDate>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            status: task.status(),
            priority: task.priority(),
            due_date: task.due_date(),
        }
    }
}

/// Request body for creating a task.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: TaskStatus,
    #[serde(default)]
    pub priority: TaskPriority,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<CreateTaskRequest> for NewTask {
    type Error = ApiError;

    fn try_from(request: CreateTaskRequest) -> Result<Self, Self::Error> {
        validate_title(&request.title)?;
        Ok(NewTask {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
        })
    }
}

/// Request body for updating a task. Absent and `null` fields are left unchanged.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTaskRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl TryFrom<UpdateTaskRequest> for TaskChanges {
    type Error = ApiError;

    fn try_from(request: UpdateTaskRequest) -> Result<Self, Self::Error> {
        if let Some(title) = &request.title {
            validate_title(title)?;
        }
        Ok(TaskChanges {
            title: request.title,
            description: request.description,
            status: request.status,
            priority: request.priority,
            due_date: request.due_date,
        })
    }
}

/// Handler for GET /tasks - Returns every task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    responses(
        (status = 200, description = "All stored tasks, ordered by ID", body = Vec<TaskJson>),
        (status = 500, description = "Internal server error", body = DetailResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<TaskState>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let service = TaskService::new(&state.db);
    let tasks = service.get_all_tasks().await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = CreateTaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskJson),
        (status = 422, description = "Invalid task payload", body = ValidationErrorResponse),
        (status = 500, description = "Internal server error", body = DetailResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<TaskState>,
    ValidatedJson(payload): ValidatedJson<CreateTaskRequest>,
) -> Result<Json<TaskJson>, ApiError> {
    let new_task = NewTask::try_from(payload)?;
    let service = TaskService::new(&state.db);
    let task = service.create_task(new_task).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for GET /tasks/{id} - Returns a single task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The requested task", body = TaskJson),
        (status = 404, description = "Task not found", body = DetailResponse),
        (status = 422, description = "Invalid task ID", body = ValidationErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<TaskState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<TaskJson>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.get_task_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PUT /tasks/{id} - Overwrites the supplied fields of a task.
#[tracing::instrument(skip(state, payload))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    request_body = UpdateTaskRequest,
    responses(
        (status = 200, description = "The updated task", body = TaskJson),
        (status = 404, description = "Task not found", body = DetailResponse),
        (status = 422, description = "Invalid task payload", body = ValidationErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<TaskState>,
    ApiPath(id): ApiPath<u32>,
    ValidatedJson(payload): ValidatedJson<UpdateTaskRequest>,
) -> Result<Json<TaskJson>, ApiError> {
    let changes = TaskChanges::try_from(payload)?;
    let service = TaskService::new(&state.db);
    let task = service.update_task_by_id(id, changes).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id} - Removes a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Task deleted", body = DetailResponse),
        (status = 404, description = "Task not found", body = DetailResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<TaskState>,
    ApiPath(id): ApiPath<u32>,
) -> Result<Json<DetailResponse>, ApiError> {
    let service = TaskService::new(&state.db);
    service.delete_task_by_id(id).await?;
    Ok(Json(DetailResponse::new("Task deleted")))
}

/// Creates and returns the tasks router.
pub fn create_task_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
