use chrono::NaiveDate;
use sea_orm::{ActiveModelTrait, ActiveValue, DatabaseConnection};
use task_manager_server::entities::task;
use task_manager_server::task::{
    NewTask, Task, TaskChanges, TaskPriority, TaskService, TaskServiceError, TaskStatus,
};

mod common;

pub struct TestContext {
    pub db: DatabaseConnection,
}

async fn setup() -> anyhow::Result<TestContext> {
    let db = common::setup_db().await?;
    Ok(TestContext { db })
}

/// Inserts a task row directly, bypassing the service.
async fn insert_task(db: &DatabaseConnection, title: &str) -> task::Model {
    let active_model = task::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(Some("Seeded".to_string())),
        status: ActiveValue::Set(TaskStatus::InProgress),
        priority: ActiveValue::Set(TaskPriority::High),
        due_date: ActiveValue::Set(NaiveDate::from_ymd_opt(2025, 6, 30)),
        ..Default::default()
    };
    active_model
        .insert(db)
        .await
        .expect("Failed to insert task")
}

#[tokio::test]
async fn can_create_task_with_defaults() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let created_task = task_service
        .create_task(NewTask::with_title("Write report"))
        .await
        .expect("Failed to create task");

    let expected_task = Task::new(
        created_task.id(),
        "Write report".to_string(),
        None,
        TaskStatus::Pending,
        TaskPriority::Medium,
        None,
    );
    assert_eq!(created_task, expected_task);
}

#[tokio::test]
async fn can_create_task_with_every_field() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let new_task = NewTask {
        title: "Plan sprint".to_string(),
        description: Some("Pick stories for next sprint".to_string()),
        status: TaskStatus::InProgress,
        priority: TaskPriority::Low,
        due_date: NaiveDate::from_ymd_opt(2025, 11, 3),
    };

    let created_task = task_service
        .create_task(new_task.clone())
        .await
        .expect("Failed to create task");
    let fetched_task = task_service
        .get_task_by_id(created_task.id())
        .await
        .expect("Failed to fetch task");

    assert_eq!(fetched_task, created_task);
    assert_eq!(fetched_task.title(), new_task.title);
    assert_eq!(fetched_task.description(), new_task.description.as_deref());
    assert_eq!(fetched_task.status(), new_task.status);
    assert_eq!(fetched_task.priority(), new_task.priority);
    assert_eq!(fetched_task.due_date(), new_task.due_date);
}

#[tokio::test]
async fn can_assign_distinct_ids() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let first = task_service
        .create_task(NewTask::with_title("First"))
        .await
        .expect("Failed to create first task");
    let second = task_service
        .create_task(NewTask::with_title("Second"))
        .await
        .expect("Failed to create second task");

    assert_ne!(first.id(), second.id());
}

#[tokio::test]
async fn can_avoid_reusing_id_of_deleted_task() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let deleted = task_service
        .create_task(NewTask::with_title("Short lived"))
        .await
        .expect("Failed to create task");
    task_service
        .delete_task_by_id(deleted.id())
        .await
        .expect("Failed to delete task");
    let replacement = task_service
        .create_task(NewTask::with_title("Replacement"))
        .await
        .expect("Failed to create task");

    assert!(replacement.id() > deleted.id());
}

#[tokio::test]
async fn can_get_all_tasks_ordered_by_id() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let first = insert_task(&state.db, "UserOne task").await;
    let second = insert_task(&state.db, "UserTwo task").await;

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    assert_eq!(tasks, vec![Task::from(first), Task::from(second)]);
}

#[tokio::test]
async fn can_handle_empty_task_list() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");

    assert!(tasks.is_empty());
}

#[tokio::test]
async fn can_handle_get_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.get_task_by_id(999).await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(999))));
    if let Err(e) = result {
        assert_eq!(e.to_string(), "Task with ID 999 not found");
    }
}

#[tokio::test]
async fn can_update_only_status() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Partial update").await;

    let updated_task = task_service
        .update_task_by_id(
            seeded.id as u32,
            TaskChanges {
                status: Some(TaskStatus::Done),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to update task");

    let expected_task = Task::new(
        seeded.id as u32,
        seeded.title,
        seeded.description,
        TaskStatus::Done,
        seeded.priority,
        seeded.due_date,
    );
    assert_eq!(updated_task, expected_task);
}

#[tokio::test]
async fn can_update_every_field() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Before").await;
    let changes = TaskChanges {
        title: Some("After".to_string()),
        description: Some("Rewritten".to_string()),
        status: Some(TaskStatus::Pending),
        priority: Some(TaskPriority::Low),
        due_date: NaiveDate::from_ymd_opt(2026, 1, 15),
    };

    task_service
        .update_task_by_id(seeded.id as u32, changes)
        .await
        .expect("Failed to update task");
    let stored_task = task_service
        .get_task_by_id(seeded.id as u32)
        .await
        .expect("Failed to fetch task");

    let expected_task = Task::new(
        seeded.id as u32,
        "After".to_string(),
        Some("Rewritten".to_string()),
        TaskStatus::Pending,
        TaskPriority::Low,
        NaiveDate::from_ymd_opt(2026, 1, 15),
    );
    assert_eq!(stored_task, expected_task);
}

#[tokio::test]
async fn can_leave_task_untouched_with_empty_changes() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Unchanged").await;

    let updated_task = task_service
        .update_task_by_id(seeded.id as u32, TaskChanges::default())
        .await
        .expect("Failed to update task");

    assert_eq!(updated_task, Task::from(seeded));
}

#[tokio::test]
async fn can_handle_update_when_task_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Some task").await;

    let non_existent_id = seeded.id as u32 + 1;
    let result = task_service
        .update_task_by_id(
            non_existent_id,
            TaskChanges {
                title: Some("Another title".to_string()),
                ..Default::default()
            },
        )
        .await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(id)) if id == non_existent_id));
}

#[tokio::test]
async fn can_delete_task() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Delete me").await;

    let deleted_task = task_service
        .delete_task_by_id(seeded.id as u32)
        .await
        .expect("Failed to delete task");

    assert_eq!(deleted_task, Task::from(seeded.clone()));
    let result = task_service.get_task_by_id(seeded.id as u32).await;
    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(_))));
}

#[tokio::test]
async fn can_report_not_found_on_second_delete() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);
    let seeded = insert_task(&state.db, "Delete twice").await;

    task_service
        .delete_task_by_id(seeded.id as u32)
        .await
        .expect("Failed to delete task");
    let result = task_service.delete_task_by_id(seeded.id as u32).await;

    assert!(matches!(result, Err(TaskServiceError::TaskNotFound(_))));
}

#[tokio::test]
async fn can_treat_out_of_range_id_as_not_found() {
    let state = setup().await.expect("Failed to setup test context");
    let task_service = TaskService::new(&state.db);

    let result = task_service.get_task_by_id(u32::MAX).await;

    assert!(matches!(
        result,
        Err(TaskServiceError::TaskNotFound(u32::MAX))
    ));
}

#[tokio::test]
async fn can_initialize_schema_twice() {
    let state = setup().await.expect("Failed to setup test context");

    task_manager_server::database::initialize(&state.db)
        .await
        .expect("Second initialization should be a no-op");

    let task_service = TaskService::new(&state.db);
    let tasks = task_service
        .get_all_tasks()
        .await
        .expect("Failed to get all tasks");
    assert!(tasks.is_empty());
}
