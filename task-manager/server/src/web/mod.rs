use axum::Router;
use axum::http::HeaderValue;
use axum::response::Json;
use axum::routing::get;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use crate::config;
use crate::database;
use crate::task::{self, TaskState, create_task_router};

pub mod error;

/// Origins allowed to call the API from a browser.
pub const ALLOWED_ORIGINS: [&str; 2] = ["http://localhost:3000", "http://127.0.0.1:3000"];

/// JSON body carrying a status message.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Task Manager API",
        description = "Simple task manager backend"
    ),
    paths(
        root_handler,
        task::api::list_tasks_handler,
        task::api::create_task_handler,
        task::api::get_task_handler,
        task::api::update_task_handler,
        task::api::delete_task_handler,
    ),
    tags((name = "Tasks", description = "Create, read, update and delete tasks"))
)]
pub struct ApiDoc;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: config::Config) -> anyhow::Result<()> {
    let db = database::connect(&config.database_url).await?;
    database::initialize(&db).await?;

    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    axum::serve(listener, create_app(db)).await?;
    Ok(())
}

/// Builds the full application router around an initialized database.
pub fn create_app(db: sea_orm::DatabaseConnection) -> Router {
    let task_state = TaskState { db: Arc::new(db) };

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_check_handler))
        .merge(create_task_router(task_state))
        .merge(SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer()),
        )
}

/// Allows the local frontend origins with any method and header, credentials included.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(ALLOWED_ORIGINS.map(HeaderValue::from_static))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "The API is running", body = MessageResponse))
)]
pub async fn root_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Task Manager API is running".to_string(),
    })
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}
