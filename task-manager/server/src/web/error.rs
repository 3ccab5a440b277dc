use axum::{
    Json,
    body::Bytes,
    extract::{FromRequest, FromRequestParts, Request, rejection::PathRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::{Serialize, de::DeserializeOwned};
use serde_path_to_error::Segment;
use utoipa::ToSchema;

use crate::task::{TaskServiceError, TitleError};

/// JSON body carrying a single human-readable message.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailResponse {
    /// Human-readable outcome of the request
    pub detail: String,
}

impl DetailResponse {
    pub fn new(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
        }
    }
}

/// One rejected field of a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct ValidationIssue {
    /// Where the problem was found, e.g. `["body", "title"]`
    pub loc: Vec<String>,
    /// What is wrong with the value
    pub msg: String,
    /// Machine-readable category of the problem
    #[serde(rename = "type")]
    pub kind: String,
}

impl ValidationIssue {
    pub fn new(loc: &[&str], msg: impl Into<String>, kind: &str) -> Self {
        Self {
            loc: loc.iter().map(|segment| segment.to_string()).collect(),
            msg: msg.into(),
            kind: kind.to_string(),
        }
    }
}

/// JSON body returned for rejected requests.
#[derive(Debug, Serialize, ToSchema)]
pub struct ValidationErrorResponse {
    pub detail: Vec<ValidationIssue>,
}

/// Error type for JSON API handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The referenced resource does not exist.
    #[error("Task not found")]
    NotFound,
    /// The request was rejected before reaching storage.
    #[error("Request validation failed")]
    Validation(Vec<ValidationIssue>),
    /// Storage failed while serving the request.
    #[error("Internal server error")]
    Internal(#[source] TaskServiceError),
}

impl ApiError {
    pub fn validation(issue: ValidationIssue) -> Self {
        ApiError::Validation(vec![issue])
    }
}

impl From<TaskServiceError> for ApiError {
    fn from(err: TaskServiceError) -> Self {
        match err {
            TaskServiceError::TaskNotFound(_) => ApiError::NotFound,
            err => ApiError::Internal(err),
        }
    }
}

impl From<TitleError> for ApiError {
    fn from(err: TitleError) -> Self {
        let kind = match err {
            TitleError::Empty => "string_too_short",
            TitleError::TooLong { .. } => "string_too_long",
        };
        ApiError::validation(ValidationIssue::new(
            &["body", "title"],
            err.to_string(),
            kind,
        ))
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ApiError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let mut loc = vec!["body".to_string()];
        loc.extend(err.path().iter().filter_map(|segment| match segment {
            Segment::Seq { index } => Some(index.to_string()),
            Segment::Map { key } => Some(key.clone()),
            Segment::Enum { variant } => Some(variant.clone()),
            Segment::Unknown => None,
        }));

        let msg = err.inner().to_string();
        let kind = if let Some(field) = missing_field_name(&msg) {
            // Missing fields are reported at the enclosing object's path.
            loc.push(field.to_string());
            "missing"
        } else if msg.starts_with("unknown variant") {
            "enum"
        } else if msg.starts_with("invalid type") {
            "type_error"
        } else {
            "value_error"
        };

        ApiError::Validation(vec![ValidationIssue {
            loc,
            msg,
            kind: kind.to_string(),
        }])
    }
}

fn missing_field_name(msg: &str) -> Option<&str> {
    let rest = msg.strip_prefix("missing field `")?;
    rest.split('`').next()
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::validation(ValidationIssue::new(
            &["path", "id"],
            rejection.body_text(),
            "int_parsing",
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (
                StatusCode::NOT_FOUND,
                Json(DetailResponse::new("Task not found")),
            )
                .into_response(),
            ApiError::Validation(issues) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationErrorResponse { detail: issues }),
            )
                .into_response(),
            ApiError::Internal(err) => {
                tracing::error!("Request failed: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(DetailResponse::new("Internal Server Error")),
                )
                    .into_response()
            }
        }
    }
}

/// JSON body extractor whose rejections are reported as [`ApiError::Validation`],
/// located at the offending field.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        if !has_json_content_type(req.headers()) {
            return Err(ApiError::validation(ValidationIssue::new(
                &["body"],
                "Expected request with `Content-Type: application/json`",
                "missing_content_type",
            )));
        }
        let bytes = Bytes::from_request(req, state).await.map_err(|rejection| {
            ApiError::validation(ValidationIssue::new(
                &["body"],
                rejection.body_text(),
                "body_unreadable",
            ))
        })?;
        ValidatedJson::from_bytes(&bytes)
    }
}

impl<T: DeserializeOwned> ValidatedJson<T> {
    /// Parses a JSON body, separating malformed JSON from well-formed JSON of the wrong shape.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ApiError> {
        let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|err| {
            ApiError::validation(ValidationIssue::new(
                &["body"],
                format!("Failed to parse the request body as JSON: {err}"),
                "json_invalid",
            ))
        })?;
        let payload = serde_path_to_error::deserialize(value)?;
        Ok(ValidatedJson(payload))
    }
}

fn has_json_content_type(headers: &HeaderMap) -> bool {
    let Some(content_type) = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
    else {
        return false;
    };
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime == "application/json" || (mime.starts_with("application/") && mime.ends_with("+json"))
}

/// `Path` extractor whose rejections are reported as [`ApiError::Validation`].
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
