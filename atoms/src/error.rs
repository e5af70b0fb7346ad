use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};
use thiserror::Error;

use crate::store::StoreError;

/// Error taxonomy shared by every service in this crate.
///
/// Validation failures carry the full message list so the admin UI can show
/// them inline; not-found is kept distinct so callers can refresh a stale
/// list instead of showing a generic failure.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("record store request failed: {0}")]
    Dependency(#[from] StoreError),
}

impl CoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        CoreError::Validation(vec![msg.into()])
    }

    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }
}

/// Map a service error onto the HTTP surface.
/// Validation -> 400 with the message list, NotFound -> 404, store -> 500.
pub fn error_response(err: &CoreError) -> Result<Response<Body>, LambdaError> {
    let (status, body) = match err {
        CoreError::Validation(messages) => (
            StatusCode::BAD_REQUEST,
            serde_json::json!({"errors": messages}),
        ),
        CoreError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            serde_json::json!({"error": format!("{} {} not found", entity, id)}),
        ),
        CoreError::Dependency(cause) => {
            tracing::error!("record store failure: {}", cause);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                serde_json::json!({"error": cause.to_string()}),
            )
        }
    };

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.to_string().into())
        .map_err(Box::new)?)
}
