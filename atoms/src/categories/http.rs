use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::{CreateCategoryPayload, CreateTagPayload, UpdateCategoryPayload, UpdateTagPayload};
use super::service;
use crate::error::error_response;
use crate::store::RecordStore;

fn json_response(
    status: StatusCode,
    body: String,
) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

/// HTTP Handler: GET /categories
pub async fn list_categories_handler(
    store: &impl RecordStore,
) -> Result<Response<Body>, LambdaError> {
    match service::list_categories(store).await {
        Ok(categories) => json_response(StatusCode::OK, serde_json::to_string(&categories)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /categories
pub async fn create_category_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: CreateCategoryPayload = serde_json::from_slice(body)?;
    match service::create_category(store, payload).await {
        Ok(category) => json_response(StatusCode::CREATED, serde_json::to_string(&category)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: GET /categories/{id}
pub async fn get_category_handler(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::get_category(store, category_id).await {
        Ok(category) => json_response(StatusCode::OK, serde_json::to_string(&category)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PATCH /categories/{id}
pub async fn update_category_handler(
    store: &impl RecordStore,
    category_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UpdateCategoryPayload = serde_json::from_slice(body)?;
    match service::update_category(store, category_id, payload).await {
        Ok(category) => json_response(StatusCode::OK, serde_json::to_string(&category)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: DELETE /categories/{id} (soft)
pub async fn delete_category_handler(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::soft_delete_category(store, category_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: GET /categories/{id}/tags
pub async fn list_tags_handler(
    store: &impl RecordStore,
    category_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::list_tags_by_category(store, category_id).await {
        Ok(tags) => json_response(StatusCode::OK, serde_json::to_string(&tags)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /categories/{id}/tags
pub async fn create_tag_handler(
    store: &impl RecordStore,
    category_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: CreateTagPayload = serde_json::from_slice(body)?;
    match service::create_tag(store, category_id, payload).await {
        Ok(tag) => json_response(StatusCode::CREATED, serde_json::to_string(&tag)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PATCH /tags/{id}
pub async fn update_tag_handler(
    store: &impl RecordStore,
    tag_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UpdateTagPayload = serde_json::from_slice(body)?;
    match service::update_tag(store, tag_id, payload).await {
        Ok(tag) => json_response(StatusCode::OK, serde_json::to_string(&tag)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: DELETE /tags/{id} (soft)
pub async fn delete_tag_handler(
    store: &impl RecordStore,
    tag_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::soft_delete_tag(store, tag_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}
