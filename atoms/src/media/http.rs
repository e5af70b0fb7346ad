use std::collections::HashMap;

use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};

use super::model::{CreateImagePayload, TagMap, TagSelection};
use super::service;
use crate::error::error_response;
use crate::store::RecordStore;

fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

/// HTTP Handler: GET /images
pub async fn list_images_handler(store: &impl RecordStore) -> Result<Response<Body>, LambdaError> {
    match service::list_images(store).await {
        Ok(images) => json_response(StatusCode::OK, serde_json::to_string(&images)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /images
pub async fn create_image_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: CreateImagePayload = serde_json::from_slice(body)?;
    match service::create_image(store, payload).await {
        Ok(image) => json_response(StatusCode::CREATED, serde_json::to_string(&image)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: GET /images/{id}
pub async fn get_image_handler(
    store: &impl RecordStore,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::get_image(store, image_id).await {
        Ok(image) => json_response(StatusCode::OK, serde_json::to_string(&image)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PUT /images/{id}/tags
///
/// Body: map of categoryId -> tagId or [tagId] (both accepted).
pub async fn set_image_tags_handler(
    store: &impl RecordStore,
    image_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: HashMap<String, TagSelection> = serde_json::from_slice(body)?;
    match service::set_image_tags(store, image_id, payload).await {
        Ok(image) => json_response(StatusCode::OK, serde_json::to_string(&image)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /images/search
///
/// Body: normalized tag filter, categoryId -> [tagId].
pub async fn search_images_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let filter: TagMap = serde_json::from_slice(body)?;
    match service::images_matching_tags(store, &filter).await {
        Ok(images) => json_response(StatusCode::OK, serde_json::to_string(&images)?),
        Err(e) => error_response(&e),
    }
}
