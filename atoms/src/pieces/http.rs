use std::collections::HashMap;

use lambda_http::{http::StatusCode, Body, Error as LambdaError, Response};
use serde::Deserialize;

use super::model::{
    AssignImagePayload, CreatePiecePayload, PieceWithStatus, TransformationStatus,
    UpdatePiecePayload,
};
use super::service;
use crate::error::error_response;
use crate::media::model::TagSelection;
use crate::store::RecordStore;

#[derive(Debug, Deserialize)]
struct SetDefaultPayload {
    status: TransformationStatus,
}

#[derive(Debug, Deserialize)]
struct SearchPayload {
    term: String,
}

fn json_response(status: StatusCode, body: String) -> Result<Response<Body>, LambdaError> {
    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(body.into())
        .map_err(Box::new)?)
}

fn with_status(piece: super::model::FurniturePiece) -> PieceWithStatus {
    PieceWithStatus::from(piece)
}

/// HTTP Handler: GET /pieces
pub async fn list_pieces_handler(store: &impl RecordStore) -> Result<Response<Body>, LambdaError> {
    match service::list_pieces(store).await {
        Ok(pieces) => {
            let with_statuses: Vec<PieceWithStatus> =
                pieces.into_iter().map(PieceWithStatus::from).collect();
            json_response(StatusCode::OK, serde_json::to_string(&with_statuses)?)
        }
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /pieces
pub async fn create_piece_handler(
    store: &impl RecordStore,
    created_by: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: CreatePiecePayload = serde_json::from_slice(body)?;
    match service::create_piece(store, created_by, payload).await {
        Ok(piece) => json_response(
            StatusCode::CREATED,
            serde_json::to_string(&with_status(piece))?,
        ),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: GET /pieces/{id}
pub async fn get_piece_handler(
    store: &impl RecordStore,
    piece_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::get_piece(store, piece_id).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PATCH /pieces/{id}
pub async fn update_piece_handler(
    store: &impl RecordStore,
    piece_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: UpdatePiecePayload = serde_json::from_slice(body)?;
    match service::update_piece(store, piece_id, payload).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: DELETE /pieces/{id} (hard, no cascade)
pub async fn delete_piece_handler(
    store: &impl RecordStore,
    piece_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::delete_piece(store, piece_id).await {
        Ok(()) => Ok(Response::builder()
            .status(StatusCode::NO_CONTENT)
            .header("Access-Control-Allow-Origin", "*")
            .body(Body::Empty)
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /pieces/{id}/images (assign or move)
pub async fn assign_image_handler(
    store: &impl RecordStore,
    piece_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: AssignImagePayload = serde_json::from_slice(body)?;
    match service::assign_image_to_piece(store, piece_id, payload).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: DELETE /pieces/{id}/images/{imageId}
pub async fn unassign_image_handler(
    store: &impl RecordStore,
    piece_id: &str,
    image_id: &str,
) -> Result<Response<Body>, LambdaError> {
    match service::unassign_image(store, piece_id, image_id).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PUT /pieces/{id}/images/{imageId}/default
pub async fn set_default_image_handler(
    store: &impl RecordStore,
    piece_id: &str,
    image_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: SetDefaultPayload = serde_json::from_slice(body)?;
    match service::set_default_image(store, piece_id, image_id, payload.status).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: PUT /pieces/{id}/tags
pub async fn set_piece_tags_handler(
    store: &impl RecordStore,
    piece_id: &str,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: HashMap<String, TagSelection> = serde_json::from_slice(body)?;
    match service::set_piece_tags(store, piece_id, payload).await {
        Ok(piece) => json_response(StatusCode::OK, serde_json::to_string(&with_status(piece))?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /pieces/search
pub async fn search_pieces_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, LambdaError> {
    let payload: SearchPayload = serde_json::from_slice(body)?;
    match service::search_pieces(store, &payload.term).await {
        Ok(pieces) => {
            let with_statuses: Vec<PieceWithStatus> =
                pieces.into_iter().map(PieceWithStatus::from).collect();
            json_response(StatusCode::OK, serde_json::to_string(&with_statuses)?)
        }
        Err(e) => error_response(&e),
    }
}
