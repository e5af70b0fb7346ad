use lambda_http::{http::StatusCode, Body, Error, Response};

use marlow_atoms::categories::service::transformation_tag_ids;
use marlow_atoms::error::{error_response, CoreError};
use marlow_atoms::filter::{matches_tag_filter, matches_text_search, toggle_transformation_triad};
use marlow_atoms::media::model::TagMap;
use marlow_atoms::pieces::model::{FurniturePiece, PieceWithStatus};
use marlow_atoms::pieces::service::list_pieces;
use marlow_atoms::store::RecordStore;

use crate::types::{BrowsePiecesPayload, TriadTogglePayload};

/// Pieces matching a combined text + tag query, with derived status attached.
pub async fn browse_pieces(
    store: &impl RecordStore,
    payload: &BrowsePiecesPayload,
) -> Result<Vec<PieceWithStatus>, CoreError> {
    let empty_filter = TagMap::new();
    let filter = payload.tags.as_ref().unwrap_or(&empty_filter);
    let term = payload.term.as_deref().unwrap_or("");

    let matches = |piece: &FurniturePiece| {
        matches_tag_filter(&piece.tags, filter)
            && matches_text_search(
                [
                    piece.name.as_str(),
                    piece.description.as_deref().unwrap_or(""),
                    piece.furniture_type.as_deref().unwrap_or(""),
                ],
                term,
            )
    };

    Ok(list_pieces(store)
        .await?
        .into_iter()
        .filter(matches)
        .map(PieceWithStatus::from)
        .collect())
}

/// Expand a combined-triad toggle into the three per-tag selection changes
/// and return the resulting selection.
pub async fn apply_triad_toggle(
    store: &impl RecordStore,
    payload: TriadTogglePayload,
) -> Result<TagMap, CoreError> {
    let triad = transformation_tag_ids(store, &payload.category_id).await?;

    let mut selection = payload.selection;
    toggle_transformation_triad(&mut selection, &payload.category_id, &triad, payload.enable);
    Ok(selection)
}

/// HTTP Handler: POST /pieces/browse
pub async fn browse_pieces_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: BrowsePiecesPayload = if body.is_empty() {
        BrowsePiecesPayload::default()
    } else {
        serde_json::from_slice(body)?
    };

    match browse_pieces(store, &payload).await {
        Ok(pieces) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&pieces)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

/// HTTP Handler: POST /filters/triad
pub async fn triad_toggle_handler(
    store: &impl RecordStore,
    body: &[u8],
) -> Result<Response<Body>, Error> {
    let payload: TriadTogglePayload = serde_json::from_slice(body)?;
    match apply_triad_toggle(store, payload).await {
        Ok(selection) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&selection)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}
