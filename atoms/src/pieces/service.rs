use std::collections::HashMap;

use serde_json::Value;

use super::model::{
    AssignImagePayload, CreatePiecePayload, FurniturePiece, PieceImage, TransformationStatus,
    UpdatePiecePayload,
};
use crate::categories::service::transformation_category_ids;
use crate::error::CoreError;
use crate::filter::matches_text_search;
use crate::media::model::{normalize_tag_map, TagMap, TagSelection};
use crate::media::service::get_image;
use crate::store::{collections, decode, encode, Record, RecordStore};

/// Normalize a piece tag payload and strip transformation categories: that
/// axis is represented by `images[].status`, never duplicated into `tags`.
async fn normalize_piece_tags(
    store: &impl RecordStore,
    raw: HashMap<String, TagSelection>,
) -> Result<TagMap, CoreError> {
    let mut normalized = normalize_tag_map(raw);
    if normalized.is_empty() {
        return Ok(normalized);
    }
    let excluded = transformation_category_ids(store).await?;
    normalized.retain(|category_id, _| !excluded.contains(category_id));
    Ok(normalized)
}

/// Create a piece. The first image seen per status bucket becomes that
/// bucket's default.
pub async fn create_piece(
    store: &impl RecordStore,
    created_by: &str,
    payload: CreatePiecePayload,
) -> Result<FurniturePiece, CoreError> {
    if payload.name.trim().is_empty() {
        return Err(CoreError::validation("piece name is required"));
    }

    let now = chrono::Utc::now().to_rfc3339();
    let mut images: Vec<PieceImage> = Vec::with_capacity(payload.images.len());
    for assignment in payload.images {
        // referenced gallery images must exist
        get_image(store, &assignment.image_id).await?;
        if images.iter().any(|pi| pi.image_id == assignment.image_id) {
            continue;
        }
        let bucket_empty = !images.iter().any(|pi| pi.status == assignment.status);
        images.push(PieceImage {
            image_id: assignment.image_id,
            status: assignment.status,
            is_default: bucket_empty,
            assigned_at: now.clone(),
        });
    }

    let tags = match payload.tags {
        Some(raw) => normalize_piece_tags(store, raw).await?,
        None => TagMap::new(),
    };

    let mut piece = FurniturePiece {
        id: String::new(),
        name: payload.name.trim().to_string(),
        description: payload.description,
        furniture_type: payload.furniture_type,
        created_by: created_by.to_string(),
        images,
        tags,
        created_at: now,
        updated_at: None,
    };
    let mut fields = encode(&piece)?;
    fields.remove("id");
    piece.id = store.create(collections::PIECES, fields).await?;

    tracing::info!("created piece {} ({})", piece.name, piece.id);
    Ok(piece)
}

pub async fn get_piece(store: &impl RecordStore, id: &str) -> Result<FurniturePiece, CoreError> {
    let record = store
        .get(collections::PIECES, id)
        .await?
        .ok_or_else(|| CoreError::not_found("piece", id))?;
    Ok(decode(record)?)
}

/// Every piece, newest first.
pub async fn list_pieces(store: &impl RecordStore) -> Result<Vec<FurniturePiece>, CoreError> {
    let records = store.scan(collections::PIECES, &[]).await?;
    let mut pieces: Vec<FurniturePiece> = records
        .into_iter()
        .map(|r| decode::<FurniturePiece>(r).map_err(CoreError::from))
        .collect::<Result<_, _>>()?;
    pieces.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    Ok(pieces)
}

async fn save_images(
    store: &impl RecordStore,
    piece_id: &str,
    images: &[PieceImage],
) -> Result<(), CoreError> {
    let mut patch = Record::new();
    patch.insert(
        "images".to_string(),
        serde_json::to_value(images)
            .map_err(|e| CoreError::validation(format!("invalid image list: {}", e)))?,
    );
    patch.insert(
        "updatedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    store.update(collections::PIECES, piece_id, patch).await?;
    Ok(())
}

/// Attach an image to a piece, or move it to a new status bucket if it is
/// already attached. The image only becomes the bucket default when the
/// bucket it enters was empty; a vacated default is not replaced.
pub async fn assign_image_to_piece(
    store: &impl RecordStore,
    piece_id: &str,
    payload: AssignImagePayload,
) -> Result<FurniturePiece, CoreError> {
    let mut piece = get_piece(store, piece_id).await?;
    get_image(store, &payload.image_id).await?;

    let existing = piece
        .images
        .iter()
        .position(|pi| pi.image_id == payload.image_id);

    match existing {
        Some(idx) if piece.images[idx].status == payload.status => {
            // already where it should be
            return Ok(piece);
        }
        Some(idx) => {
            let target_empty = !piece
                .images
                .iter()
                .any(|pi| pi.status == payload.status);
            let entry = &mut piece.images[idx];
            entry.status = payload.status;
            entry.is_default = target_empty;
        }
        None => {
            let target_empty = !piece
                .images
                .iter()
                .any(|pi| pi.status == payload.status);
            piece.images.push(PieceImage {
                image_id: payload.image_id,
                status: payload.status,
                is_default: target_empty,
                assigned_at: chrono::Utc::now().to_rfc3339(),
            });
        }
    }

    save_images(store, piece_id, &piece.images).await?;
    get_piece(store, piece_id).await
}

/// Detach an image. If it was its bucket's default the bucket is left with
/// no default until an admin explicitly picks one.
pub async fn unassign_image(
    store: &impl RecordStore,
    piece_id: &str,
    image_id: &str,
) -> Result<FurniturePiece, CoreError> {
    let mut piece = get_piece(store, piece_id).await?;

    let before = piece.images.len();
    piece.images.retain(|pi| pi.image_id != image_id);
    if piece.images.len() == before {
        return Err(CoreError::not_found("image", image_id));
    }

    save_images(store, piece_id, &piece.images).await?;
    get_piece(store, piece_id).await
}

/// Make an image the default for its status bucket. Clears the flag on all
/// same-status siblings first; a no-op when the image already is the
/// default.
pub async fn set_default_image(
    store: &impl RecordStore,
    piece_id: &str,
    image_id: &str,
    status: TransformationStatus,
) -> Result<FurniturePiece, CoreError> {
    let mut piece = get_piece(store, piece_id).await?;

    let target = piece
        .images
        .iter()
        .position(|pi| pi.image_id == image_id && pi.status == status)
        .ok_or_else(|| CoreError::not_found("image", image_id))?;

    if piece.images[target].is_default {
        return Ok(piece);
    }

    for entry in piece.images.iter_mut() {
        if entry.status == status {
            entry.is_default = false;
        }
    }
    piece.images[target].is_default = true;

    save_images(store, piece_id, &piece.images).await?;
    get_piece(store, piece_id).await
}

/// Replace the piece's own (non-transformation) tag map. Transformation
/// categories in the payload are filtered out, not an error.
pub async fn set_piece_tags(
    store: &impl RecordStore,
    piece_id: &str,
    tags_by_category: HashMap<String, TagSelection>,
) -> Result<FurniturePiece, CoreError> {
    get_piece(store, piece_id).await?;
    let normalized = normalize_piece_tags(store, tags_by_category).await?;

    let mut patch = Record::new();
    if normalized.is_empty() {
        patch.insert("tags".to_string(), Value::Null);
    } else {
        patch.insert(
            "tags".to_string(),
            serde_json::to_value(&normalized)
                .map_err(|e| CoreError::validation(format!("invalid tag map: {}", e)))?,
        );
    }
    patch.insert(
        "updatedAt".to_string(),
        Value::String(chrono::Utc::now().to_rfc3339()),
    );
    store.update(collections::PIECES, piece_id, patch).await?;

    get_piece(store, piece_id).await
}

pub async fn update_piece(
    store: &impl RecordStore,
    piece_id: &str,
    payload: UpdatePiecePayload,
) -> Result<FurniturePiece, CoreError> {
    get_piece(store, piece_id).await?;

    if let Some(name) = payload.name.as_deref() {
        if name.trim().is_empty() {
            return Err(CoreError::validation("piece name is required"));
        }
    }

    let mut patch = Record::new();
    if let Some(name) = payload.name {
        patch.insert("name".to_string(), Value::String(name.trim().to_string()));
    }
    if let Some(description) = payload.description {
        patch.insert("description".to_string(), Value::String(description));
    }
    if let Some(furniture_type) = payload.furniture_type {
        patch.insert("furnitureType".to_string(), Value::String(furniture_type));
    }
    if !patch.is_empty() {
        patch.insert(
            "updatedAt".to_string(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        store.update(collections::PIECES, piece_id, patch).await?;
    }

    get_piece(store, piece_id).await
}

/// Case-insensitive substring search over name, description and furniture
/// type.
pub async fn search_pieces(
    store: &impl RecordStore,
    term: &str,
) -> Result<Vec<FurniturePiece>, CoreError> {
    let pieces = list_pieces(store).await?;
    Ok(pieces
        .into_iter()
        .filter(|piece| {
            matches_text_search(
                [
                    piece.name.as_str(),
                    piece.description.as_deref().unwrap_or(""),
                    piece.furniture_type.as_deref().unwrap_or(""),
                ],
                term,
            )
        })
        .collect())
}

/// Hard delete, no cascade: callers detach affected images first if they
/// care about referential tidiness.
pub async fn delete_piece(store: &impl RecordStore, id: &str) -> Result<(), CoreError> {
    get_piece(store, id).await?;
    store.delete(collections::PIECES, id).await?;
    tracing::info!("deleted piece {}", id);
    Ok(())
}
