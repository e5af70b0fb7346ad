use lambda_http::{http::StatusCode, Body, Error, Response};

use marlow_atoms::media::service::delete_image;
use marlow_atoms::pieces::service::{list_pieces, unassign_image};
use marlow_atoms::store::RecordStore;

use crate::types::{StepOutcome, StepReport};

/// Remove an image from the whole system: detach it from every piece that
/// references it, then delete the gallery record.
///
/// There is no multi-document transaction, so this is deliberately
/// best-effort: every step is attempted, failures are collected, and nothing
/// already applied is rolled back. Callers get the full per-step report.
pub async fn delete_image_everywhere(store: &impl RecordStore, image_id: &str) -> StepReport {
    let mut steps = Vec::new();

    match list_pieces(store).await {
        Ok(pieces) => {
            for piece in pieces
                .iter()
                .filter(|p| p.images.iter().any(|pi| pi.image_id == image_id))
            {
                let step = format!("detach from piece {}", piece.id);
                match unassign_image(store, &piece.id, image_id).await {
                    Ok(_) => steps.push(StepOutcome::succeeded(step)),
                    Err(e) => {
                        tracing::warn!("detach of {} from {} failed: {}", image_id, piece.id, e);
                        steps.push(StepOutcome::failed(step, e));
                    }
                }
            }
        }
        Err(e) => {
            tracing::warn!("piece scan failed while removing {}: {}", image_id, e);
            steps.push(StepOutcome::failed("scan pieces", e));
        }
    }

    // attempted even when detaching failed: a dangling piece reference is
    // preferable to an undeletable image
    match delete_image(store, image_id).await {
        Ok(()) => steps.push(StepOutcome::succeeded("delete image record")),
        Err(e) => steps.push(StepOutcome::failed("delete image record", e)),
    }

    StepReport::new(steps)
}

/// HTTP Handler: DELETE /images/{id}
///
/// Always answers with the step report; 200 only when every step applied.
pub async fn delete_image_everywhere_handler(
    store: &impl RecordStore,
    image_id: &str,
) -> Result<Response<Body>, Error> {
    let report = delete_image_everywhere(store, image_id).await;
    let status = if report.ok {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    Ok(Response::builder()
        .status(status)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::to_string(&report)?.into())
        .map_err(Box::new)?)
}
