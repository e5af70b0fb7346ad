use lambda_http::{http::StatusCode, Body, Error, Response};

use marlow_atoms::error::{error_response, CoreError};
use marlow_atoms::filter::unassigned_images;
use marlow_atoms::media::model::Image;
use marlow_atoms::media::service::list_images;
use marlow_atoms::pieces::service::list_pieces;
use marlow_atoms::store::RecordStore;

/// Images not yet grouped into any piece: the candidate pool shown when an
/// admin builds a new transformation record.
pub async fn load_unassigned_images(store: &impl RecordStore) -> Result<Vec<Image>, CoreError> {
    let images = list_images(store).await?;
    let pieces = list_pieces(store).await?;
    Ok(unassigned_images(&images, &pieces)
        .into_iter()
        .cloned()
        .collect())
}

/// HTTP Handler: GET /gallery/unassigned
pub async fn unassigned_images_handler(
    store: &impl RecordStore,
) -> Result<Response<Body>, Error> {
    match load_unassigned_images(store).await {
        Ok(images) => Ok(Response::builder()
            .status(StatusCode::OK)
            .header("Content-Type", "application/json")
            .header("Access-Control-Allow-Origin", "*")
            .body(serde_json::to_string(&images)?.into())
            .map_err(Box::new)?),
        Err(e) => error_response(&e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use marlow_atoms::media::model::CreateImagePayload;
    use marlow_atoms::media::service::create_image;
    use marlow_atoms::pieces::model::{CreatePiecePayload, ImageAssignment, TransformationStatus};
    use marlow_atoms::pieces::service::create_piece;
    use marlow_atoms::store::MemoryStore;

    #[tokio::test]
    async fn only_images_outside_every_piece_are_unassigned() {
        let store = MemoryStore::new();
        let grouped = create_image(
            &store,
            CreateImagePayload {
                url: "https://cdn.example.com/grouped.jpg".to_string(),
                alt_text: None,
            },
        )
        .await
        .unwrap();
        let loose = create_image(
            &store,
            CreateImagePayload {
                url: "https://cdn.example.com/loose.jpg".to_string(),
                alt_text: None,
            },
        )
        .await
        .unwrap();

        create_piece(
            &store,
            "admin",
            CreatePiecePayload {
                name: "Sofa".to_string(),
                description: None,
                furniture_type: None,
                images: vec![ImageAssignment {
                    image_id: grouped.id.clone(),
                    status: TransformationStatus::Before,
                }],
                tags: None,
            },
        )
        .await
        .unwrap();

        let unassigned = load_unassigned_images(&store).await.unwrap();
        assert_eq!(unassigned.len(), 1);
        assert_eq!(unassigned[0].id, loose.id);
    }
}
