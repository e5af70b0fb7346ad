use std::sync::Arc;

use lambda_http::http::header::{HeaderValue, VARY};
use lambda_http::{
    http::{Method, StatusCode},
    Body, Error, Request, Response,
};
use marlow_atoms::{categories, media, pieces};
use marlow_shared::AppState;
use tagging_block::{gallery, pieces as piece_workflows, removal};

fn with_cors_headers(mut resp: Response<Body>) -> Response<Body> {
    let headers = resp.headers_mut();
    headers.insert(
        "Access-Control-Allow-Origin",
        HeaderValue::from_static("*"),
    );
    headers.insert(
        "Access-Control-Allow-Methods",
        HeaderValue::from_static("GET,POST,PUT,PATCH,DELETE,OPTIONS"),
    );
    headers.insert(
        "Access-Control-Allow-Headers",
        HeaderValue::from_static("Content-Type,Authorization,X-User-Id"),
    );
    headers.append(VARY, HeaderValue::from_static("Origin"));

    resp
}

fn finalize_response(resp: Result<Response<Body>, Error>) -> Result<Response<Body>, Error> {
    resp.map(with_cors_headers)
}

/// Main Lambda handler - routes requests to the tagging endpoints.
///
/// Identity is handled upstream; the `X-User-Id` header carries through as
/// `createdBy` on writes.
pub(crate) async fn function_handler(
    event: Request,
    state: Arc<AppState>,
) -> Result<Response<Body>, Error> {
    let method = event.method();
    let path = event.uri().path();
    let body = event.body();
    tracing::info!("API Lambda invoked - Method: {} Path: {}", method, path);

    // Handle CORS preflight
    if method == "OPTIONS" {
        let resp = Response::builder()
            .status(StatusCode::OK)
            .body(Body::Empty)
            .map_err(Box::new)?;
        return Ok(with_cors_headers(resp));
    }

    let user_id = event
        .headers()
        .get("X-User-Id")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("anonymous")
        .to_string();

    let store = &state.store;
    let parts: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let resp = match (method, parts.as_slice()) {
        // --- CATEGORIES ---
        (&Method::GET, ["categories"]) => categories::http::list_categories_handler(store).await,
        (&Method::POST, ["categories"]) => {
            categories::http::create_category_handler(store, body).await
        }
        (&Method::GET, ["categories", category_id]) => {
            categories::http::get_category_handler(store, category_id).await
        }
        (&Method::PATCH, ["categories", category_id]) => {
            categories::http::update_category_handler(store, category_id, body).await
        }
        // DELETE /categories/{id} - soft delete, tags stay readable
        (&Method::DELETE, ["categories", category_id]) => {
            categories::http::delete_category_handler(store, category_id).await
        }

        // --- TAGS ---
        (&Method::GET, ["categories", category_id, "tags"]) => {
            categories::http::list_tags_handler(store, category_id).await
        }
        (&Method::POST, ["categories", category_id, "tags"]) => {
            categories::http::create_tag_handler(store, category_id, body).await
        }
        (&Method::PATCH, ["tags", tag_id]) => {
            categories::http::update_tag_handler(store, tag_id, body).await
        }
        (&Method::DELETE, ["tags", tag_id]) => {
            categories::http::delete_tag_handler(store, tag_id).await
        }

        // --- IMAGES ---
        (&Method::GET, ["images"]) => media::http::list_images_handler(store).await,
        (&Method::POST, ["images"]) => media::http::create_image_handler(store, body).await,
        (&Method::POST, ["images", "search"]) => {
            media::http::search_images_handler(store, body).await
        }
        (&Method::GET, ["images", image_id]) => {
            media::http::get_image_handler(store, image_id).await
        }
        (&Method::PUT, ["images", image_id, "tags"]) => {
            media::http::set_image_tags_handler(store, image_id, body).await
        }
        // DELETE /images/{id} - best-effort composite: detach from every
        // piece, then drop the record; answers with the step report
        (&Method::DELETE, ["images", image_id]) => {
            removal::delete_image_everywhere_handler(store, image_id).await
        }

        // --- PIECES ---
        (&Method::GET, ["pieces"]) => pieces::http::list_pieces_handler(store).await,
        (&Method::POST, ["pieces"]) => {
            pieces::http::create_piece_handler(store, &user_id, body).await
        }
        (&Method::POST, ["pieces", "search"]) => {
            pieces::http::search_pieces_handler(store, body).await
        }
        (&Method::POST, ["pieces", "browse"]) => {
            piece_workflows::browse_pieces_handler(store, body).await
        }
        (&Method::GET, ["pieces", piece_id]) => {
            pieces::http::get_piece_handler(store, piece_id).await
        }
        (&Method::PATCH, ["pieces", piece_id]) => {
            pieces::http::update_piece_handler(store, piece_id, body).await
        }
        (&Method::DELETE, ["pieces", piece_id]) => {
            pieces::http::delete_piece_handler(store, piece_id).await
        }
        (&Method::POST, ["pieces", piece_id, "images"]) => {
            pieces::http::assign_image_handler(store, piece_id, body).await
        }
        (&Method::DELETE, ["pieces", piece_id, "images", image_id]) => {
            pieces::http::unassign_image_handler(store, piece_id, image_id).await
        }
        (&Method::PUT, ["pieces", piece_id, "images", image_id, "default"]) => {
            pieces::http::set_default_image_handler(store, piece_id, image_id, body).await
        }
        (&Method::PUT, ["pieces", piece_id, "tags"]) => {
            pieces::http::set_piece_tags_handler(store, piece_id, body).await
        }

        // --- FILTERS / GALLERY ---
        (&Method::POST, ["filters", "triad"]) => {
            piece_workflows::triad_toggle_handler(store, body).await
        }
        (&Method::GET, ["gallery", "unassigned"]) => {
            gallery::unassigned_images_handler(store).await
        }

        _ => {
            tracing::warn!("No route matched - Method: {} Path: {}", method, path);
            not_found()
        }
    };

    finalize_response(resp)
}

fn not_found() -> Result<Response<Body>, Error> {
    Ok(Response::builder()
        .status(StatusCode::NOT_FOUND)
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(serde_json::json!({"error": "Not found"}).to_string().into())
        .map_err(Box::new)?)
}
