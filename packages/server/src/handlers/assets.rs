use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::state::AppState;
use crate::utils::image::sniff_content_type;

/// Serve a stored image. Public, so that `image_url`s resolve in browsers.
#[utoipa::path(
    get,
    path = "/assets/{key}",
    tag = "Assets",
    operation_id = "getAsset",
    summary = "Download an image",
    params(("key" = String, Path, description = "Asset key, e.g. `bone-front-cotton-red`")),
    responses(
        (status = 200, description = "Image bytes", content_type = "application/octet-stream"),
        (status = 400, description = "Malformed key (VALIDATION_ERROR)", body = ErrorBody),
        (status = 404, description = "No image under this key (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state))]
pub async fn serve_asset(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let content = state.assets.fetch(&key).await?;
    let content_type = sniff_content_type(&content);

    Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "public, max-age=3600")
        .body(Body::from(content))
        .map_err(|e| AppError::Internal(e.to_string()))
}
