use std::str::FromStr;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::{Json, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use common::catalog::ParseCatalogError;
use common::{Color, CutOutStatus, CutType, Fabric, IdentityFields, ProductModel};
use sea_orm::*;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::entity::cut_out;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::cut_out::*;
use crate::services::preview::stack_layers;
use crate::services::{CutOutUpdate, SeaOrmCutOutStore};
use crate::state::AppState;
use crate::utils::image::sniff_content_type;

/// Room for multipart boundaries and the text fields next to the image.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

pub fn upload_body_limit(max_asset_size: u64) -> DefaultBodyLimit {
    DefaultBodyLimit::max(max_asset_size as usize + MULTIPART_OVERHEAD)
}

#[utoipa::path(
    post,
    path = "/cut-outs/upload",
    tag = "Cut-outs",
    operation_id = "uploadCutOutImage",
    summary = "Upload a cut-out image",
    description = "Stores the `image` multipart field under the key derived from the \
        `product_model`, `cut_type`, `fabric` and `color` fields. An image already stored \
        under that key is replaced. Use the returned `secure_url` when registering the cut-out.",
    request_body(content_type = "multipart/form-data", description = "Image file plus the four identity fields"),
    responses(
        (status = 200, description = "Image stored", body = UploadResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 413, description = "Image too large (PAYLOAD_TOO_LARGE)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let limit = state.config.storage.max_asset_size;

    let mut image: Option<(Vec<u8>, Option<String>)> = None;
    let mut product_model: Option<ProductModel> = None;
    let mut cut_type: Option<CutType> = None;
    let mut fabric: Option<Fabric> = None;
    let mut color: Option<Color> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, limit))?
    {
        match field.name() {
            Some("image") => {
                let declared = field.content_type().map(str::to_owned).or_else(|| {
                    field
                        .file_name()
                        .and_then(|name| mime_guess::from_path(name).first())
                        .map(|mime| mime.to_string())
                });
                let data = field.bytes().await.map_err(|e| multipart_error(e, limit))?;
                image = Some((data.to_vec(), declared));
            }
            Some("product_model") => product_model = Some(parse_field(field, limit).await?),
            Some("cut_type") => cut_type = Some(parse_field(field, limit).await?),
            Some("fabric") => fabric = Some(parse_field(field, limit).await?),
            Some("color") => color = Some(parse_field(field, limit).await?),
            _ => {} // Ignore unknown fields.
        }
    }

    let (data, declared) = image.ok_or_else(|| missing_field("image"))?;
    if data.is_empty() {
        return Err(AppError::Validation("Image must not be empty".into()));
    }
    let content_type = match sniff_content_type(&data) {
        "application/octet-stream" => declared
            .filter(|ct| ct.starts_with("image/"))
            .ok_or_else(|| AppError::Validation("File must be an image".into()))?,
        sniffed => sniffed.to_string(),
    };

    let identity = IdentityFields {
        product_model: product_model.ok_or_else(|| missing_field("product_model"))?,
        cut_type: cut_type.ok_or_else(|| missing_field("cut_type"))?,
        fabric: fabric.ok_or_else(|| missing_field("fabric"))?,
        color: color.ok_or_else(|| missing_field("color"))?,
    };
    let key = identity.key();

    let stored = state
        .assets
        .upload(&key, &data, Some(&content_type))
        .await?;

    info!(key = %stored.key, size = data.len(), "Cut-out image stored");
    Ok(Json(UploadResponse {
        secure_url: stored.url,
        public_id: stored.key,
    }))
}

fn missing_field(name: &str) -> AppError {
    AppError::Validation(format!("Missing '{name}' field"))
}

fn multipart_error(err: MultipartError, limit: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge { limit }
    } else {
        AppError::Validation(format!("Multipart error: {}", err.body_text()))
    }
}

async fn parse_field<T>(field: Field<'_>, limit: u64) -> Result<T, AppError>
where
    T: FromStr<Err = ParseCatalogError>,
{
    let text = field.text().await.map_err(|e| multipart_error(e, limit))?;
    text.trim()
        .parse()
        .map_err(|e: ParseCatalogError| AppError::Validation(e.to_string()))
}

#[utoipa::path(
    post,
    path = "/cut-outs",
    tag = "Cut-outs",
    operation_id = "registerCutOut",
    summary = "Register a cut-out",
    description = "Creates the catalog record for an uploaded image. The key is derived from \
        the identity fields; `display_order` accepts an integer or a numeric string.",
    request_body = RegisterCutOutRequest,
    responses(
        (status = 201, description = "Cut-out registered", body = CutOutResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "Same identity already registered (DUPLICATE_KEY)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id, sku = %payload.sku))]
pub async fn register_cut_out(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<RegisterCutOutRequest>,
) -> Result<impl IntoResponse, AppError> {
    let display_order = validate_register_cut_out(&payload)?;

    let identity = IdentityFields {
        product_model: payload.product_model,
        cut_type: payload.cut_type,
        fabric: payload.fabric,
        color: payload.color,
    };
    let now = Utc::now();

    let new_cut_out = cut_out::ActiveModel {
        id: Set(Uuid::new_v4()),
        sku: Set(payload.sku.trim().to_string()),
        key: Set(identity.key()),
        display_order: Set(display_order),
        cut_type: Set(payload.cut_type),
        position: Set(payload.position),
        product_model: Set(payload.product_model),
        fabric: Set(payload.fabric),
        color: Set(payload.color),
        status: Set(CutOutStatus::Active),
        image_url: Set(payload.image_url.trim().to_string()),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_cut_out
        .insert(&state.db)
        .await
        .map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => AppError::DuplicateKey,
            _ => AppError::from(e),
        })?;

    info!(id = %model.id, key = %model.key, "Cut-out registered");
    Ok((StatusCode::CREATED, Json(CutOutResponse::from(model))))
}

#[utoipa::path(
    get,
    path = "/cut-outs",
    tag = "Cut-outs",
    operation_id = "listCutOuts",
    summary = "List cut-outs",
    description = "Returns every cut-out, newest first.",
    responses(
        (status = 200, description = "All cut-outs", body = Vec<CutOutResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_cut_outs(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CutOutResponse>>, AppError> {
    let cut_outs = cut_out::Entity::find()
        .order_by_desc(cut_out::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(cut_outs.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/cut-outs/{id}",
    tag = "Cut-outs",
    operation_id = "getCutOut",
    summary = "Get a cut-out",
    params(("id" = Uuid, Path, description = "Cut-out ID")),
    responses(
        (status = 200, description = "Cut-out", body = CutOutResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Cut-out not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn get_cut_out(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CutOutResponse>, AppError> {
    let model = find_cut_out(&state.db, id).await?;
    Ok(Json(model.into()))
}

#[utoipa::path(
    put,
    path = "/cut-outs",
    tag = "Cut-outs",
    operation_id = "updateCutOut",
    summary = "Update a cut-out",
    description = "Applies a partial update. When the model, cut type, fabric or color changes, \
        the image is first moved to the newly derived key; if the record cannot be saved \
        afterwards the move is reverted. `INCONSISTENT_STATE` means the revert failed too and \
        the image and record must be reconciled by hand.",
    params(CutOutIdQuery),
    request_body = UpdateCutOutRequest,
    responses(
        (status = 200, description = "Updated cut-out", body = CutOutResponse),
        (status = 400, description = "Missing id (INVALID_REQUEST) or validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Cut-out not found (NOT_FOUND) or image missing (ASSET_MISSING)", body = ErrorBody),
        (status = 409, description = "Target key taken (KEY_CONFLICT, DUPLICATE_KEY)", body = ErrorBody),
        (status = 500, description = "ASSET_RENAME_FAILED, UPDATE_FAILED or INCONSISTENT_STATE", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query, payload), fields(user_id = auth_user.user_id))]
pub async fn update_cut_out(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CutOutIdQuery>,
    AppJson(payload): AppJson<UpdateCutOutRequest>,
) -> Result<Json<CutOutResponse>, AppError> {
    let id = query.parse()?;
    validate_update_cut_out(&payload)?;

    let store = SeaOrmCutOutStore::new(&state.db);
    let updated = CutOutUpdate::new(&store, state.assets.as_ref())
        .run(id, payload)
        .await?;

    Ok(Json(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/cut-outs",
    tag = "Cut-outs",
    operation_id = "deleteCutOut",
    summary = "Delete a cut-out",
    description = "Deletes the record, then its image. A failure to delete the image is logged \
        and does not fail the request.",
    params(CutOutIdQuery),
    responses(
        (status = 200, description = "Cut-out deleted", body = DeleteCutOutResponse),
        (status = 400, description = "Missing id (INVALID_REQUEST) or validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Cut-out not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn delete_cut_out(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<CutOutIdQuery>,
) -> Result<Json<DeleteCutOutResponse>, AppError> {
    let id = query
        .parse()?
        .ok_or_else(|| AppError::InvalidRequest("Cut-out id is required".into()))?;

    let model = find_cut_out(&state.db, id).await?;

    let result = cut_out::Entity::delete_by_id(id).exec(&state.db).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Cut-out {} not found", id)));
    }

    match state.assets.delete(&model.key).await {
        Ok(true) => info!(key = %model.key, "Cut-out image deleted"),
        Ok(false) => warn!(key = %model.key, "Cut-out image was already gone"),
        Err(e) => warn!(key = %model.key, error = %e, "Failed to delete cut-out image"),
    }

    Ok(Json(DeleteCutOutResponse {
        message: "Cut-out deleted".into(),
        deleted: model.into(),
    }))
}

#[utoipa::path(
    get,
    path = "/cut-outs/options",
    tag = "Cut-outs",
    operation_id = "getCutOutOptions",
    summary = "List allowed attribute values",
    description = "Every product model, cut type, position, fabric, color and status with its display label.",
    responses(
        (status = 200, description = "Allowed values", body = CatalogOptionsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(auth_user), fields(user_id = auth_user.user_id))]
pub async fn catalog_options(auth_user: AuthUser) -> Json<CatalogOptionsResponse> {
    Json(CatalogOptionsResponse::build())
}

#[utoipa::path(
    get,
    path = "/cut-outs/preview",
    tag = "Cut-outs",
    operation_id = "previewCutOuts",
    summary = "Compose a layered preview",
    description = "Returns the images of the requested cut-outs ordered back to front by \
        display order. Cut-outs with equal display order keep the requested order.",
    params(PreviewQuery),
    responses(
        (status = 200, description = "Preview layers", body = PreviewResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "A cut-out does not exist (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn preview_cut_outs(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<Json<PreviewResponse>, AppError> {
    let ids = query.parse()?;

    let records = cut_out::Entity::find()
        .filter(cut_out::Column::Id.is_in(ids.clone()))
        .all(&state.db)
        .await?;

    let layers = stack_layers(&ids, records)
        .map_err(|id| AppError::NotFound(format!("Cut-out {} not found", id)))?;

    Ok(Json(PreviewResponse { layers }))
}

async fn find_cut_out<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<cut_out::Model, AppError> {
    cut_out::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Cut-out {} not found", id)))
}
