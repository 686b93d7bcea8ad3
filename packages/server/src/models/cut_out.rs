use chrono::{DateTime, Utc};
use common::{Color, CutOutStatus, CutType, Fabric, Position, ProductModel};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

use super::shared::{validate_bulk_ids, validate_optional_display_order, validate_sku};

/// Maximum number of layers in one preview.
pub const MAX_PREVIEW_LAYERS: usize = 32;

/// Display order as sent by forms: either a JSON number or a numeric string.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum DisplayOrderInput {
    Number(i64),
    Text(String),
}

impl DisplayOrderInput {
    pub fn parse(&self) -> Result<i32, AppError> {
        let value = match self {
            Self::Number(n) => *n,
            Self::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|_| AppError::Validation("Display order must be an integer".into()))?,
        };
        let value = i32::try_from(value)
            .map_err(|_| AppError::Validation("Display order is out of range".into()))?;
        validate_optional_display_order(Some(value))?;
        Ok(value)
    }
}

/// Request body for registering a cut-out whose image was already uploaded.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct RegisterCutOutRequest {
    #[schema(example = "BN-FR-CT-RD-001")]
    pub sku: String,
    pub cut_type: CutType,
    pub position: Position,
    pub product_model: ProductModel,
    pub fabric: Fabric,
    pub color: Color,
    /// URL returned by the upload endpoint.
    #[schema(example = "http://127.0.0.1:3000/api/v1/assets/bone-front-cotton-red")]
    pub image_url: String,
    /// Integer or numeric string, `>= 0`.
    #[schema(value_type = i32, example = 1)]
    pub display_order: DisplayOrderInput,
}

pub fn validate_register_cut_out(req: &RegisterCutOutRequest) -> Result<i32, AppError> {
    validate_sku(&req.sku)?;
    if req.image_url.trim().is_empty() {
        return Err(AppError::Validation("Image URL must not be empty".into()));
    }
    req.display_order.parse()
}

/// Partial update of a cut-out. Absent fields keep their current value.
#[derive(Deserialize, Default, PartialEq, Debug, Clone, utoipa::ToSchema)]
pub struct UpdateCutOutRequest {
    pub sku: Option<String>,
    pub display_order: Option<i32>,
    pub cut_type: Option<CutType>,
    pub position: Option<Position>,
    pub product_model: Option<ProductModel>,
    pub fabric: Option<Fabric>,
    pub color: Option<Color>,
    pub status: Option<CutOutStatus>,
}

pub fn validate_update_cut_out(req: &UpdateCutOutRequest) -> Result<(), AppError> {
    if let Some(ref sku) = req.sku {
        validate_sku(sku)?;
    }
    validate_optional_display_order(req.display_order)
}

/// `?id=` selector used by the update and delete endpoints.
#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CutOutIdQuery {
    /// Cut-out ID.
    pub id: Option<String>,
}

impl CutOutIdQuery {
    /// `Ok(None)` when the parameter is absent, a validation error when it is
    /// not a UUID.
    pub fn parse(&self) -> Result<Option<Uuid>, AppError> {
        match self.id.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Uuid::parse_str(raw)
                .map(Some)
                .map_err(|_| AppError::Validation(format!("'{raw}' is not a valid cut-out id"))),
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PreviewQuery {
    /// Comma-separated cut-out IDs.
    pub ids: String,
}

impl PreviewQuery {
    pub fn parse(&self) -> Result<Vec<Uuid>, AppError> {
        let ids = self
            .ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|raw| {
                Uuid::parse_str(raw)
                    .map_err(|_| AppError::Validation(format!("'{raw}' is not a valid cut-out id")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        validate_bulk_ids(&ids, "ids", MAX_PREVIEW_LAYERS)?;
        Ok(ids)
    }
}

#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct CutOutResponse {
    pub id: Uuid,
    pub sku: String,
    #[schema(example = "bone-front-cotton-red")]
    pub key: String,
    pub display_order: i32,
    pub cut_type: CutType,
    pub position: Position,
    pub product_model: ProductModel,
    pub fabric: Fabric,
    pub color: Color,
    pub status: CutOutStatus,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<crate::entity::cut_out::Model> for CutOutResponse {
    fn from(m: crate::entity::cut_out::Model) -> Self {
        Self {
            id: m.id,
            sku: m.sku,
            key: m.key,
            display_order: m.display_order,
            cut_type: m.cut_type,
            position: m.position,
            product_model: m.product_model,
            fabric: m.fabric,
            color: m.color,
            status: m.status,
            image_url: m.image_url,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Result of uploading an image.
#[derive(Serialize, utoipa::ToSchema)]
pub struct UploadResponse {
    /// Absolute URL of the stored image.
    pub secure_url: String,
    /// Key the image is stored under.
    #[schema(example = "bone-front-cotton-red")]
    pub public_id: String,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct DeleteCutOutResponse {
    pub message: String,
    pub deleted: CutOutResponse,
}

/// One image of a layered preview.
#[derive(Serialize, Debug, PartialEq, utoipa::ToSchema)]
pub struct PreviewLayer {
    pub id: Uuid,
    pub key: String,
    pub image_url: String,
    /// Stacking index; equals the cut-out's display order.
    pub z_index: i32,
}

/// Layers ordered back to front.
#[derive(Serialize, utoipa::ToSchema)]
pub struct PreviewResponse {
    pub layers: Vec<PreviewLayer>,
}

/// A selectable value with its display label.
#[derive(Serialize, Debug, PartialEq, utoipa::ToSchema)]
pub struct CatalogOption {
    #[schema(example = "NAVY_BLUE")]
    pub value: &'static str,
    #[schema(example = "Navy Blue")]
    pub label: &'static str,
}

/// Allowed values of every categorical attribute.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CatalogOptionsResponse {
    pub product_models: Vec<CatalogOption>,
    pub cut_types: Vec<CatalogOption>,
    pub positions: Vec<CatalogOption>,
    pub fabrics: Vec<CatalogOption>,
    pub colors: Vec<CatalogOption>,
    pub statuses: Vec<CatalogOption>,
}

macro_rules! options_of {
    ($ty:ty) => {
        <$ty>::ALL
            .iter()
            .map(|v| CatalogOption {
                value: v.as_str(),
                label: v.label(),
            })
            .collect()
    };
}

impl CatalogOptionsResponse {
    pub fn build() -> Self {
        Self {
            product_models: options_of!(ProductModel),
            cut_types: options_of!(CutType),
            positions: options_of!(Position),
            fabrics: options_of!(Fabric),
            colors: options_of!(Color),
            statuses: options_of!(CutOutStatus),
        }
    }
}
