use common::{Color, CutOutStatus, CutType, Fabric, Position, ProductModel};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cut_out")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    pub sku: String,
    /// Derived from model, cut type, fabric and color. Addresses the asset.
    #[sea_orm(unique)]
    pub key: String,
    /// Stacking order in previews; higher values are drawn on top.
    pub display_order: i32,

    pub cut_type: CutType,
    pub position: Position,
    pub product_model: ProductModel,
    pub fabric: Fabric,
    pub color: Color,
    pub status: CutOutStatus,

    pub image_url: String,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl Model {
    pub fn identity(&self) -> common::IdentityFields {
        common::IdentityFields {
            product_model: self.product_model,
            cut_type: self.cut_type,
            fabric: self.fabric,
            color: self.color,
        }
    }
}

impl ActiveModelBehavior for ActiveModel {}
