use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Unchanged, ConnectionTrait, DbErr, EntityTrait, Set, SqlErr,
};
use uuid::Uuid;

use crate::entity::cut_out;
use crate::models::cut_out::UpdateCutOutRequest;

/// Everything persisted by one update: the caller's fields plus the
/// resolved key, image URL and timestamp.
#[derive(Debug, Clone)]
pub struct CutOutWrite {
    pub changes: UpdateCutOutRequest,
    pub key: String,
    pub image_url: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("cut-out {0} not found")]
    NotFound(Uuid),
    #[error("unique constraint violated: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<DbErr> for StoreError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(detail)) => StoreError::UniqueViolation(detail),
            _ => StoreError::Database(err.to_string()),
        }
    }
}

/// Persistence used by the update workflow.
#[async_trait]
pub trait CutOutStore: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<cut_out::Model>, StoreError>;

    /// Apply `write` to the record. Fails with [`StoreError::NotFound`] when
    /// the row no longer exists.
    async fn update(&self, id: Uuid, write: CutOutWrite) -> Result<cut_out::Model, StoreError>;
}

pub struct SeaOrmCutOutStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> SeaOrmCutOutStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl<C: ConnectionTrait + Sync> CutOutStore for SeaOrmCutOutStore<'_, C> {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<cut_out::Model>, StoreError> {
        Ok(cut_out::Entity::find_by_id(id).one(self.conn).await?)
    }

    async fn update(&self, id: Uuid, write: CutOutWrite) -> Result<cut_out::Model, StoreError> {
        let CutOutWrite {
            changes,
            key,
            image_url,
            updated_at,
        } = write;

        let mut active = cut_out::ActiveModel {
            id: Unchanged(id),
            key: Set(key),
            image_url: Set(image_url),
            updated_at: Set(updated_at),
            ..Default::default()
        };
        if let Some(sku) = changes.sku {
            active.sku = Set(sku.trim().to_string());
        }
        if let Some(display_order) = changes.display_order {
            active.display_order = Set(display_order);
        }
        if let Some(cut_type) = changes.cut_type {
            active.cut_type = Set(cut_type);
        }
        if let Some(position) = changes.position {
            active.position = Set(position);
        }
        if let Some(product_model) = changes.product_model {
            active.product_model = Set(product_model);
        }
        if let Some(fabric) = changes.fabric {
            active.fabric = Set(fabric);
        }
        if let Some(color) = changes.color {
            active.color = Set(color);
        }
        if let Some(status) = changes.status {
            active.status = Set(status);
        }

        active.update(self.conn).await.map_err(|e| match e {
            DbErr::RecordNotUpdated => StoreError::NotFound(id),
            other => StoreError::from(other),
        })
    }
}
