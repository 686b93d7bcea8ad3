//! Updating a cut-out whose identity change also moves its image on the
//! asset host.
//!
//! The rename and the database write are independent remote calls. When the
//! write fails after a successful rename, the rename is reversed; if that
//! reversal fails too the workflow stops with
//! [`UpdateError::InconsistentState`] and leaves reconciliation to an
//! operator.

use chrono::Utc;
use common::storage::{AssetError, AssetHost, RenameOptions};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::entity::cut_out;
use crate::models::cut_out::UpdateCutOutRequest;

use super::cut_out_store::{CutOutStore, CutOutWrite, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error("cut-out id is required")]
    InvalidRequest,
    #[error("cut-out {0} not found")]
    NotFound(Uuid),
    #[error("asset '{key}' not found on the asset host")]
    AssetMissing { key: String },
    #[error("an asset already exists under '{key}'")]
    KeyConflict { key: String },
    #[error("asset rename failed: {0}")]
    AssetRenameFailed(String),
    #[error("unique constraint violated: {0}")]
    DuplicateKey(String),
    #[error("record update failed: {0}")]
    UpdateFailed(String),
    #[error(
        "cut-out {id} references '{record_key}' but its image now lives under '{asset_key}'; \
         manual reconciliation is required (write error: {cause}; rollback error: {rollback})"
    )]
    InconsistentState {
        id: Uuid,
        asset_key: String,
        record_key: String,
        cause: String,
        rollback: String,
    },
}

/// One invocation of the update workflow.
pub struct CutOutUpdate<'a> {
    store: &'a dyn CutOutStore,
    assets: &'a dyn AssetHost,
}

impl<'a> CutOutUpdate<'a> {
    pub fn new(store: &'a dyn CutOutStore, assets: &'a dyn AssetHost) -> Self {
        Self { store, assets }
    }

    /// Apply `changes` to the cut-out `id`.
    ///
    /// Issues at most one rename, one compensating rename and one database
    /// write. Nothing is retried.
    #[instrument(skip(self, changes))]
    pub async fn run(
        &self,
        id: Option<Uuid>,
        changes: UpdateCutOutRequest,
    ) -> Result<cut_out::Model, UpdateError> {
        let id = id.ok_or(UpdateError::InvalidRequest)?;

        let current = self
            .store
            .find_by_id(id)
            .await
            .map_err(|e| UpdateError::UpdateFailed(e.to_string()))?
            .ok_or(UpdateError::NotFound(id))?;

        let current_identity = current.identity();
        let merged = current_identity.merged(
            changes.product_model,
            changes.cut_type,
            changes.fabric,
            changes.color,
        );
        let changed = current_identity.changed_fields(&merged);

        let mut key = current.key.clone();
        let mut image_url = current.image_url.clone();
        let mut renamed = false;

        if !changed.is_empty() {
            let new_key = merged.key();
            if new_key != current.key {
                info!(from = %current.key, to = %new_key, ?changed, "Renaming cut-out asset");
                let stored = self
                    .assets
                    .rename(&current.key, &new_key, RenameOptions { overwrite: false })
                    .await
                    .map_err(|e| classify_rename_error(e, &current.key, &new_key))?;
                key = new_key;
                image_url = stored.url;
                renamed = true;
            }
        }

        let write = CutOutWrite {
            changes,
            key: key.clone(),
            image_url,
            updated_at: Utc::now(),
        };

        match self.store.update(id, write).await {
            Ok(updated) => Ok(updated),
            Err(cause) if renamed => Err(self.roll_back(&current, &key, cause).await),
            Err(StoreError::UniqueViolation(detail)) => Err(UpdateError::DuplicateKey(detail)),
            Err(cause) => Err(UpdateError::UpdateFailed(cause.to_string())),
        }
    }

    /// Move the asset back to the key the record still references.
    async fn roll_back(
        &self,
        current: &cut_out::Model,
        renamed_to: &str,
        cause: StoreError,
    ) -> UpdateError {
        warn!(
            from = %renamed_to,
            to = %current.key,
            error = %cause,
            "Record write failed after asset rename, restoring asset key"
        );

        match self
            .assets
            .rename(renamed_to, &current.key, RenameOptions { overwrite: true })
            .await
        {
            Ok(_) => match cause {
                StoreError::UniqueViolation(detail) => UpdateError::DuplicateKey(detail),
                other => UpdateError::UpdateFailed(other.to_string()),
            },
            Err(rollback) => {
                let err = UpdateError::InconsistentState {
                    id: current.id,
                    asset_key: renamed_to.to_string(),
                    record_key: current.key.clone(),
                    cause: cause.to_string(),
                    rollback: rollback.to_string(),
                };
                error!("{err}");
                err
            }
        }
    }
}

fn classify_rename_error(err: AssetError, from: &str, to: &str) -> UpdateError {
    match err.status_code() {
        Some(404) => UpdateError::AssetMissing {
            key: from.to_string(),
        },
        Some(409) => UpdateError::KeyConflict { key: to.to_string() },
        _ => UpdateError::AssetRenameFailed(err.to_string()),
    }
}
