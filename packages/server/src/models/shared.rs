use std::collections::HashSet;
use std::hash::Hash;
use std::fmt::Display;

use crate::error::AppError;

/// Validate a trimmed SKU (1-64 characters).
pub fn validate_sku(sku: &str) -> Result<(), AppError> {
    let sku = sku.trim();
    if sku.is_empty() || sku.chars().count() > 64 {
        return Err(AppError::Validation("SKU must be 1-64 characters".into()));
    }
    Ok(())
}

/// Validate an optional display order (must be >= 0 when present).
pub fn validate_optional_display_order(order: Option<i32>) -> Result<(), AppError> {
    if let Some(order) = order
        && order < 0
    {
        return Err(AppError::Validation("Display order must be >= 0".into()));
    }
    Ok(())
}

/// Validate an ID list for bulk operations (non-empty, no duplicates, max length).
pub fn validate_bulk_ids<T>(ids: &[T], name: &str, max: usize) -> Result<(), AppError>
where
    T: Eq + Hash + Display,
{
    if ids.is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }
    if ids.len() > max {
        return Err(AppError::Validation(format!("Too many {name}: max {max}")));
    }
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(AppError::Validation(format!("Duplicate {name} entry: {id}")));
        }
    }
    Ok(())
}
