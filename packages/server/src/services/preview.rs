use std::collections::HashMap;

use uuid::Uuid;

use crate::entity::cut_out;
use crate::models::cut_out::PreviewLayer;

/// Arrange the requested cut-outs back to front.
///
/// Layers are sorted by display order; equal orders keep the order in which
/// they were requested. Returns the first requested id that has no record.
pub fn stack_layers(
    requested: &[Uuid],
    records: Vec<cut_out::Model>,
) -> Result<Vec<PreviewLayer>, Uuid> {
    let mut by_id: HashMap<Uuid, cut_out::Model> =
        records.into_iter().map(|r| (r.id, r)).collect();

    let mut layers = requested
        .iter()
        .map(|id| by_id.remove(id).ok_or(*id))
        .map(|record| {
            record.map(|r| PreviewLayer {
                id: r.id,
                key: r.key,
                image_url: r.image_url,
                z_index: r.display_order,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    // stable: ties stay in request order
    layers.sort_by_key(|layer| layer.z_index);
    Ok(layers)
}
