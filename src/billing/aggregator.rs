use crate::billing::{CostError, SizeAggregate, VolumeInventory, VolumeRecord, VolumeTier};
use tracing::debug;

/// Sum volume sizes per type, for the whole fleet and for unused volumes only
///
/// Single pass over `records`. Fails on the first volume whose type is not
/// one of the known EBS types rather than under-reporting the fleet.
pub fn aggregate(records: &[VolumeRecord]) -> Result<VolumeInventory, CostError> {
    let mut size_by_tier = SizeAggregate::zeroed(&VolumeTier::ALL);
    let mut unused_size_by_tier = SizeAggregate::zeroed(&VolumeTier::PRICED);
    let mut unused_ids = Vec::new();
    let mut unused_unpriced_by_tier = SizeAggregate::default();

    for record in records {
        let tier: VolumeTier = record.tier.parse()?;
        size_by_tier.add(tier, record.size_units);

        if record.is_unused() {
            unused_ids.push(record.id.clone());
            if tier.is_priced() {
                unused_size_by_tier.add(tier, record.size_units);
            } else {
                unused_unpriced_by_tier.add(tier, record.size_units);
            }
        }
    }

    debug!(
        volumes = records.len(),
        unused = unused_ids.len(),
        total_gib = size_by_tier.total(),
        "aggregated volume inventory"
    );

    Ok(VolumeInventory {
        size_by_tier,
        unused_ids,
        unused_size_by_tier,
        unused_unpriced_by_tier,
    })
}
