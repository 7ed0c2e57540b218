use std::time::Duration;
use tracing::info;

use crate::billing::{
    aggregator::aggregate, calculator::calculate_costs, pricing::resolve_prices, CostError,
    CostReport, PricingLookup, Region, UnpricedTier, VolumeRecord, VolumeTier,
};

/// Every volume that reports a zone must sit in `region`
fn check_zones(region: Region, records: &[VolumeRecord]) -> Result<(), CostError> {
    for record in records {
        if let Some(zone) = &record.availability_zone {
            if !region.contains_zone(zone) {
                return Err(CostError::RegionMismatch {
                    volume_id: record.id.clone(),
                    availability_zone: zone.clone(),
                    region: region.code().to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Run the whole pipeline for one region
///
/// Order matters: the region is validated first, then the inventory is
/// checked against it and aggregated, and only then are prices requested. Any error ends the run
/// without a partial report.
pub async fn build_report(
    region: &str,
    records: &[VolumeRecord],
    lookup: &dyn PricingLookup,
    timeout: Duration,
) -> Result<CostReport, CostError> {
    check_zones(region.parse::<Region>()?, records)?;

    let inventory = aggregate(records)?;
    let prices = resolve_prices(region, lookup, timeout).await?;

    let costs = calculate_costs(&inventory.size_by_tier, &prices)?;
    let unused_costs = calculate_costs(&inventory.unused_size_by_tier, &prices)?;

    let unpriced = VolumeTier::ALL
        .into_iter()
        .filter(|tier| !tier.is_priced())
        .map(|tier| UnpricedTier {
            tier,
            size_units: inventory.size_by_tier.get(tier).unwrap_or(0),
            unused_size_units: inventory.unused_unpriced_by_tier.get(tier).unwrap_or(0),
        })
        .collect();

    info!(
        region,
        total = costs.total,
        unused_total = unused_costs.total,
        unused_volumes = inventory.unused_ids.len(),
        "cost report ready"
    );

    Ok(CostReport {
        region: region.to_string(),
        size_by_tier: inventory.size_by_tier,
        unused_size_by_tier: inventory.unused_size_by_tier,
        unused_volume_ids: inventory.unused_ids,
        prices,
        costs,
        unused_costs,
        unpriced,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::pricing::tests::FixedLookup;
    use std::sync::atomic::Ordering;

    fn records() -> Vec<VolumeRecord> {
        vec![
            VolumeRecord::new("vol-1", "gp2", 100, 1),
            VolumeRecord::new("vol-2", "io1", 50, 1),
            VolumeRecord::new("vol-3", "st1", 20, 0),
            VolumeRecord::new("vol-4", "sc1", 10, 1),
            VolumeRecord::new("vol-5", "gp3", 40, 0),
        ]
    }

    #[tokio::test]
    async fn test_build_report() {
        let lookup = FixedLookup::standard();
        let report = build_report("us-east-1", &records(), &lookup, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(report.costs.total, 17);
        assert_eq!(report.unused_costs.get(VolumeTier::St1), Some(1));
        assert_eq!(report.unused_costs.total, 1);
        assert_eq!(report.unused_volume_ids, vec!["vol-3", "vol-5"]);
        assert!(report.has_unused_volumes());

        let gp3 = report.unpriced_with_capacity().next().unwrap();
        assert_eq!(gp3.tier, VolumeTier::Gp3);
        assert_eq!(gp3.size_units, 40);
        assert_eq!(gp3.unused_size_units, 40);
        // gp3 capacity stays out of the totals
        assert_eq!(report.costs.get(VolumeTier::Gp3), None);
    }

    #[tokio::test]
    async fn test_empty_inventory() {
        let lookup = FixedLookup::standard();
        let report = build_report("eu-central-1", &[], &lookup, Duration::from_secs(5))
            .await
            .unwrap();

        assert_eq!(report.size_by_tier.len(), 6);
        assert_eq!(report.size_by_tier.total(), 0);
        assert!(report.unused_volume_ids.is_empty());
        assert_eq!(report.costs.total, 0);
        assert_eq!(report.unused_costs.total, 0);
        assert_eq!(report.unpriced_with_capacity().count(), 0);
    }

    #[tokio::test]
    async fn test_unknown_region_skips_pricing() {
        let lookup = FixedLookup::standard();
        let result = build_report("xx-fake-1", &records(), &lookup, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(CostError::UnknownRegion(_))));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_volumes_from_another_region_are_rejected() {
        let lookup = FixedLookup::standard();
        let records = vec![
            VolumeRecord::new("vol-1", "gp2", 100, 1).in_zone("us-east-1a"),
            VolumeRecord::new("vol-2", "gp2", 100, 1).in_zone("eu-west-1a"),
        ];
        let result = build_report("us-east-1", &records, &lookup, Duration::from_secs(5)).await;

        assert!(matches!(
            result,
            Err(CostError::RegionMismatch { ref volume_id, ref availability_zone, .. })
                if volume_id == "vol-2" && availability_zone == "eu-west-1a"
        ));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_volumes_in_region_zones_are_priced() {
        let lookup = FixedLookup::standard();
        let records = vec![VolumeRecord::new("vol-1", "gp2", 100, 1).in_zone("us-east-1b")];
        let report = build_report("us-east-1", &records, &lookup, Duration::from_secs(5))
            .await
            .unwrap();
        assert_eq!(report.costs.total, 10);
    }

    #[tokio::test]
    async fn test_unknown_tier_skips_pricing() {
        let lookup = FixedLookup::standard();
        let records = vec![VolumeRecord::new("vol-x", "nvme-super", 10, 0)];
        let result = build_report("us-east-1", &records, &lookup, Duration::from_secs(5)).await;

        assert!(matches!(result, Err(CostError::UnknownTier(_))));
        assert_eq!(lookup.calls.load(Ordering::SeqCst), 0);
    }
}
