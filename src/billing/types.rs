use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// EBS volume type as reported by EC2
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeTier {
    Gp2,
    Gp3,
    Standard,
    Sc1,
    Io1,
    St1,
}

impl VolumeTier {
    /// Every volume type the aggregator accepts
    pub const ALL: [VolumeTier; 6] = [
        VolumeTier::Gp2,
        VolumeTier::Gp3,
        VolumeTier::Standard,
        VolumeTier::Sc1,
        VolumeTier::Io1,
        VolumeTier::St1,
    ];

    /// Volume types the pricing catalog knows a display name for
    pub const PRICED: [VolumeTier; 5] = [
        VolumeTier::Standard,
        VolumeTier::Gp2,
        VolumeTier::Io1,
        VolumeTier::St1,
        VolumeTier::Sc1,
    ];

    pub fn code(self) -> &'static str {
        match self {
            VolumeTier::Gp2 => "gp2",
            VolumeTier::Gp3 => "gp3",
            VolumeTier::Standard => "standard",
            VolumeTier::Sc1 => "sc1",
            VolumeTier::Io1 => "io1",
            VolumeTier::St1 => "st1",
        }
    }

    pub fn is_priced(self) -> bool {
        self.pricing_name().is_some()
    }
}

impl fmt::Display for VolumeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Raw volume as delivered by a volume source
///
/// `tier` is kept as the source's string so that unknown types surface
/// during aggregation instead of disappearing at decode time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeRecord {
    pub id: String,
    pub tier: String,
    pub size_units: u64,
    pub attachment_count: u32,
    /// Availability zone, when the source reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

impl VolumeRecord {
    pub fn new(id: impl Into<String>, tier: impl Into<String>, size_units: u64, attachment_count: u32) -> Self {
        Self {
            id: id.into(),
            tier: tier.into(),
            size_units,
            attachment_count,
            availability_zone: None,
        }
    }

    pub fn in_zone(mut self, availability_zone: impl Into<String>) -> Self {
        self.availability_zone = Some(availability_zone.into());
        self
    }

    /// A volume with no attachment is unused
    pub fn is_unused(&self) -> bool {
        self.attachment_count == 0
    }
}

/// Accumulated size (GiB) per volume type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SizeAggregate {
    sizes: BTreeMap<VolumeTier, u64>,
}

impl SizeAggregate {
    /// Aggregate with every given tier present at zero
    pub fn zeroed(tiers: &[VolumeTier]) -> Self {
        Self {
            sizes: tiers.iter().map(|tier| (*tier, 0)).collect(),
        }
    }

    pub fn add(&mut self, tier: VolumeTier, size_units: u64) {
        *self.sizes.entry(tier).or_insert(0) += size_units;
    }

    pub fn get(&self, tier: VolumeTier) -> Option<u64> {
        self.sizes.get(&tier).copied()
    }

    pub fn contains(&self, tier: VolumeTier) -> bool {
        self.sizes.contains_key(&tier)
    }

    pub fn total(&self) -> u64 {
        self.sizes.values().sum()
    }

    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VolumeTier, u64)> + '_ {
        self.sizes.iter().map(|(tier, size)| (*tier, *size))
    }
}

impl FromIterator<(VolumeTier, u64)> for SizeAggregate {
    fn from_iter<I: IntoIterator<Item = (VolumeTier, u64)>>(iter: I) -> Self {
        let mut aggregate = SizeAggregate::default();
        for (tier, size) in iter {
            aggregate.add(tier, size);
        }
        aggregate
    }
}

/// Unit price (USD per GiB-month) per priced volume type, for one region
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceCatalog {
    pub region: String,
    pub prices: BTreeMap<VolumeTier, f64>,
}

impl PriceCatalog {
    pub fn new(region: impl Into<String>, prices: BTreeMap<VolumeTier, f64>) -> Self {
        Self {
            region: region.into(),
            prices,
        }
    }

    pub fn get(&self, tier: VolumeTier) -> Option<f64> {
        self.prices.get(&tier).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (VolumeTier, f64)> + '_ {
        self.prices.iter().map(|(tier, price)| (*tier, *price))
    }
}

/// Rounded monthly cost per volume type plus their sum
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub by_tier: BTreeMap<VolumeTier, u64>,
    pub total: u64,
}

impl CostBreakdown {
    pub fn get(&self, tier: VolumeTier) -> Option<u64> {
        self.by_tier.get(&tier).copied()
    }
}

/// Output of a single aggregation pass over the inventory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeInventory {
    pub size_by_tier: SizeAggregate,
    pub unused_ids: Vec<String>,
    pub unused_size_by_tier: SizeAggregate,
    /// Unused capacity of volume types outside the pricing catalog
    pub unused_unpriced_by_tier: SizeAggregate,
}

/// Capacity that exists in the region but carries no price
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnpricedTier {
    pub tier: VolumeTier,
    pub size_units: u64,
    pub unused_size_units: u64,
}

/// Everything a renderer needs to present one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostReport {
    pub region: String,
    pub size_by_tier: SizeAggregate,
    pub unused_size_by_tier: SizeAggregate,
    pub unused_volume_ids: Vec<String>,
    pub prices: PriceCatalog,
    pub costs: CostBreakdown,
    pub unused_costs: CostBreakdown,
    pub unpriced: Vec<UnpricedTier>,
}

impl CostReport {
    pub fn has_unused_volumes(&self) -> bool {
        !self.unused_volume_ids.is_empty()
    }

    /// Unpriced tiers that actually hold capacity
    pub fn unpriced_with_capacity(&self) -> impl Iterator<Item = &UnpricedTier> {
        self.unpriced.iter().filter(|u| u.size_units > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zeroed_aggregate_has_every_tier() {
        let aggregate = SizeAggregate::zeroed(&VolumeTier::ALL);
        assert_eq!(aggregate.len(), 6);
        assert!(aggregate.iter().all(|(_, size)| size == 0));
    }

    #[test]
    fn test_aggregate_add_accumulates() {
        let mut aggregate = SizeAggregate::zeroed(&VolumeTier::PRICED);
        aggregate.add(VolumeTier::Gp2, 8);
        aggregate.add(VolumeTier::Gp2, 12);
        assert_eq!(aggregate.get(VolumeTier::Gp2), Some(20));
        assert_eq!(aggregate.get(VolumeTier::Gp3), None);
        assert_eq!(aggregate.total(), 20);
    }

    #[test]
    fn test_tier_serializes_as_code() {
        let json = serde_json::to_string(&VolumeTier::Standard).unwrap();
        assert_eq!(json, "\"standard\"");
        assert_eq!(VolumeTier::Io1.to_string(), "io1");
    }

    #[test]
    fn test_record_unused() {
        assert!(VolumeRecord::new("vol-1", "gp2", 8, 0).is_unused());
        assert!(!VolumeRecord::new("vol-2", "gp2", 8, 1).is_unused());
    }
}
