use crate::billing::{CostBreakdown, CostError, PriceCatalog, SizeAggregate};
use std::collections::BTreeMap;

/// Monthly cost of `size_units` GiB at `unit_price`, rounded to whole dollars
///
/// Halves round up (`f64::round` rounds away from zero and both factors are
/// non-negative).
pub fn round_cost(size_units: u64, unit_price: f64) -> u64 {
    (size_units as f64 * unit_price).round() as u64
}

/// Price every type of `prices` against the sizes in `sizes`
pub fn calculate_costs(
    sizes: &SizeAggregate,
    prices: &PriceCatalog,
) -> Result<CostBreakdown, CostError> {
    let mut by_tier = BTreeMap::new();

    for (tier, unit_price) in prices.iter() {
        let size = sizes.get(tier).ok_or(CostError::MissingSize(tier))?;
        by_tier.insert(tier, round_cost(size, unit_price));
    }

    let total = by_tier.values().sum();
    Ok(CostBreakdown { by_tier, total })
}
