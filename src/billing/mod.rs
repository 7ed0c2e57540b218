pub mod aggregator;
pub mod calculator;
pub mod catalog;
pub mod error;
pub mod pricing;
pub mod report;
pub mod types;

pub use aggregator::aggregate;
pub use calculator::calculate_costs;
pub use catalog::{region_display_name, tier_display_name, Region};
pub use error::{CostError, LookupError};
pub use pricing::{resolve_prices, PriceQuery, PriceQuote, PricingLookup};
pub use report::build_report;
pub use types::{
    CostBreakdown, CostReport, PriceCatalog, SizeAggregate, UnpricedTier, VolumeInventory,
    VolumeRecord, VolumeTier,
};
