use async_trait::async_trait;
use futures::future::join_all;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::{debug, warn};

use super::catalog::region_display_name;
use super::{CostError, LookupError, PriceCatalog, VolumeTier};

/// Unit billed for EBS storage capacity
pub const STORAGE_UNIT: &str = "GB-Mo";

/// Currency prices are read in
pub const PRICE_CURRENCY: &str = "USD";

/// One product entry of an AWS Price List response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceQuote {
    #[serde(default)]
    pub product: Option<QuoteProduct>,
    #[serde(default)]
    pub terms: QuoteTerms,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteProduct {
    #[serde(rename = "productFamily", default)]
    pub product_family: Option<String>,
    #[serde(default)]
    pub attributes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteTerms {
    #[serde(rename = "OnDemand", default)]
    pub on_demand: BTreeMap<String, QuoteTerm>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteTerm {
    #[serde(rename = "priceDimensions", default)]
    pub price_dimensions: BTreeMap<String, PriceDimension>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PriceDimension {
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(rename = "pricePerUnit", default)]
    pub price_per_unit: HashMap<String, String>,
}

impl PriceQuote {
    /// Decode one `PriceList` element (the service sends each as a JSON string)
    pub fn from_json(raw: &str) -> Result<Self, LookupError> {
        Ok(serde_json::from_str(raw)?)
    }

    fn volume_api_name(&self) -> Option<&str> {
        self.product
            .as_ref()
            .and_then(|p| p.attributes.get("volumeApiName"))
            .map(String::as_str)
    }
}

/// What the resolver asks a pricing collaborator for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceQuery {
    pub tier: VolumeTier,
    pub tier_name: &'static str,
    pub region_name: &'static str,
}

/// Source of price quotes for one volume type in one location
#[async_trait]
pub trait PricingLookup: Send + Sync {
    async fn lookup(&self, query: &PriceQuery) -> Result<Vec<PriceQuote>, LookupError>;
}

/// Pick the unit price out of the quotes returned for `query`
///
/// Only on-demand terms are read, and within them only dimensions billed per
/// GB-month (or carrying no unit). Quotes for another `volumeApiName` are
/// skipped. Exactly one distinct price must remain.
pub fn select_unit_price(query: &PriceQuery, quotes: &[PriceQuote]) -> Result<f64, CostError> {
    let mut candidates: Vec<f64> = Vec::new();

    for quote in quotes {
        if let Some(api_name) = quote.volume_api_name() {
            if api_name != query.tier.code() {
                continue;
            }
        }

        for term in quote.terms.on_demand.values() {
            for dimension in term.price_dimensions.values() {
                if dimension.unit.as_deref().is_some_and(|unit| unit != STORAGE_UNIT) {
                    continue;
                }
                let Some(raw) = dimension.price_per_unit.get(PRICE_CURRENCY) else {
                    continue;
                };
                let price = parse_price(query.tier, raw)?;
                if !candidates.contains(&price) {
                    candidates.push(price);
                }
            }
        }
    }

    match candidates.as_slice() {
        [] => Err(CostError::PriceNotFound {
            tier: query.tier,
            region: query.region_name.to_string(),
        }),
        [price] => Ok(*price),
        _ => Err(CostError::AmbiguousPrice {
            tier: query.tier,
            region: query.region_name.to_string(),
            candidates,
        }),
    }
}

fn parse_price(tier: VolumeTier, raw: &str) -> Result<f64, CostError> {
    let price: f64 = raw.trim().parse().map_err(|_| CostError::MalformedQuote {
        tier,
        reason: format!("price '{}' is not a number", raw),
    })?;

    if !price.is_finite() || price < 0.0 {
        return Err(CostError::MalformedQuote {
            tier,
            reason: format!("price '{}' is not a non-negative amount", raw),
        });
    }

    Ok(price)
}

async fn resolve_tier(
    lookup: &dyn PricingLookup,
    query: PriceQuery,
    timeout: Duration,
) -> Result<(VolumeTier, f64), CostError> {
    let quotes = match tokio::time::timeout(timeout, lookup.lookup(&query)).await {
        Ok(result) => result.map_err(|source| CostError::Lookup {
            tier: query.tier,
            source,
        })?,
        Err(_) => {
            warn!(tier = %query.tier, ?timeout, "pricing lookup timed out");
            return Err(CostError::PriceNotFound {
                tier: query.tier,
                region: query.region_name.to_string(),
            });
        }
    };

    let price = select_unit_price(&query, &quotes)?;
    debug!(tier = %query.tier, quotes = quotes.len(), price, "resolved unit price");
    Ok((query.tier, price))
}

/// Resolve the unit price of every priced volume type in `region`
///
/// The region is checked before any lookup is issued. Lookups for the
/// different types run concurrently; the catalog is keyed by type, and when
/// several fail the first failing type in catalog order is reported.
pub async fn resolve_prices(
    region: &str,
    lookup: &dyn PricingLookup,
    timeout: Duration,
) -> Result<PriceCatalog, CostError> {
    let region_name = region_display_name(region)?;

    let mut queries = Vec::with_capacity(VolumeTier::PRICED.len());
    for tier in VolumeTier::PRICED {
        let tier_name = tier
            .pricing_name()
            .ok_or_else(|| CostError::UnknownTier(tier.code().to_string()))?;
        queries.push(PriceQuery {
            tier,
            tier_name,
            region_name,
        });
    }

    let results = join_all(
        queries
            .into_iter()
            .map(|query| resolve_tier(lookup, query, timeout)),
    )
    .await;

    let mut prices = BTreeMap::new();
    for result in results {
        let (tier, price) = result?;
        prices.insert(tier, price);
    }

    Ok(PriceCatalog::new(region, prices))
}
