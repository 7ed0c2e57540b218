use super::VolumeTier;
use thiserror::Error;

/// Failures of the aggregation and pricing pipeline
///
/// All of them abort the run: a cost report built on a dropped volume or a
/// guessed price would be wrong without saying so.
#[derive(Debug, Error)]
pub enum CostError {
    #[error("Region '{0}' does not exist")]
    UnknownRegion(String),

    #[error("Unknown EBS volume type '{0}'")]
    UnknownTier(String),

    #[error("Volume {volume_id} is in {availability_zone}, outside region {region}")]
    RegionMismatch {
        volume_id: String,
        availability_zone: String,
        region: String,
    },

    #[error("No price found for {tier} volumes in {region}")]
    PriceNotFound { tier: VolumeTier, region: String },

    #[error("Ambiguous price for {tier} volumes in {region}: candidates {candidates:?}")]
    AmbiguousPrice {
        tier: VolumeTier,
        region: String,
        candidates: Vec<f64>,
    },

    #[error("Malformed price quote for {tier} volumes: {reason}")]
    MalformedQuote { tier: VolumeTier, reason: String },

    #[error("Size aggregate has no entry for priced volume type {0}")]
    MissingSize(VolumeTier),

    #[error("Pricing lookup for {tier} volumes failed: {source}")]
    Lookup {
        tier: VolumeTier,
        #[source]
        source: LookupError,
    },
}

/// Failures of a pricing collaborator
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("pricing service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid price list entry: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("could not sign request: {0}")]
    Signing(String),
}
