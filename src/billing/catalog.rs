//! Code-to-name catalogs for volume types and regions.
//!
//! The AWS Price List service filters on verbose names ("General Purpose",
//! "EU (Ireland)") rather than the codes EC2 reports, so every lookup goes
//! through these tables first.

use super::{CostError, VolumeTier};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

impl VolumeTier {
    /// Name the pricing service uses for this volume type.
    ///
    /// `None` for gp3, which has no entry in the pricing catalog.
    pub fn pricing_name(self) -> Option<&'static str> {
        match self {
            VolumeTier::Standard => Some("Magnetic"),
            VolumeTier::Gp2 => Some("General Purpose"),
            VolumeTier::Io1 => Some("Provisioned IOPS"),
            VolumeTier::St1 => Some("Throughput Optimized HDD"),
            VolumeTier::Sc1 => Some("Cold HDD"),
            VolumeTier::Gp3 => None,
        }
    }
}

impl FromStr for VolumeTier {
    type Err = CostError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        VolumeTier::ALL
            .into_iter()
            .find(|tier| tier.code() == code)
            .ok_or_else(|| CostError::UnknownTier(code.to_string()))
    }
}

/// Resolve a volume type code to its pricing-service name
pub fn tier_display_name(code: &str) -> Result<&'static str, CostError> {
    code.parse::<VolumeTier>()?
        .pricing_name()
        .ok_or_else(|| CostError::UnknownTier(code.to_string()))
}

/// AWS regions with a known pricing location name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "ca-central-1")]
    CaCentral1,
    #[serde(rename = "ap-northeast-3")]
    ApNortheast3,
    #[serde(rename = "us-east-1")]
    UsEast1,
    #[serde(rename = "ap-northeast-2")]
    ApNortheast2,
    #[serde(rename = "us-gov-west-1")]
    UsGovWest1,
    #[serde(rename = "us-east-2")]
    UsEast2,
    #[serde(rename = "ap-northeast-1")]
    ApNortheast1,
    #[serde(rename = "ap-south-1")]
    ApSouth1,
    #[serde(rename = "ap-southeast-2")]
    ApSoutheast2,
    #[serde(rename = "ap-southeast-1")]
    ApSoutheast1,
    #[serde(rename = "sa-east-1")]
    SaEast1,
    #[serde(rename = "us-west-2")]
    UsWest2,
    #[serde(rename = "eu-west-1")]
    EuWest1,
    #[serde(rename = "eu-west-3")]
    EuWest3,
    #[serde(rename = "eu-west-2")]
    EuWest2,
    #[serde(rename = "us-west-1")]
    UsWest1,
    #[serde(rename = "eu-central-1")]
    EuCentral1,
}

static REGIONS_BY_CODE: Lazy<HashMap<&'static str, Region>> =
    Lazy::new(|| Region::ALL.into_iter().map(|r| (r.code(), r)).collect());

impl Region {
    pub const ALL: [Region; 17] = [
        Region::CaCentral1,
        Region::ApNortheast3,
        Region::UsEast1,
        Region::ApNortheast2,
        Region::UsGovWest1,
        Region::UsEast2,
        Region::ApNortheast1,
        Region::ApSouth1,
        Region::ApSoutheast2,
        Region::ApSoutheast1,
        Region::SaEast1,
        Region::UsWest2,
        Region::EuWest1,
        Region::EuWest3,
        Region::EuWest2,
        Region::UsWest1,
        Region::EuCentral1,
    ];

    pub fn code(self) -> &'static str {
        match self {
            Region::CaCentral1 => "ca-central-1",
            Region::ApNortheast3 => "ap-northeast-3",
            Region::UsEast1 => "us-east-1",
            Region::ApNortheast2 => "ap-northeast-2",
            Region::UsGovWest1 => "us-gov-west-1",
            Region::UsEast2 => "us-east-2",
            Region::ApNortheast1 => "ap-northeast-1",
            Region::ApSouth1 => "ap-south-1",
            Region::ApSoutheast2 => "ap-southeast-2",
            Region::ApSoutheast1 => "ap-southeast-1",
            Region::SaEast1 => "sa-east-1",
            Region::UsWest2 => "us-west-2",
            Region::EuWest1 => "eu-west-1",
            Region::EuWest3 => "eu-west-3",
            Region::EuWest2 => "eu-west-2",
            Region::UsWest1 => "us-west-1",
            Region::EuCentral1 => "eu-central-1",
        }
    }

    /// Location name used by the pricing service
    pub fn display_name(self) -> &'static str {
        match self {
            Region::CaCentral1 => "Canada (Central)",
            Region::ApNortheast3 => "Asia Pacific (Osaka-Local)",
            Region::UsEast1 => "US East (N. Virginia)",
            Region::ApNortheast2 => "Asia Pacific (Seoul)",
            Region::UsGovWest1 => "AWS GovCloud (US)",
            Region::UsEast2 => "US East (Ohio)",
            Region::ApNortheast1 => "Asia Pacific (Tokyo)",
            Region::ApSouth1 => "Asia Pacific (Mumbai)",
            Region::ApSoutheast2 => "Asia Pacific (Sydney)",
            Region::ApSoutheast1 => "Asia Pacific (Singapore)",
            Region::SaEast1 => "South America (Sao Paulo)",
            Region::UsWest2 => "US West (Oregon)",
            Region::EuWest1 => "EU (Ireland)",
            Region::EuWest3 => "EU (Paris)",
            Region::EuWest2 => "EU (London)",
            Region::UsWest1 => "US West (N. California)",
            Region::EuCentral1 => "EU (Frankfurt)",
        }
    }

    /// Whether an availability zone (`us-east-1a`, `us-west-2-lax-1a`) lies in this region
    pub fn contains_zone(self, availability_zone: &str) -> bool {
        availability_zone
            .strip_prefix(self.code())
            .and_then(|suffix| suffix.chars().next())
            .is_some_and(|c| c.is_ascii_lowercase() || c == '-')
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Region {
    type Err = CostError;

    fn from_str(code: &str) -> Result<Self, Self::Err> {
        REGIONS_BY_CODE
            .get(code)
            .copied()
            .ok_or_else(|| CostError::UnknownRegion(code.to_string()))
    }
}

/// Resolve a region code to its pricing-service location name
pub fn region_display_name(code: &str) -> Result<&'static str, CostError> {
    Ok(code.parse::<Region>()?.display_name())
}
