use serde::{Deserialize, Serialize};
use std::time::Duration;

// Main config structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub aws: AwsConfig,
    pub pricing: PricingConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AwsConfig {
    /// Profile of the shared credentials file used when no keys are given
    pub profile: String,
    /// EC2 endpoint override; defaults to the public endpoint of the report region
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ec2_endpoint: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricingConfig {
    /// Price List service endpoint
    pub endpoint: String,
    /// Region the Price List requests are signed for
    pub signing_region: String,
    /// Upper bound for each per-type price lookup and each EC2 page request
    pub timeout_secs: u64,
}

impl PricingConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub color: bool,
}
