use super::types::{AwsConfig, Config, PricingConfig, ReportConfig};

/// The Price List API is only served from a couple of regions
pub const DEFAULT_PRICING_ENDPOINT: &str = "https://api.pricing.us-east-1.amazonaws.com";
pub const DEFAULT_SIGNING_REGION: &str = "us-east-1";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_PROFILE: &str = "default";

impl Default for Config {
    fn default() -> Self {
        Config {
            aws: AwsConfig::default(),
            pricing: PricingConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl Default for AwsConfig {
    fn default() -> Self {
        AwsConfig {
            profile: std::env::var("AWS_PROFILE").unwrap_or_else(|_| DEFAULT_PROFILE.to_string()),
            ec2_endpoint: None,
        }
    }
}

impl Default for PricingConfig {
    fn default() -> Self {
        PricingConfig {
            endpoint: DEFAULT_PRICING_ENDPOINT.to_string(),
            signing_region: DEFAULT_SIGNING_REGION.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        ReportConfig {
            color: std::env::var("NO_COLOR").is_err(),
        }
    }
}
