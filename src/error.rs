use thiserror::Error;

use crate::billing::{CostError, LookupError};

/// Top-level error of the `ebscost` binary
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Cost(#[from] CostError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Credentials error: {0}")]
    Credentials(String),

    #[error("Volume inventory error: {0}")]
    Inventory(String),

    #[error("Pricing client error: {0}")]
    PricingClient(#[from] LookupError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl AppError {
    /// Process exit status for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Cost(
                CostError::UnknownRegion(_)
                | CostError::UnknownTier(_)
                | CostError::RegionMismatch { .. },
            ) => 2,
            AppError::Config(_)
            | AppError::Credentials(_)
            | AppError::TomlDe(_)
            | AppError::TomlSer(_) => 3,
            AppError::Cost(_) | AppError::PricingClient(_) => 4,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::billing::VolumeTier;

    #[test]
    fn test_exit_codes() {
        assert_eq!(
            AppError::from(CostError::UnknownRegion("xx-fake-1".to_string())).exit_code(),
            2
        );
        assert_eq!(
            AppError::from(CostError::RegionMismatch {
                volume_id: "vol-1".to_string(),
                availability_zone: "eu-west-1a".to_string(),
                region: "us-east-1".to_string(),
            })
            .exit_code(),
            2
        );
        assert_eq!(AppError::Credentials("missing".to_string()).exit_code(), 3);
        assert_eq!(
            AppError::from(CostError::PriceNotFound {
                tier: VolumeTier::Gp2,
                region: "EU (Ireland)".to_string(),
            })
            .exit_code(),
            4
        );
        assert_eq!(AppError::Inventory("bad".to_string()).exit_code(), 1);
    }

    #[test]
    fn test_cost_errors_display_unchanged() {
        let err = AppError::from(CostError::UnknownRegion("xx-fake-1".to_string()));
        assert_eq!(err.to_string(), "Region 'xx-fake-1' does not exist");
    }
}
