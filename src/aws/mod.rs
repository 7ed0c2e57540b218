pub mod credentials;
pub mod ec2_client;
pub mod pricing_client;
pub mod sigv4;
pub mod volumes;

pub use credentials::{CredentialSource, Credentials};
pub use ec2_client::Ec2VolumeClient;
pub use pricing_client::PricingClient;
pub use volumes::{DescribeVolumesFile, InventoryInput, VolumeSource};
