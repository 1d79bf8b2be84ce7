// # AWS Backends
//
// This crate implements the r53sync-core backend traits on top of the AWS SDK:
//
// - `Ec2Inventory`: `InstanceInventory` over EC2 `DescribeInstances`
// - `Route53Provider`: `DnsProvider` over Route 53 `ChangeResourceRecordSets`
// - `S3ObjectStore`: `ObjectStore` over S3 `GetObject`/`PutObject`
//
// ## Constraints
//
// - One SDK request per trait call (EC2 pagination aside); no retries beyond
//   the SDK's own retry policy
// - SDK failures are surfaced as `Error::Provider` carrying the service
//   message verbatim
// - Region is chosen per call by the engine, never by mutating shared config
//
// Credentials and the default region come from the standard AWS provider
// chain as resolved by `aws-config`.

mod ec2;
mod route53;
mod s3;

pub use ec2::Ec2Inventory;
pub use route53::Route53Provider;
pub use s3::S3ObjectStore;

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Resolve shared SDK configuration from the environment
///
/// `region` overrides the region from the provider chain.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}
