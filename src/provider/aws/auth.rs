//! # AWS Authentication
//!
//! Builds the AWS SDK configuration from the default credential chain, which
//! covers IRSA (IAM Roles for Service Accounts), pod identity and static keys.

use crate::controller::reconciler::AwsIdentity;
use aws_config::SdkConfig;
use tracing::{info, warn};

/// Load the SDK configuration, optionally pinning the region
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut builder = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some(region) = region {
        builder = builder.region(aws_config::Region::new(region.to_string()));
    }
    let config = builder.load().await;
    info!(
        region = config.region().map_or("unset", |r| r.as_ref()),
        "AWS SDK configuration loaded"
    );
    config
}

/// Resolve the region and owning account of the controller's credentials
///
/// A failed lookup leaves the account unset; status metadata then simply lacks it.
pub async fn resolve_identity(sdk_config: &SdkConfig) -> AwsIdentity {
    let region = sdk_config.region().map(ToString::to_string);
    let account_id = match aws_sdk_sts::Client::new(sdk_config)
        .get_caller_identity()
        .send()
        .await
    {
        Ok(output) => output.account().map(str::to_string),
        Err(e) => {
            warn!(
                error = %aws_sdk_sts::error::DisplayErrorContext(&e),
                "Failed to resolve AWS account ID via GetCallerIdentity"
            );
            None
        }
    };
    info!(
        region = region.as_deref().unwrap_or("unset"),
        account_id = account_id.as_deref().unwrap_or("unknown"),
        "Resolved AWS identity"
    );
    AwsIdentity { region, account_id }
}
