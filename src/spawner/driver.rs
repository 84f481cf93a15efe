use ampere_schema::LifecycleState;
use backon::{ExponentialBuilder, Retryable};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::request::LaunchRequest;
use crate::config::RetryConfig;
use crate::error::CloudError;
use crate::oci::CloudApi;

#[derive(Debug)]
pub enum AttemptOutcome {
    Launched { instance_id: String },
    Failed(CloudError),
}

/// Issues launch calls and, once one succeeds, finds the instance's public address.
pub struct LaunchDriver<'a, C: ?Sized> {
    cloud: &'a C,
    request: &'a LaunchRequest,
    settle_delay: Duration,
    resolve_policy: ExponentialBuilder,
}

impl<'a, C> LaunchDriver<'a, C>
where
    C: CloudApi + ?Sized,
{
    pub fn new(cloud: &'a C, request: &'a LaunchRequest, cfg: &RetryConfig) -> Self {
        let resolve_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_secs(5))
            .with_max_delay(Duration::from_secs(30))
            .with_max_times(cfg.address_resolution_attempts.saturating_sub(1));

        Self {
            cloud,
            request,
            settle_delay: Duration::from_secs(cfg.settle_delay_secs),
            resolve_policy,
        }
    }

    /// Exactly one provisioning call against `availability_domain`.
    pub async fn attempt(&self, availability_domain: &str) -> AttemptOutcome {
        let details = self.request.details_for(availability_domain);
        match self.cloud.launch_instance(&details).await {
            Ok(instance) => {
                info!(
                    instance_id = %instance.id,
                    availability_domain,
                    state = ?instance.lifecycle_state,
                    "Launch accepted"
                );
                AttemptOutcome::Launched {
                    instance_id: instance.id,
                }
            }
            Err(err) => AttemptOutcome::Failed(err),
        }
    }

    /// Waits for provisioning to settle, then resolves the public address.
    ///
    /// Lookups are retried a bounded number of times; a failure here never leads to another
    /// launch.
    pub async fn settle_and_resolve(&self, instance_id: &str) -> Result<String, CloudError> {
        debug!(
            instance_id,
            settle_secs = self.settle_delay.as_secs(),
            "Waiting for instance to settle"
        );
        tokio::time::sleep(self.settle_delay).await;

        (|| self.lookup_public_ip(instance_id))
            .retry(self.resolve_policy)
            .notify(|err: &CloudError, dur: Duration| {
                warn!(instance_id, error = %err, "Public IP lookup failed, retrying in {:?}", dur);
            })
            .await
    }

    /// VNIC attachment -> private IP -> public IP.
    async fn lookup_public_ip(&self, instance_id: &str) -> Result<String, CloudError> {
        let attachments = self
            .cloud
            .list_vnic_attachments(&self.request.compartment_id, instance_id)
            .await?;
        let vnic_id = attachments
            .into_iter()
            .filter(|a| {
                !matches!(
                    a.lifecycle_state,
                    LifecycleState::Detaching | LifecycleState::Detached
                )
            })
            .find_map(|a| a.vnic_id)
            .ok_or_else(|| {
                CloudError::UnexpectedResponse(format!("no VNIC attached to {instance_id}"))
            })?;

        let private_ips = self
            .cloud
            .list_private_ips(&self.request.subnet_id, &vnic_id)
            .await?;
        let private_ip = private_ips
            .iter()
            .find(|ip| ip.is_primary == Some(true))
            .or_else(|| private_ips.first())
            .ok_or_else(|| {
                CloudError::UnexpectedResponse(format!("no private IP on VNIC {vnic_id}"))
            })?;

        let public_ip = self
            .cloud
            .get_public_ip_by_private_ip_id(&private_ip.id)
            .await?;
        Ok(public_ip.ip_address)
    }
}
