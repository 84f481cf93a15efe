mod client;
mod response;
mod signer;

pub use client::OciClient;
pub use signer::RequestSigner;

use ampere_schema::{
    BootVolume, Instance, LaunchInstanceDetails, PrivateIp, PublicIp, Tenancy, User,
    VnicAttachment, Volume,
};
use async_trait::async_trait;

use crate::error::CloudError;

/// Control-plane capability consumed by the spawner.
///
/// Every call is a single request from the spawner's point of view: `launch_instance` in
/// particular must never be replayed by an implementation.
#[async_trait]
pub trait CloudApi: Send + Sync {
    async fn get_tenancy(&self, tenancy_id: &str) -> Result<Tenancy, CloudError>;

    async fn list_users(&self, compartment_id: &str) -> Result<Vec<User>, CloudError>;

    async fn list_volumes(&self, compartment_id: &str) -> Result<Vec<Volume>, CloudError>;

    async fn list_boot_volumes(
        &self,
        availability_domain: &str,
        compartment_id: &str,
    ) -> Result<Vec<BootVolume>, CloudError>;

    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>, CloudError>;

    async fn launch_instance(&self, details: &LaunchInstanceDetails)
    -> Result<Instance, CloudError>;

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>, CloudError>;

    async fn list_private_ips(
        &self,
        subnet_id: &str,
        vnic_id: &str,
    ) -> Result<Vec<PrivateIp>, CloudError>;

    async fn get_public_ip_by_private_ip_id(
        &self,
        private_ip_id: &str,
    ) -> Result<PublicIp, CloudError>;
}
