use tracing::info;

use crate::error::SpawnError;
use crate::oci::CloudApi;

/// Who the credentials belong to; shown in logs and chat messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountIdentity {
    pub cloud_name: String,
    pub email: Option<String>,
}

impl AccountIdentity {
    pub fn email_or_unknown(&self) -> &str {
        self.email.as_deref().unwrap_or("<unknown>")
    }
}

/// Proves the credentials work before anything else runs.
pub async fn verify_identity<C>(
    cloud: &C,
    tenancy_id: &str,
    compartment_id: &str,
) -> Result<AccountIdentity, SpawnError>
where
    C: CloudApi + ?Sized,
{
    let tenancy = cloud
        .get_tenancy(tenancy_id)
        .await
        .map_err(SpawnError::IdentityVerification)?;
    let users = cloud
        .list_users(compartment_id)
        .await
        .map_err(SpawnError::IdentityVerification)?;

    let identity = AccountIdentity {
        cloud_name: tenancy.name,
        email: users.into_iter().find_map(|user| user.email),
    };
    info!(
        cloud = %identity.cloud_name,
        email = %identity.email_or_unknown(),
        "Successfully connected to {} ({})",
        identity.cloud_name,
        identity.email_or_unknown()
    );
    Ok(identity)
}
