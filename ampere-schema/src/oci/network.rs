use serde::{Deserialize, Serialize};

use super::LifecycleState;

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VnicAttachment {
    pub id: String,
    pub instance_id: String,
    #[serde(default)]
    pub vnic_id: Option<String>,
    pub lifecycle_state: LifecycleState,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrivateIp {
    pub id: String,
    #[serde(default)]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub is_primary: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicIp {
    #[serde(default)]
    pub id: Option<String>,
    pub ip_address: String,
    #[serde(default)]
    pub private_ip_id: Option<String>,
}

/// Request body for `POST /publicIps/actions/getByPrivateIpId`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPublicIpByPrivateIpIdDetails {
    pub private_ip_id: String,
}
