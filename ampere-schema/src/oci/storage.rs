use serde::{Deserialize, Serialize};

use super::LifecycleState;

/// Block volume summary from `ListVolumes`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Volume {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(rename = "sizeInGBs", default)]
    pub size_in_gbs: Option<u64>,
    pub lifecycle_state: LifecycleState,
}

/// Boot volume summary from `ListBootVolumes` (scoped to one availability domain).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BootVolume {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub availability_domain: Option<String>,
    #[serde(rename = "sizeInGBs", default)]
    pub size_in_gbs: Option<u64>,
    pub lifecycle_state: LifecycleState,
}
