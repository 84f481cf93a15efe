use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::LifecycleState;

/// Compute instance as returned by `ListInstances` / `LaunchInstance`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub shape: String,
    pub lifecycle_state: LifecycleState,
    #[serde(default)]
    pub availability_domain: Option<String>,
    #[serde(default)]
    pub shape_config: Option<InstanceShapeConfig>,
}

impl Instance {
    pub fn ocpus(&self) -> f32 {
        self.shape_config
            .as_ref()
            .and_then(|c| c.ocpus)
            .unwrap_or_default()
    }

    pub fn memory_in_gbs(&self) -> f32 {
        self.shape_config
            .as_ref()
            .and_then(|c| c.memory_in_gbs)
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct InstanceShapeConfig {
    #[serde(default)]
    pub ocpus: Option<f32>,
    #[serde(rename = "memoryInGBs", default)]
    pub memory_in_gbs: Option<f32>,
}

/// Request body for `POST /instances`.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInstanceDetails {
    pub availability_domain: String,
    pub compartment_id: String,
    pub display_name: String,
    pub shape: String,
    pub shape_config: LaunchInstanceShapeConfigDetails,
    pub source_details: InstanceSourceDetails,
    pub create_vnic_details: CreateVnicDetails,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub metadata: BTreeMap<String, String>,
    pub is_pv_encryption_in_transit_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct LaunchInstanceShapeConfigDetails {
    pub ocpus: f32,
    #[serde(rename = "memoryInGBs")]
    pub memory_in_gbs: f32,
}

/// Boot disk origin, discriminated by `sourceType` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "sourceType")]
pub enum InstanceSourceDetails {
    #[serde(rename = "image")]
    Image {
        #[serde(rename = "imageId")]
        image_id: String,
        #[serde(
            rename = "bootVolumeSizeInGBs",
            skip_serializing_if = "Option::is_none",
            default
        )]
        boot_volume_size_in_gbs: Option<u32>,
    },
    #[serde(rename = "bootVolume")]
    BootVolume {
        #[serde(rename = "bootVolumeId")]
        boot_volume_id: String,
    },
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnicDetails {
    pub assign_public_ip: bool,
    pub subnet_id: String,
}
