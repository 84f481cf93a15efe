use ampere_schema::{
    CreateVnicDetails, InstanceSourceDetails, LaunchInstanceDetails,
    LaunchInstanceShapeConfigDetails,
};
use std::collections::BTreeMap;

use crate::config::LaunchConfig;
use crate::error::SpawnError;

/// Origin of the new instance's boot disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDescriptor {
    FromImage {
        image_id: String,
        boot_volume_size_gbs: Option<u32>,
    },
    FromBootVolume {
        boot_volume_id: String,
    },
}

impl SourceDescriptor {
    fn to_details(&self) -> InstanceSourceDetails {
        match self {
            SourceDescriptor::FromImage {
                image_id,
                boot_volume_size_gbs,
            } => InstanceSourceDetails::Image {
                image_id: image_id.clone(),
                boot_volume_size_in_gbs: *boot_volume_size_gbs,
            },
            SourceDescriptor::FromBootVolume { boot_volume_id } => {
                InstanceSourceDetails::BootVolume {
                    boot_volume_id: boot_volume_id.clone(),
                }
            }
        }
    }
}

/// Everything needed to ask for the instance. Built once, never mutated.
#[derive(Debug, Clone)]
pub struct LaunchRequest {
    pub shape: String,
    pub compartment_id: String,
    pub display_name: String,
    pub availability_domains: Vec<String>,
    pub ocpus: u32,
    pub memory_in_gbs: u32,
    pub subnet_id: String,
    pub ssh_authorized_keys: String,
    pub source: SourceDescriptor,
}

impl LaunchRequest {
    /// An image wins over a boot volume when both are configured.
    pub fn from_config(cfg: &LaunchConfig) -> Result<Self, SpawnError> {
        let source = match (&cfg.image_id, &cfg.boot_volume_id) {
            (Some(image_id), _) => SourceDescriptor::FromImage {
                image_id: image_id.clone(),
                boot_volume_size_gbs: cfg.boot_volume_size_in_gbs,
            },
            (None, Some(boot_volume_id)) => SourceDescriptor::FromBootVolume {
                boot_volume_id: boot_volume_id.clone(),
            },
            (None, None) => return Err(SpawnError::MissingLaunchSource),
        };

        Ok(Self {
            shape: cfg.shape.clone(),
            compartment_id: cfg.compartment_id.clone(),
            display_name: cfg.display_name.clone(),
            availability_domains: cfg.availability_domains.clone(),
            ocpus: cfg.ocpus,
            memory_in_gbs: cfg.memory_in_gbs,
            subnet_id: cfg.subnet_id.clone(),
            ssh_authorized_keys: cfg.ssh_authorized_keys.clone(),
            source,
        })
    }

    /// Provider payload targeting one availability domain.
    #[allow(clippy::cast_precision_loss)]
    pub fn details_for(&self, availability_domain: &str) -> LaunchInstanceDetails {
        let mut metadata = BTreeMap::new();
        if !self.ssh_authorized_keys.is_empty() {
            metadata.insert(
                "ssh_authorized_keys".to_string(),
                self.ssh_authorized_keys.clone(),
            );
        }

        LaunchInstanceDetails {
            availability_domain: availability_domain.to_string(),
            compartment_id: self.compartment_id.clone(),
            display_name: self.display_name.clone(),
            shape: self.shape.clone(),
            shape_config: LaunchInstanceShapeConfigDetails {
                ocpus: self.ocpus as f32,
                memory_in_gbs: self.memory_in_gbs as f32,
            },
            source_details: self.source.to_details(),
            create_vnic_details: CreateVnicDetails {
                assign_public_ip: true,
                subnet_id: self.subnet_id.clone(),
            },
            metadata,
            is_pv_encryption_in_transit_enabled: true,
        }
    }
}
