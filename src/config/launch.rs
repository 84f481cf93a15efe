use serde::{Deserialize, Serialize};

use super::lax;

/// Launch target managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchConfig {
    /// Availability domains tried in order on every cycle.
    /// TOML: `launch.availability_domains`. Accepts a list or `"AD-1,AD-2"`. Required.
    #[serde(default, deserialize_with = "lax::string_list")]
    pub availability_domains: Vec<String>,

    /// Display name of the new instance; must not collide with a live instance.
    /// TOML: `launch.display_name`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub display_name: String,

    /// TOML: `launch.compartment_id`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub compartment_id: String,

    /// Subnet the primary VNIC is created in.
    /// TOML: `launch.subnet_id`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub subnet_id: String,

    /// Public key(s) written to the `ssh_authorized_keys` instance metadata.
    /// TOML: `launch.ssh_authorized_keys`.
    #[serde(default, deserialize_with = "lax::string")]
    pub ssh_authorized_keys: String,

    /// TOML: `launch.shape`. Default: `VM.Standard.A1.Flex`.
    #[serde(default = "default_shape")]
    pub shape: String,

    /// TOML: `launch.ocpus`. Default: `4`.
    #[serde(default = "default_ocpus")]
    pub ocpus: u32,

    /// TOML: `launch.memory_in_gbs`. Default: `24`.
    #[serde(default = "default_memory_in_gbs")]
    pub memory_in_gbs: u32,

    /// Boot from this image. Takes precedence over `boot_volume_id`.
    /// TOML: `launch.image_id`.
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub image_id: Option<String>,

    /// Boot volume size when booting from an image.
    /// TOML: `launch.boot_volume_size_in_gbs`. Default: provider default.
    #[serde(default, deserialize_with = "lax::opt_u32")]
    pub boot_volume_size_in_gbs: Option<u32>,

    /// Boot from an existing boot volume.
    /// TOML: `launch.boot_volume_id`.
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub boot_volume_id: Option<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            availability_domains: Vec::new(),
            display_name: String::new(),
            compartment_id: String::new(),
            subnet_id: String::new(),
            ssh_authorized_keys: String::new(),
            shape: default_shape(),
            ocpus: default_ocpus(),
            memory_in_gbs: default_memory_in_gbs(),
            image_id: None,
            boot_volume_size_in_gbs: None,
            boot_volume_id: None,
        }
    }
}

impl LaunchConfig {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.availability_domains.is_empty() {
            missing.push("launch.availability_domains");
        }
        if self.display_name.is_empty() {
            missing.push("launch.display_name");
        }
        if self.compartment_id.is_empty() {
            missing.push("launch.compartment_id");
        }
        if self.subnet_id.is_empty() {
            missing.push("launch.subnet_id");
        }
        missing
    }
}

/// Account-wide ceilings of the free tier.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LimitsConfig {
    /// Total block + boot volume storage available, in GB.
    /// TOML: `limits.storage_capacity_gbs`. Default: `200`.
    #[serde(default = "default_storage_capacity_gbs")]
    pub storage_capacity_gbs: u64,

    /// Boot volume size assumed when `launch.boot_volume_size_in_gbs` is unset.
    /// TOML: `limits.default_boot_volume_gbs`. Default: `47`.
    #[serde(default = "default_boot_volume_gbs")]
    pub default_boot_volume_gbs: u64,

    /// TOML: `limits.max_ocpus`. Default: `4`.
    #[serde(default = "default_ocpus")]
    pub max_ocpus: u32,

    /// TOML: `limits.max_memory_gbs`. Default: `24`.
    #[serde(default = "default_memory_in_gbs")]
    pub max_memory_gbs: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            storage_capacity_gbs: default_storage_capacity_gbs(),
            default_boot_volume_gbs: default_boot_volume_gbs(),
            max_ocpus: default_ocpus(),
            max_memory_gbs: default_memory_in_gbs(),
        }
    }
}

fn default_shape() -> String {
    "VM.Standard.A1.Flex".to_string()
}

fn default_ocpus() -> u32 {
    4
}

fn default_memory_in_gbs() -> u32 {
    24
}

fn default_storage_capacity_gbs() -> u64 {
    200
}

fn default_boot_volume_gbs() -> u64 {
    47
}
