use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

use super::lax;
use crate::error::SpawnError;

/// Control-plane credentials managed by Figment.
///
/// Mirrors the fields of an OCI CLI `config` profile so the values can be copied over verbatim.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields)]
pub struct OciConfig {
    /// User OCID the API key belongs to.
    /// TOML: `oci.user`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub user: String,

    /// Tenancy OCID.
    /// TOML: `oci.tenancy`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub tenancy: String,

    /// Fingerprint of the uploaded public key.
    /// TOML: `oci.fingerprint`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub fingerprint: String,

    /// Path to the PEM-encoded RSA private key.
    /// TOML: `oci.key_file`. Required.
    #[serde(default)]
    pub key_file: Option<PathBuf>,

    /// Region identifier, e.g. `eu-frankfurt-1`.
    /// TOML: `oci.region`. Required.
    #[serde(default, deserialize_with = "lax::string")]
    pub region: String,

    /// Compute/network/block-storage endpoint override.
    /// TOML: `oci.iaas_endpoint`. Default: `https://iaas.<region>.oraclecloud.com`.
    #[serde(default)]
    pub iaas_endpoint: Option<Url>,

    /// Identity endpoint override.
    /// TOML: `oci.identity_endpoint`. Default: `https://identity.<region>.oraclecloud.com`.
    #[serde(default)]
    pub identity_endpoint: Option<Url>,
}

#[derive(Debug, Clone)]
pub struct OciResolvedConfig {
    pub user: String,
    pub tenancy: String,
    pub fingerprint: String,
    pub key_file: PathBuf,
    pub region: String,
    pub iaas_endpoint: Url,
    pub identity_endpoint: Url,
}

impl OciResolvedConfig {
    /// `keyId` value of the request signature.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

impl OciConfig {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.user.is_empty() {
            missing.push("oci.user");
        }
        if self.tenancy.is_empty() {
            missing.push("oci.tenancy");
        }
        if self.fingerprint.is_empty() {
            missing.push("oci.fingerprint");
        }
        if self.key_file.is_none() {
            missing.push("oci.key_file");
        }
        if self.region.is_empty() {
            missing.push("oci.region");
        }
        missing
    }

    pub fn resolve(&self) -> Result<OciResolvedConfig, SpawnError> {
        let key_file = self
            .key_file
            .clone()
            .ok_or_else(|| SpawnError::Config("oci.key_file is not set".to_string()))?;

        let iaas_endpoint = match &self.iaas_endpoint {
            Some(url) => url.clone(),
            None => regional_endpoint("iaas", &self.region)?,
        };
        let identity_endpoint = match &self.identity_endpoint {
            Some(url) => url.clone(),
            None => regional_endpoint("identity", &self.region)?,
        };

        Ok(OciResolvedConfig {
            user: self.user.clone(),
            tenancy: self.tenancy.clone(),
            fingerprint: self.fingerprint.clone(),
            key_file,
            region: self.region.clone(),
            iaas_endpoint,
            identity_endpoint,
        })
    }
}

fn regional_endpoint(service: &str, region: &str) -> Result<Url, SpawnError> {
    Url::parse(&format!("https://{service}.{region}.oraclecloud.com"))
        .map_err(|e| SpawnError::Config(format!("invalid region {region:?}: {e}")))
}
