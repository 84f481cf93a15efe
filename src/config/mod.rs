mod basic;
mod lax;
mod launch;
mod oci;
mod retry;
mod telegram;

pub use basic::BasicConfig;
pub use launch::{LaunchConfig, LimitsConfig};
pub use oci::{OciConfig, OciResolvedConfig};
pub use retry::RetryConfig;
pub use telegram::{TelegramConfig, TelegramResolvedConfig};

use crate::error::SpawnError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Process-level settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// Control-plane credentials and endpoints (see `oci` table).
    #[serde(default)]
    pub oci: OciConfig,

    /// What to launch and where (see `launch` table).
    #[serde(default)]
    pub launch: LaunchConfig,

    /// Free-tier ceilings used by the pre-flight checks (see `limits` table).
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Retry loop tuning (see `retry` table).
    #[serde(default)]
    pub retry: RetryConfig,

    /// Optional chat notifications (see `telegram` table).
    #[serde(default)]
    pub telegram: TelegramConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "AMPERE_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` (if present) and `AMPERE_*` env vars.
    ///
    /// Nested keys use a double underscore: `AMPERE_LAUNCH__DISPLAY_NAME=web`.
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration from all layers and validates required fields.
    pub fn load() -> Result<Self, SpawnError> {
        Self::from_figment(Self::figment())
    }

    pub fn from_figment(figment: Figment) -> Result<Self, SpawnError> {
        let cfg: Self = figment.extract().map_err(Box::new)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reports every missing required setting at once.
    pub fn validate(&self) -> Result<(), SpawnError> {
        let mut missing = self.oci.missing_fields();
        missing.extend(self.launch.missing_fields());
        if missing.is_empty() {
            Ok(())
        } else {
            Err(SpawnError::Config(format!(
                "missing required settings: {}",
                missing.join(", ")
            )))
        }
    }

    pub fn oci(&self) -> Result<OciResolvedConfig, SpawnError> {
        self.oci.resolve()
    }

    /// `None` when either the bot token or the chat id is unset.
    pub fn telegram(&self) -> Option<TelegramResolvedConfig> {
        self.telegram.resolve()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn figment_from(toml: &str) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::string(toml))
    }

    const COMPLETE: &str = r#"
        [oci]
        user = "ocid1.user.oc1..u"
        tenancy = "ocid1.tenancy.oc1..t"
        fingerprint = "aa:bb"
        key_file = "/keys/oci.pem"
        region = "eu-frankfurt-1"

        [launch]
        availability_domains = "AD-1, AD-2"
        display_name = "ampere"
        compartment_id = "ocid1.compartment.oc1..c"
        subnet_id = "ocid1.subnet.oc1..s"
        ssh_authorized_keys = "ssh-ed25519 AAAA"
        image_id = "ocid1.image.oc1..i"
        boot_volume_size_in_gbs = "xxxx"
        boot_volume_id = "xxxx"

        [telegram]
        bot_token = "xxxx"
        chat_id = 123456
    "#;

    #[test]
    fn complete_config_applies_defaults_and_placeholders() {
        let cfg = Config::from_figment(figment_from(COMPLETE)).expect("valid config");

        assert_eq!(cfg.launch.availability_domains, vec!["AD-1", "AD-2"]);
        assert_eq!(cfg.launch.shape, "VM.Standard.A1.Flex");
        assert_eq!(cfg.launch.ocpus, 4);
        assert_eq!(cfg.launch.memory_in_gbs, 24);
        assert_eq!(cfg.launch.image_id.as_deref(), Some("ocid1.image.oc1..i"));
        assert_eq!(cfg.launch.boot_volume_size_in_gbs, None);
        assert_eq!(cfg.launch.boot_volume_id, None);

        assert_eq!(cfg.limits.storage_capacity_gbs, 200);
        assert_eq!(cfg.limits.default_boot_volume_gbs, 47);
        assert_eq!(cfg.retry.status_every, 10);
        assert_eq!(cfg.retry.settle_delay_secs, 60);

        // Placeholder token disables notifications even with a numeric chat id.
        assert_eq!(cfg.telegram.chat_id.as_deref(), Some("123456"));
        assert!(cfg.telegram().is_none());
    }

    #[test]
    fn missing_required_fields_are_reported_together() {
        let err = Config::from_figment(figment_from("")).expect_err("empty config must fail");
        let message = err.to_string();
        assert!(message.contains("oci.user"), "{message}");
        assert!(message.contains("oci.region"), "{message}");
        assert!(message.contains("launch.display_name"), "{message}");
        assert!(message.contains("launch.availability_domains"), "{message}");
    }

    #[test]
    fn region_resolves_default_endpoints() {
        let cfg = Config::from_figment(figment_from(COMPLETE)).expect("valid config");
        let oci = cfg.oci().expect("resolve oci");
        assert_eq!(
            oci.iaas_endpoint.as_str(),
            "https://iaas.eu-frankfurt-1.oraclecloud.com/"
        );
        assert_eq!(
            oci.identity_endpoint.as_str(),
            "https://identity.eu-frankfurt-1.oraclecloud.com/"
        );
        assert_eq!(
            oci.key_id(),
            "ocid1.tenancy.oc1..t/ocid1.user.oc1..u/aa:bb"
        );
    }

    #[test]
    fn numeric_boot_volume_override_accepts_strings() {
        let toml = COMPLETE.replace(
            r#"boot_volume_size_in_gbs = "xxxx""#,
            r#"boot_volume_size_in_gbs = "100""#,
        );
        let cfg = Config::from_figment(figment_from(&toml)).expect("valid config");
        assert_eq!(cfg.launch.boot_volume_size_in_gbs, Some(100));
    }
}
