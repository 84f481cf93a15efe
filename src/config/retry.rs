use serde::{Deserialize, Serialize};

/// Retry loop tuning managed by Figment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Wait before the first retry, in seconds.
    /// TOML: `retry.initial_wait_secs`. Default: `1`.
    #[serde(default = "default_one")]
    pub initial_wait_secs: u64,

    /// Floor the wait interval never drops below, in seconds.
    /// TOML: `retry.minimum_wait_secs`. Default: `1`.
    #[serde(default = "default_one")]
    pub minimum_wait_secs: u64,

    /// Failed attempts between two chat status updates.
    /// TOML: `retry.status_every`. Default: `10`.
    #[serde(default = "default_status_every")]
    pub status_every: u64,

    /// Pause after a successful launch before querying the instance's network, in seconds.
    /// TOML: `retry.settle_delay_secs`. Default: `60`.
    #[serde(default = "default_settle_delay_secs")]
    pub settle_delay_secs: u64,

    /// Fixed delay between deliveries of the final success message, in seconds.
    /// TOML: `retry.notify_retry_delay_secs`. Default: `5`.
    #[serde(default = "default_notify_retry_delay_secs")]
    pub notify_retry_delay_secs: u64,

    /// Lookups of the public address before giving up on it (the launch itself is never repeated).
    /// TOML: `retry.address_resolution_attempts`. Default: `3`.
    #[serde(default = "default_address_resolution_attempts")]
    pub address_resolution_attempts: usize,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            initial_wait_secs: default_one(),
            minimum_wait_secs: default_one(),
            status_every: default_status_every(),
            settle_delay_secs: default_settle_delay_secs(),
            notify_retry_delay_secs: default_notify_retry_delay_secs(),
            address_resolution_attempts: default_address_resolution_attempts(),
        }
    }
}

fn default_one() -> u64 {
    1
}

fn default_status_every() -> u64 {
    10
}

fn default_settle_delay_secs() -> u64 {
    60
}

fn default_notify_retry_delay_secs() -> u64 {
    5
}

fn default_address_resolution_attempts() -> usize {
    3
}
