use thiserror::Error as ThisError;

use super::CloudError;

/// Pre-flight check that rules out any launch attempt.
#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum PreconditionError {
    #[error("only {free} GB free out of {capacity} GB, {required} GB needed")]
    InsufficientStorage {
        free: i64,
        required: u64,
        capacity: u64,
    },

    #[error(
        "free-tier limit exceeded: {used_ocpus} + {requested_ocpus} OCPUs of {max_ocpus}, \
         {used_memory_gbs} + {requested_memory_gbs} GB of {max_memory_gbs}"
    )]
    QuotaExceeded {
        used_ocpus: f64,
        used_memory_gbs: f64,
        requested_ocpus: u32,
        requested_memory_gbs: u32,
        max_ocpus: u32,
        max_memory_gbs: u32,
    },

    #[error("duplicate display name {0:?}")]
    DuplicateDisplayName(String),
}

/// Fatal-class errors: each one ends the process abnormally.
#[derive(Debug, ThisError)]
pub enum SpawnError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Failed to verify account identity: {0}")]
    IdentityVerification(#[source] CloudError),

    #[error("No valid image_id or boot_volume_id configured")]
    MissingLaunchSource,

    #[error("Precondition failed: {0}")]
    Precondition(#[from] PreconditionError),

    #[error("Failed to read account inventory: {0}")]
    Inventory(#[source] CloudError),

    #[error("Failed to load API signing key: {0}")]
    KeyLoad(String),

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}
