pub mod config;
pub mod error;
pub mod http;
pub mod oci;
pub mod spawner;
pub mod telegram;
pub(crate) mod utils;

pub use error::{ChatError, CloudError, PreconditionError, SpawnError};
pub use spawner::{LaunchReport, Spawner};
