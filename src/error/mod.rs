mod chat;
mod cloud;
mod spawn;

pub use chat::ChatError;
pub use cloud::CloudError;
pub use spawn::{PreconditionError, SpawnError};

/// Distinguishes provider throttling from every other failure.
pub trait IsThrottled {
    fn is_throttled(&self) -> bool;
}
