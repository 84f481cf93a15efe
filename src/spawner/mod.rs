//! Pre-flight checks, the launch loop and its notifications.

mod controller;
mod driver;
mod identity;
mod notifier;
mod outcome;
mod precheck;
mod request;
mod retry;

pub use controller::RetryController;
pub use driver::{AttemptOutcome, LaunchDriver};
pub use identity::{AccountIdentity, verify_identity};
pub use notifier::{LaunchReport, Notifier, status_text, success_text};
pub use outcome::RunOutcome;
pub use precheck::{
    PreconditionChecker, QuotaSnapshot, check_compute, check_display_name, check_storage,
};
pub use request::{LaunchRequest, SourceDescriptor};
pub use retry::{BackoffPolicy, FailureKind, HYSTERESIS_STREAK, RetryState};

use std::time::Duration;
use tracing::info;

use crate::config::{Config, LaunchConfig, LimitsConfig, RetryConfig};
use crate::error::SpawnError;
use crate::oci::CloudApi;
use crate::telegram::ChatApi;

/// Chat capability plus the chat it reports to.
pub struct ChatTarget<T> {
    pub api: T,
    pub chat_id: String,
}

/// Runs the three phases in order: identity and pre-flight checks, payload, launch loop.
pub struct Spawner<C, T> {
    cloud: C,
    chat: Option<ChatTarget<T>>,
    tenancy_id: String,
    launch: LaunchConfig,
    limits: LimitsConfig,
    retry: RetryConfig,
}

impl<C, T> Spawner<C, T>
where
    C: CloudApi,
    T: ChatApi,
{
    pub fn new(cfg: &Config, cloud: C, chat: Option<ChatTarget<T>>) -> Self {
        Self {
            cloud,
            chat,
            tenancy_id: cfg.oci.tenancy.clone(),
            launch: cfg.launch.clone(),
            limits: cfg.limits,
            retry: cfg.retry,
        }
    }

    /// Returns only once an instance has been launched, or with a fatal pre-flight error.
    pub async fn run(self) -> Result<LaunchReport, SpawnError> {
        let identity =
            verify_identity(&self.cloud, &self.tenancy_id, &self.launch.compartment_id).await?;

        let request = LaunchRequest::from_config(&self.launch)?;
        match &request.source {
            SourceDescriptor::FromImage { image_id, .. } => {
                info!(image_id = %image_id, "Using image as boot source");
            }
            SourceDescriptor::FromBootVolume { boot_volume_id } => {
                info!(boot_volume_id = %boot_volume_id, "Using boot volume as boot source");
            }
        }

        let snapshot = PreconditionChecker::new(&self.cloud, &request, self.limits)
            .run()
            .await?;
        info!(
            matching_instances = snapshot.matching_instances,
            used_storage_gbs = ?snapshot.used_storage_gbs,
            ocpus = request.ocpus,
            memory_gbs = request.memory_in_gbs,
            "Precheck passed! Ready to create instance"
        );

        let mut notifier = self.chat.map(|target| {
            Notifier::new(
                target.api,
                target.chat_id,
                identity,
                request.display_name.clone(),
                Duration::from_secs(self.retry.notify_retry_delay_secs),
            )
        });
        if let Some(notifier) = notifier.as_mut() {
            notifier.announce_start(&request).await;
        }

        let driver = LaunchDriver::new(&self.cloud, &request, &self.retry);
        let controller =
            RetryController::new(driver, &request, notifier, BackoffPolicy::from(&self.retry));
        Ok(controller.run().await)
    }
}
