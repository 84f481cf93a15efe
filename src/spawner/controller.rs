use chrono::Utc;
use tracing::{error, info};

use super::driver::{AttemptOutcome, LaunchDriver};
use super::notifier::{LaunchReport, Notifier};
use super::request::LaunchRequest;
use super::retry::{BackoffPolicy, FailureKind, RetryState};
use crate::error::CloudError;
use crate::oci::CloudApi;
use crate::telegram::ChatApi;

/// The launch loop: cycle through availability domains until one accepts the request.
///
/// There is no attempt or time ceiling; the loop only ends with a launched instance (or when
/// the caller drops the future).
pub struct RetryController<'a, C: ?Sized, T> {
    driver: LaunchDriver<'a, C>,
    request: &'a LaunchRequest,
    notifier: Option<Notifier<T>>,
    policy: BackoffPolicy,
}

impl<'a, C, T> RetryController<'a, C, T>
where
    C: CloudApi + ?Sized,
    T: ChatApi,
{
    pub fn new(
        driver: LaunchDriver<'a, C>,
        request: &'a LaunchRequest,
        notifier: Option<Notifier<T>>,
        policy: BackoffPolicy,
    ) -> Self {
        Self {
            driver,
            request,
            notifier,
            policy,
        }
    }

    pub async fn run(mut self) -> LaunchReport {
        let request = self.request;
        let mut state = RetryState::new(&self.policy);
        loop {
            for availability_domain in &request.availability_domains {
                match self.driver.attempt(availability_domain).await {
                    AttemptOutcome::Launched { instance_id } => {
                        return self.finish(instance_id, availability_domain, state).await;
                    }
                    AttemptOutcome::Failed(err) => {
                        state = self.on_failure(&err, state).await;
                    }
                }
            }
        }
    }

    async fn on_failure(&mut self, err: &CloudError, state: RetryState) -> RetryState {
        let mut state = state.record_failure(FailureKind::classify(err), &self.policy);

        if state.status_due(&self.policy) {
            if let Some(notifier) = self.notifier.as_mut() {
                notifier.report_status(state.total_attempts, Utc::now()).await;
            }
            state = state.status_reported();
        }

        info!(
            status = ?err.status(),
            wait_secs = state.wait_secs,
            attempts = state.total_attempts,
            "{err}. Retrying after {}s. Retry count: {}",
            state.wait_secs,
            state.total_attempts
        );
        tokio::time::sleep(state.wait()).await;
        state
    }

    async fn finish(
        mut self,
        instance_id: String,
        availability_domain: &str,
        state: RetryState,
    ) -> LaunchReport {
        let public_ip = match self.driver.settle_and_resolve(&instance_id).await {
            Ok(ip) => Some(ip),
            Err(err) => {
                error!(
                    instance_id = %instance_id,
                    error = %err,
                    "Instance launched but its public IP could not be resolved"
                );
                None
            }
        };

        let report = LaunchReport {
            instance_id,
            availability_domain: availability_domain.to_string(),
            public_ip,
            attempts: state.total_attempts + 1,
        };
        info!(
            instance_id = %report.instance_id,
            availability_domain = %report.availability_domain,
            "\"{}\" VPS created successfully! IP: {}, Retries: {}",
            self.request.display_name,
            report.public_ip.as_deref().unwrap_or("unresolved"),
            report.attempts
        );

        if let Some(notifier) = self.notifier.as_mut() {
            notifier.report_success(&report).await;
        }
        report
    }
}
