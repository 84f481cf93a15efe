use backon::{ConstantBuilder, Retryable};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::identity::AccountIdentity;
use super::request::LaunchRequest;
use crate::error::ChatError;
use crate::telegram::{ChatApi, MessageId};

/// Outcome of a run that got an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchReport {
    pub instance_id: String,
    pub availability_domain: String,
    /// `None` when the instance launched but its address could not be resolved.
    pub public_ip: Option<String>,
    /// Launch calls made, the successful one included.
    pub attempts: u64,
}

/// Best-effort chat reporting. Nothing here can fail the retry loop.
pub struct Notifier<T> {
    chat: T,
    chat_id: String,
    identity: AccountIdentity,
    display_name: String,
    status_message: Option<MessageId>,
    final_retry_delay: Duration,
}

impl<T> Notifier<T>
where
    T: ChatApi,
{
    pub fn new(
        chat: T,
        chat_id: impl Into<String>,
        identity: AccountIdentity,
        display_name: impl Into<String>,
        final_retry_delay: Duration,
    ) -> Self {
        Self {
            chat,
            chat_id: chat_id.into(),
            identity,
            display_name: display_name.into(),
            status_message: None,
            final_retry_delay,
        }
    }

    /// Posts the message later status updates edit in place.
    pub async fn announce_start(&mut self, request: &LaunchRequest) {
        let text = format!(
            "Start spawning instance {} - {} ocpus - {} GB\nCloud Account: {}\nEmail: {}",
            request.shape,
            request.ocpus,
            request.memory_in_gbs,
            self.identity.cloud_name,
            self.identity.email_or_unknown(),
        );
        match self.chat.send_message(&self.chat_id, &text).await {
            Ok(message_id) => self.status_message = Some(message_id),
            Err(err) => warn!(error = %err, "Failed to send start notification"),
        }
    }

    /// Edits the status message in place, creating it first if it does not exist yet.
    pub async fn report_status(&mut self, attempts: u64, now: DateTime<Utc>) {
        let text = status_text(&self.identity, attempts, now);
        let result = match self.status_message {
            Some(message_id) => {
                self.chat
                    .edit_message(&self.chat_id, message_id, &text)
                    .await
            }
            None => self
                .chat
                .send_message(&self.chat_id, &text)
                .await
                .map(|message_id| self.status_message = Some(message_id)),
        };
        if let Err(err) = result {
            debug!(error = %err, attempts, "Status notification dropped");
        }
    }

    /// Replaces the status message with the final one.
    ///
    /// Delivery of the final message is retried with a fixed delay until it goes through.
    pub async fn report_success(&mut self, report: &LaunchReport) {
        if let Some(message_id) = self.status_message.take()
            && let Err(err) = self.chat.delete_message(&self.chat_id, message_id).await
        {
            debug!(error = %err, message_id, "Failed to delete status message");
        }

        let text = success_text(&self.identity, &self.display_name, report);
        let policy = ConstantBuilder::default()
            .with_delay(self.final_retry_delay)
            .without_max_times();

        let delivered = (|| self.chat.send_message(&self.chat_id, &text))
            .retry(policy)
            .notify(|err: &ChatError, dur: Duration| {
                warn!(error = %err, "Success notification failed, retrying in {:?}", dur);
            })
            .await;

        if let Ok(message_id) = delivered {
            info!(message_id, "Success notification delivered");
        }
    }
}

pub fn status_text(identity: &AccountIdentity, attempts: u64, now: DateTime<Utc>) -> String {
    format!(
        "Cloud Account: {}\nEmail: {}\nNumber of Retry: {}\nBot Status: Running\nLast Checked (UTC): {}",
        identity.cloud_name,
        identity.email_or_unknown(),
        attempts,
        now.format("%Y-%m-%d %H:%M:%S"),
    )
}

pub fn success_text(identity: &AccountIdentity, display_name: &str, report: &LaunchReport) -> String {
    format!(
        "\"{}\" VPS created successfully!\nCloud Account: {}\nEmail: {}\nNumber of Retry: {}\nVPS IP: {}",
        display_name,
        identity.cloud_name,
        identity.email_or_unknown(),
        report.attempts,
        report.public_ip.as_deref().unwrap_or("unresolved"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn identity() -> AccountIdentity {
        AccountIdentity {
            cloud_name: "acme".to_string(),
            email: Some("ops@acme.test".to_string()),
        }
    }

    #[test]
    fn status_text_carries_count_and_timestamp() {
        let now = Utc.with_ymd_and_hms(2024, 5, 6, 7, 8, 9).unwrap();
        let text = status_text(&identity(), 30, now);
        assert!(text.contains("Number of Retry: 30"));
        assert!(text.contains("Last Checked (UTC): 2024-05-06 07:08:09"));
        assert!(text.contains("Email: ops@acme.test"));
    }

    #[test]
    fn success_text_marks_missing_address() {
        let report = LaunchReport {
            instance_id: "i1".to_string(),
            availability_domain: "AD-1".to_string(),
            public_ip: None,
            attempts: 12,
        };
        let text = success_text(&identity(), "ampere", &report);
        assert!(text.starts_with("\"ampere\" VPS created successfully!"));
        assert!(text.contains("Number of Retry: 12"));
        assert!(text.ends_with("VPS IP: unresolved"));
    }
}
