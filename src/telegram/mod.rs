mod client;

pub use client::TelegramClient;

use async_trait::async_trait;

use crate::error::ChatError;

/// Identifier of a message already delivered to a chat.
pub type MessageId = i64;

/// Chat delivery capability consumed by the notifier.
#[async_trait]
pub trait ChatApi: Send + Sync {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<MessageId, ChatError>;

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), ChatError>;

    async fn delete_message(&self, chat_id: &str, message_id: MessageId) -> Result<(), ChatError>;
}
