use ampere_schema::{
    DeleteMessageRequest, EditMessageTextRequest, SendMessageRequest, TelegramMessage,
    TelegramResponse,
};
use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use url::Url;

use super::{ChatApi, MessageId};
use crate::config::TelegramResolvedConfig;
use crate::error::ChatError;

/// Bot API client: `POST {api_url}/bot{token}/{method}` with a JSON body.
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    api_url: Url,
    bot_token: String,
}

impl TelegramClient {
    pub fn new(cfg: &TelegramResolvedConfig, http: reqwest::Client) -> Self {
        Self {
            http,
            api_url: cfg.api_url.clone(),
            bot_token: cfg.bot_token.clone(),
        }
    }

    pub(crate) fn method_url(&self, method: &str) -> Result<Url, ChatError> {
        // Leading `./` keeps the `:` inside the token from parsing as a scheme.
        Ok(self
            .api_url
            .join(&format!("./bot{}/{method}", self.bot_token))?)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, ChatError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let resp = self
            .http
            .post(self.method_url(method)?)
            .json(body)
            .send()
            .await?;
        let status = resp.status();
        let bytes = resp.bytes().await?;

        let envelope: TelegramResponse<T> = match serde_json::from_slice(&bytes) {
            Ok(envelope) => envelope,
            Err(e) if status.is_success() => return Err(e.into()),
            Err(_) => {
                return Err(ChatError::Api {
                    status,
                    error_code: None,
                    description: String::from_utf8_lossy(&bytes).into_owned(),
                });
            }
        };

        if !envelope.ok || !status.is_success() {
            return Err(ChatError::Api {
                status,
                error_code: envelope.error_code,
                description: envelope.description.unwrap_or_default(),
            });
        }
        envelope.result.ok_or(ChatError::MissingResult)
    }
}

#[async_trait]
impl ChatApi for TelegramClient {
    async fn send_message(&self, chat_id: &str, text: &str) -> Result<MessageId, ChatError> {
        let message: TelegramMessage = self
            .call("sendMessage", &SendMessageRequest { chat_id, text })
            .await?;
        Ok(message.message_id)
    }

    async fn edit_message(
        &self,
        chat_id: &str,
        message_id: MessageId,
        text: &str,
    ) -> Result<(), ChatError> {
        // Answers with the edited message, or `true` for inline messages.
        let _: Value = self
            .call(
                "editMessageText",
                &EditMessageTextRequest {
                    chat_id,
                    message_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }

    async fn delete_message(&self, chat_id: &str, message_id: MessageId) -> Result<(), ChatError> {
        let _: bool = self
            .call(
                "deleteMessage",
                &DeleteMessageRequest {
                    chat_id,
                    message_id,
                },
            )
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_url_embeds_token() {
        let cfg = TelegramResolvedConfig {
            bot_token: "123:abc".to_string(),
            chat_id: "42".to_string(),
            api_url: Url::parse("https://api.telegram.org").expect("url"),
        };
        let client = TelegramClient::new(&cfg, reqwest::Client::new());
        assert_eq!(
            client.method_url("sendMessage").expect("url").as_str(),
            "https://api.telegram.org/bot123:abc/sendMessage"
        );
    }
}
