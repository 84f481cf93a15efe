use serde::{Deserialize, Serialize};
use url::Url;

use super::lax;

/// Chat notification settings managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Bot token from @BotFather.
    /// TOML: `telegram.bot_token`. Unset or `xxxx` disables notifications.
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub bot_token: Option<String>,

    /// Chat (or user) id that receives the messages.
    /// TOML: `telegram.chat_id`. Unset or `xxxx` disables notifications.
    #[serde(default, deserialize_with = "lax::opt_string")]
    pub chat_id: Option<String>,

    /// Bot API base URL.
    /// TOML: `telegram.api_url`. Default: `https://api.telegram.org`.
    #[serde(default = "default_api_url")]
    pub api_url: Url,
}

#[derive(Debug, Clone)]
pub struct TelegramResolvedConfig {
    pub bot_token: String,
    pub chat_id: String,
    pub api_url: Url,
}

impl TelegramConfig {
    pub fn resolve(&self) -> Option<TelegramResolvedConfig> {
        Some(TelegramResolvedConfig {
            bot_token: self.bot_token.clone()?,
            chat_id: self.chat_id.clone()?,
            api_url: self.api_url.clone(),
        })
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            chat_id: None,
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> Url {
    Url::parse("https://api.telegram.org").expect("default telegram api_url must be a valid URL")
}
