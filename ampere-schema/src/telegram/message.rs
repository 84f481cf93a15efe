use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Bot API response envelope: `{ "ok": bool, "result": T }` or an error description.
#[derive(Debug, Deserialize, Serialize)]
pub struct TelegramResponse<T> {
    pub ok: bool,
    #[serde(default = "Option::default")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    #[serde(default)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(flatten)]
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EditMessageTextRequest<'a> {
    pub chat_id: &'a str,
    pub message_id: i64,
    pub text: &'a str,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeleteMessageRequest<'a> {
    pub chat_id: &'a str,
    pub message_id: i64,
}
