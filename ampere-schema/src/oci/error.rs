use serde::{Deserialize, Serialize};

/// Error envelope returned by the control plane for every non-2xx answer.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct OciErrorBody {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_throttling_body() {
        let raw = r#"{"code":"TooManyRequests","message":"Too many requests for the user"}"#;
        let body: OciErrorBody = serde_json::from_str(raw).expect("decode body");
        assert_eq!(body.code, "TooManyRequests");
        assert_eq!(body.message, "Too many requests for the user");
    }
}
