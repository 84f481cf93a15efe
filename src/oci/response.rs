use ampere_schema::OciErrorBody;
use reqwest::StatusCode;

use crate::error::CloudError;

pub(super) const OPC_REQUEST_ID: &str = "opc-request-id";
pub(super) const OPC_NEXT_PAGE: &str = "opc-next-page";

/// Upstream body preview length kept in fallback error messages.
const BODY_PREVIEW_CHARS: usize = 300;

/// Turns a non-2xx response into a [`CloudError::Service`].
///
/// Structured `{code, message}` bodies are kept as-is; anything else falls back to the status
/// reason and a truncated body preview.
pub(super) async fn service_error(resp: reqwest::Response) -> CloudError {
    let status = resp.status();
    let opc_request_id = resp
        .headers()
        .get(OPC_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let bytes = resp.bytes().await.unwrap_or_default();

    match serde_json::from_slice::<OciErrorBody>(&bytes) {
        Ok(body) if !body.code.is_empty() => {
            tracing::debug!(
                %status,
                code = %body.code,
                opc_request_id = ?opc_request_id,
                "OCI structured error"
            );
            CloudError::Service {
                status,
                code: body.code,
                message: body.message,
                opc_request_id,
            }
        }
        _ => {
            let raw_body = String::from_utf8_lossy(&bytes);
            let preview = format!("{:.len$}", raw_body, len = BODY_PREVIEW_CHARS);
            tracing::debug!(
                %status,
                body = %preview,
                opc_request_id = ?opc_request_id,
                "OCI unstructured error"
            );
            CloudError::Service {
                status,
                code: fallback_code(status),
                message: preview,
                opc_request_id,
            }
        }
    }
}

fn fallback_code(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map(|reason| reason.replace(' ', ""))
        .unwrap_or_else(|| status.as_u16().to_string())
}
