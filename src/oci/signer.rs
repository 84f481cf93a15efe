//! OCI HTTP-signature request signing (RSA-SHA256, `Signature version="1"`).

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use chrono::Utc;
use reqwest::header::{
    AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, DATE, HOST, HeaderName, HeaderValue,
};
use reqwest::{Method, Request};
use rsa::RsaPrivateKey;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs1v15::SigningKey;
use rsa::pkcs8::DecodePrivateKey;
use rsa::signature::{SignatureEncoding, Signer};
use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{CloudError, SpawnError};

const X_CONTENT_SHA256: HeaderName = HeaderName::from_static("x-content-sha256");

/// Headers covered by every signature.
const BASE_HEADERS: &[&str] = &["(request-target)", "date", "host"];
/// Extra headers covered when the request carries a body.
const BODY_HEADERS: &[&str] = &["content-length", "content-type", "x-content-sha256"];

pub struct RequestSigner {
    key_id: String,
    signing_key: SigningKey<Sha256>,
}

impl std::fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key_id", &self.key_id)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    pub fn new(key_id: impl Into<String>, private_key: RsaPrivateKey) -> Self {
        Self {
            key_id: key_id.into(),
            signing_key: SigningKey::<Sha256>::new(private_key),
        }
    }

    /// Accepts both PKCS#8 (`BEGIN PRIVATE KEY`) and PKCS#1 (`BEGIN RSA PRIVATE KEY`) PEM.
    pub fn from_pem(key_id: impl Into<String>, pem: &str) -> Result<Self, SpawnError> {
        let key = RsaPrivateKey::from_pkcs8_pem(pem)
            .or_else(|_| RsaPrivateKey::from_pkcs1_pem(pem))
            .map_err(|e| SpawnError::KeyLoad(format!("unsupported private key: {e}")))?;
        Ok(Self::new(key_id, key))
    }

    pub fn from_key_file(key_id: impl Into<String>, path: &Path) -> Result<Self, SpawnError> {
        let pem = std::fs::read_to_string(path)
            .map_err(|e| SpawnError::KeyLoad(format!("{}: {e}", path.display())))?;
        Self::from_pem(key_id, &pem)
    }

    /// Adds `date`, `host`, body digest headers and the `authorization` header to `request`.
    pub fn sign(&self, request: &mut Request) -> Result<(), CloudError> {
        let date = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
        let host = host_header(request)?;

        let headers = request.headers_mut();
        headers.insert(DATE, header_value(&date)?);
        headers.insert(HOST, header_value(&host)?);

        let with_body = matches!(*request.method(), Method::POST | Method::PUT | Method::PATCH);
        if with_body {
            let body = request
                .body()
                .and_then(reqwest::Body::as_bytes)
                .unwrap_or_default();
            let digest = STANDARD.encode(Sha256::digest(body));
            let length = body.len().to_string();

            let headers = request.headers_mut();
            headers.insert(X_CONTENT_SHA256, header_value(&digest)?);
            headers.insert(CONTENT_LENGTH, header_value(&length)?);
            if !headers.contains_key(CONTENT_TYPE) {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            }
        }

        let covered: Vec<&str> = if with_body {
            BASE_HEADERS.iter().chain(BODY_HEADERS).copied().collect()
        } else {
            BASE_HEADERS.to_vec()
        };

        let signing_string = signing_string(request, &covered)?;
        let signature = STANDARD.encode(self.signing_key.sign(signing_string.as_bytes()).to_bytes());

        let authorization = format!(
            r#"Signature version="1",keyId="{key_id}",algorithm="rsa-sha256",headers="{headers}",signature="{signature}""#,
            key_id = self.key_id,
            headers = covered.join(" "),
        );
        request
            .headers_mut()
            .insert(AUTHORIZATION, header_value(&authorization)?);
        Ok(())
    }
}

/// Builds the newline-joined `name: value` list the signature is computed over.
pub(crate) fn signing_string(request: &Request, covered: &[&str]) -> Result<String, CloudError> {
    covered
        .iter()
        .map(|name| {
            if *name == "(request-target)" {
                return Ok(format!("(request-target): {}", request_target(request)));
            }
            let value = request
                .headers()
                .get(*name)
                .ok_or_else(|| CloudError::Signing(format!("missing header {name}")))?
                .to_str()
                .map_err(|e| CloudError::Signing(format!("header {name} is not ASCII: {e}")))?;
            Ok(format!("{name}: {value}"))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(|lines| lines.join("\n"))
}

fn request_target(request: &Request) -> String {
    let url = request.url();
    let method = request.method().as_str().to_ascii_lowercase();
    match url.query() {
        Some(query) => format!("{method} {}?{query}", url.path()),
        None => format!("{method} {}", url.path()),
    }
}

fn host_header(request: &Request) -> Result<String, CloudError> {
    let url = request.url();
    let host = url
        .host_str()
        .ok_or_else(|| CloudError::Signing(format!("url has no host: {url}")))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}

fn header_value(raw: &str) -> Result<HeaderValue, CloudError> {
    HeaderValue::from_str(raw).map_err(|e| CloudError::Signing(format!("invalid header value: {e}")))
}
