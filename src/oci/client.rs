use ampere_schema::{
    BootVolume, GetPublicIpByPrivateIpIdDetails, Instance, LaunchInstanceDetails, PrivateIp,
    PublicIp, Tenancy, User, VnicAttachment, Volume,
};
use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::StatusCode;
use serde::{Serialize, de::DeserializeOwned};
use std::{sync::Arc, time::Duration};
use url::Url;

use super::CloudApi;
use super::response::{OPC_NEXT_PAGE, service_error};
use super::signer::RequestSigner;
use crate::config::OciResolvedConfig;
use crate::error::{CloudError, SpawnError};
use crate::utils::logging::debug_json;

const API_VERSION: &str = "20160918";

/// Signed REST client for the compute, block-storage, network and identity services.
///
/// Reads are idempotent and retried on transport errors, throttling and 5xx with a small
/// exponential policy. Writes go out exactly once.
#[derive(Clone)]
pub struct OciClient {
    http: reqwest::Client,
    signer: Arc<RequestSigner>,
    iaas_endpoint: Url,
    identity_endpoint: Url,
    read_retry: ExponentialBuilder,
}

impl OciClient {
    pub fn new(cfg: &OciResolvedConfig, http: reqwest::Client) -> Result<Self, SpawnError> {
        let signer = RequestSigner::from_key_file(cfg.key_id(), &cfg.key_file)?;
        Ok(Self::with_signer(
            http,
            signer,
            cfg.iaas_endpoint.clone(),
            cfg.identity_endpoint.clone(),
        ))
    }

    pub fn with_signer(
        http: reqwest::Client,
        signer: RequestSigner,
        iaas_endpoint: Url,
        identity_endpoint: Url,
    ) -> Self {
        let read_retry = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(500))
            .with_max_delay(Duration::from_secs(2))
            .with_max_times(2)
            .with_jitter();

        Self {
            http,
            signer: Arc::new(signer),
            iaas_endpoint,
            identity_endpoint,
            read_retry,
        }
    }

    fn endpoint(base: &Url, path: &str, query: &[(&str, &str)]) -> Result<Url, CloudError> {
        let mut url = base.join(&format!("{API_VERSION}/{path}"))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    async fn send_signed(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::Response, CloudError> {
        let mut request = builder.build()?;
        self.signer.sign(&mut request)?;
        Ok(self.http.execute(request).await?)
    }

    /// GET with read retries; returns the decoded body and the `opc-next-page` token.
    async fn get_json<T>(&self, url: &Url) -> Result<(T, Option<String>), CloudError>
    where
        T: DeserializeOwned,
    {
        let resp = (|| async {
            let resp = self.send_signed(self.http.get(url.clone())).await?;
            if resp.status().is_success() {
                Ok(resp)
            } else {
                Err(service_error(resp).await)
            }
        })
        .retry(self.read_retry)
        .when(is_retryable_read)
        .notify(|err: &CloudError, dur: Duration| {
            tracing::debug!(url = %url, error = %err, "OCI read retrying in {:?}", dur);
        })
        .await?;

        let next_page = resp
            .headers()
            .get(OPC_NEXT_PAGE)
            .and_then(|v| v.to_str().ok())
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let bytes = resp.bytes().await?;
        Ok((serde_json::from_slice(&bytes)?, next_page))
    }

    /// Follows `opc-next-page` until the listing is exhausted.
    async fn list_all<T>(
        &self,
        base: &Url,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, CloudError>
    where
        T: DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page: Option<String> = None;
        loop {
            let url = {
                let mut pairs = query.to_vec();
                if let Some(token) = page.as_deref() {
                    pairs.push(("page", token));
                }
                Self::endpoint(base, path, &pairs)?
            };

            let (batch, next_page): (Vec<T>, _) = self.get_json(&url).await?;
            items.extend(batch);

            match next_page {
                Some(token) => page = Some(token),
                None => return Ok(items),
            }
        }
    }

    async fn post_json<B, T>(&self, url: Url, body: &B) -> Result<T, CloudError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let resp = self.send_signed(self.http.post(url).json(body)).await?;
        if !resp.status().is_success() {
            return Err(service_error(resp).await);
        }
        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

fn is_retryable_read(err: &CloudError) -> bool {
    match err {
        CloudError::Reqwest(e) => e.is_timeout() || e.is_connect() || e.is_request(),
        CloudError::Service { status, .. } => {
            *status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
        }
        _ => false,
    }
}

#[async_trait]
impl CloudApi for OciClient {
    async fn get_tenancy(&self, tenancy_id: &str) -> Result<Tenancy, CloudError> {
        let url = Self::endpoint(
            &self.identity_endpoint,
            &format!("tenancies/{tenancy_id}"),
            &[],
        )?;
        self.get_json(&url).await.map(|(tenancy, _)| tenancy)
    }

    async fn list_users(&self, compartment_id: &str) -> Result<Vec<User>, CloudError> {
        self.list_all(
            &self.identity_endpoint,
            "users",
            &[("compartmentId", compartment_id)],
        )
        .await
    }

    async fn list_volumes(&self, compartment_id: &str) -> Result<Vec<Volume>, CloudError> {
        self.list_all(
            &self.iaas_endpoint,
            "volumes",
            &[("compartmentId", compartment_id)],
        )
        .await
    }

    async fn list_boot_volumes(
        &self,
        availability_domain: &str,
        compartment_id: &str,
    ) -> Result<Vec<BootVolume>, CloudError> {
        self.list_all(
            &self.iaas_endpoint,
            "bootVolumes",
            &[
                ("availabilityDomain", availability_domain),
                ("compartmentId", compartment_id),
            ],
        )
        .await
    }

    async fn list_instances(&self, compartment_id: &str) -> Result<Vec<Instance>, CloudError> {
        self.list_all(
            &self.iaas_endpoint,
            "instances",
            &[("compartmentId", compartment_id)],
        )
        .await
    }

    async fn launch_instance(
        &self,
        details: &LaunchInstanceDetails,
    ) -> Result<Instance, CloudError> {
        debug_json("OCI launch payload", details);
        let url = Self::endpoint(&self.iaas_endpoint, "instances", &[])?;
        self.post_json(url, details).await
    }

    async fn list_vnic_attachments(
        &self,
        compartment_id: &str,
        instance_id: &str,
    ) -> Result<Vec<VnicAttachment>, CloudError> {
        self.list_all(
            &self.iaas_endpoint,
            "vnicAttachments",
            &[("compartmentId", compartment_id), ("instanceId", instance_id)],
        )
        .await
    }

    async fn list_private_ips(
        &self,
        subnet_id: &str,
        vnic_id: &str,
    ) -> Result<Vec<PrivateIp>, CloudError> {
        self.list_all(
            &self.iaas_endpoint,
            "privateIps",
            &[("subnetId", subnet_id), ("vnicId", vnic_id)],
        )
        .await
    }

    async fn get_public_ip_by_private_ip_id(
        &self,
        private_ip_id: &str,
    ) -> Result<PublicIp, CloudError> {
        let url = Self::endpoint(
            &self.iaas_endpoint,
            "publicIps/actions/getByPrivateIpId",
            &[],
        )?;
        let body = GetPublicIpByPrivateIpIdDetails {
            private_ip_id: private_ip_id.to_string(),
        };
        self.post_json(url, &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_appends_version_and_query() {
        let base = Url::parse("https://iaas.eu-frankfurt-1.oraclecloud.com").expect("base url");
        let url = OciClient::endpoint(
            &base,
            "bootVolumes",
            &[("availabilityDomain", "Uocm:EU-FRANKFURT-1-AD-1"), ("compartmentId", "c1")],
        )
        .expect("build url");

        assert_eq!(url.path(), "/20160918/bootVolumes");
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert_eq!(
            pairs,
            vec![
                (
                    "availabilityDomain".to_string(),
                    "Uocm:EU-FRANKFURT-1-AD-1".to_string()
                ),
                ("compartmentId".to_string(), "c1".to_string()),
            ]
        );
    }

    #[test]
    fn endpoint_without_query_has_no_question_mark() {
        let base = Url::parse("http://127.0.0.1:9000/").expect("base url");
        let url = OciClient::endpoint(&base, "instances", &[]).expect("build url");
        assert_eq!(url.as_str(), "http://127.0.0.1:9000/20160918/instances");
    }

    #[test]
    fn reads_retry_on_throttling_and_server_errors_only() {
        let service = |status: StatusCode| CloudError::Service {
            status,
            code: "X".to_string(),
            message: String::new(),
            opc_request_id: None,
        };
        assert!(is_retryable_read(&service(StatusCode::TOO_MANY_REQUESTS)));
        assert!(is_retryable_read(&service(StatusCode::SERVICE_UNAVAILABLE)));
        assert!(!is_retryable_read(&service(StatusCode::NOT_FOUND)));
        assert!(!is_retryable_read(&CloudError::Signing("x".to_string())));
    }
}
