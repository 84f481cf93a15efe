use std::time::Duration;
use url::Url;

use crate::error::SpawnError;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared reqwest client for the control plane and the bot API.
///
/// Timeouts bound every provider call; the launch loop has no other cancellation point.
pub fn build_client(proxy: Option<&Url>) -> Result<reqwest::Client, SpawnError> {
    let mut builder = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::none())
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(60));

    if let Some(proxy_url) = proxy {
        let proxy = reqwest::Proxy::all(proxy_url.as_str()).map_err(SpawnError::HttpClient)?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(SpawnError::HttpClient)
}
