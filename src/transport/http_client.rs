//! `reqwest`-backed [`Transport`] with the shared client policy.
//!
//! Centralizes timeout, user-agent, compression and proxy handling so every
//! host is contacted the same way.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, Proxy};
use tracing::{debug, warn};

use super::{RawResponse, RequestPurpose, Transport, TransportError};
use crate::user_agent;

/// Default connect timeout in seconds.
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default read timeout in seconds.
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 30;

/// HTTP transport built on a pooled `reqwest` client.
///
/// Create once and share; the client reuses connections across requests.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when client construction fails.
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeouts(DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_READ_TIMEOUT_SECS)
    }

    /// Creates a transport with explicit connect and read timeouts.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when client construction fails.
    #[tracing::instrument(level = "debug")]
    pub fn with_timeouts(
        connect_timeout_secs: u64,
        read_timeout_secs: u64,
    ) -> Result<Self, TransportError> {
        let timeouts = Timeouts {
            connect_secs: connect_timeout_secs,
            read_secs: read_timeout_secs,
        };
        let client = build_http_client(timeouts)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self), fields(purpose = purpose.as_str()))]
    async fn fetch(
        &self,
        url: &str,
        purpose: RequestPurpose,
    ) -> Result<RawResponse, TransportError> {
        let response = self.client.get(url).send().await.map_err(|error| {
            warn!(error = %error, "Request could not be sent");
            TransportError::request_failed(url, &error.to_string())
        })?;

        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|error| {
            warn!(error = %error, status, "Response body could not be read");
            TransportError::request_failed(url, &format!("reading body failed: {error}"))
        })?;

        debug!(status, bytes = body.len(), "Request completed");
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

#[derive(Debug, Clone, Copy)]
struct Timeouts {
    connect_secs: u64,
    read_secs: u64,
}

enum BuildClientFailure {
    Panic,
    Build(reqwest::Error),
}

fn build_http_client(timeouts: Timeouts) -> Result<Client, TransportError> {
    let user_agent = user_agent::default_connector_user_agent();

    match try_build_client(&user_agent, timeouts, false) {
        Ok(client) => Ok(client),
        Err(BuildClientFailure::Panic) => {
            // Some sandboxed environments panic when querying system proxy
            // settings; retry with env proxies only.
            warn!("HTTP client hit system proxy panic; using env-proxy fallback builder");
            match try_build_client(&user_agent, timeouts, true) {
                Ok(client) => Ok(client),
                Err(BuildClientFailure::Panic) => Err(TransportError::client_build(
                    "HTTP client construction panicked while reading proxy settings",
                )),
                Err(BuildClientFailure::Build(error)) => {
                    Err(TransportError::client_build(&error.to_string()))
                }
            }
        }
        Err(BuildClientFailure::Build(error)) => {
            Err(TransportError::client_build(&error.to_string()))
        }
    }
}

fn try_build_client(
    user_agent: &str,
    timeouts: Timeouts,
    disable_system_proxy_lookup: bool,
) -> Result<Client, BuildClientFailure> {
    let user_agent = user_agent.to_string();
    catch_unwind(AssertUnwindSafe(move || {
        let mut builder = base_builder(user_agent, timeouts);
        if disable_system_proxy_lookup {
            builder = apply_env_proxy_fallback(builder.no_proxy());
        }
        builder.build().map_err(BuildClientFailure::Build)
    }))
    .map_err(|_| BuildClientFailure::Panic)?
}

fn base_builder(user_agent: String, timeouts: Timeouts) -> ClientBuilder {
    Client::builder()
        .connect_timeout(Duration::from_secs(timeouts.connect_secs))
        .timeout(Duration::from_secs(timeouts.read_secs))
        .user_agent(user_agent)
        .gzip(true)
}

fn apply_env_proxy_fallback(mut builder: ClientBuilder) -> ClientBuilder {
    if let Some(proxy) = env_proxy_for_scheme("https")
        && let Ok(resolved) = Proxy::https(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    if let Some(proxy) = env_proxy_for_scheme("http")
        && let Ok(resolved) = Proxy::http(&proxy)
    {
        builder = builder.proxy(resolved);
    }
    builder
}

fn env_proxy_for_scheme(scheme: &str) -> Option<String> {
    match scheme {
        "https" => find_first_proxy_var(&["HTTPS_PROXY", "https_proxy", "ALL_PROXY", "all_proxy"]),
        "http" => find_first_proxy_var(&["HTTP_PROXY", "http_proxy", "ALL_PROXY", "all_proxy"]),
        _ => None,
    }
}

fn find_first_proxy_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| {
        std::env::var(name)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    })
}
