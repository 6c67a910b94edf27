//! The injected HTTP transport.
//!
//! The gateway client only describes requests; executing them is behind the
//! [`ApiClient`] trait so tests can substitute a fake and callers can share
//! one connection pool. [`ReqwestClient`] is the production implementation.

use std::time::Duration;

use async_trait::async_trait;
use error_stack::ResultExt;
use once_cell::sync::OnceCell;

use crate::{
    errors::{CustomResult, HttpClientError},
    request::{Method, Request},
    types::Response,
};

// We may need to use an outbound proxy to connect to the external world.
#[derive(Clone, Debug, Default, serde::Deserialize)]
pub struct Proxy {
    pub http_url: Option<String>,
    pub https_url: Option<String>,
    pub idle_pool_connection_timeout: Option<u64>,
    pub bypass_proxy_hosts: Option<String>,
}

/// Transport capability required by the gateway client: send one request,
/// hand back the status code and raw body regardless of status class.
#[async_trait]
pub trait ApiClient: Send + Sync {
    async fn send_request(&self, request: Request) -> CustomResult<Response, HttpClientError>;
}

static DEFAULT_CLIENT: OnceCell<reqwest::Client> = OnceCell::new();

/// [`ApiClient`] backed by a process-wide `reqwest` connection pool.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(proxy_config: &Proxy) -> CustomResult<Self, HttpClientError> {
        let client = DEFAULT_CLIENT
            .get_or_try_init(|| {
                get_client_builder(proxy_config)?
                    .build()
                    .change_context(HttpClientError::ClientConstructionFailed)
                    .attach_printable("Failed to construct base client")
            })?
            .clone();
        Ok(Self { client })
    }
}

fn get_client_builder(
    proxy_config: &Proxy,
) -> CustomResult<reqwest::ClientBuilder, HttpClientError> {
    let mut client_builder = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_idle_timeout(Duration::from_secs(
            proxy_config
                .idle_pool_connection_timeout
                .unwrap_or_default(),
        ));

    let proxy_exclusion_config =
        reqwest::NoProxy::from_string(&proxy_config.bypass_proxy_hosts.clone().unwrap_or_default());

    // Proxy all HTTPS traffic through the configured HTTPS proxy
    if let Some(url) = proxy_config.https_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::https(url)
                .change_context(HttpClientError::InvalidProxyConfiguration)
                .attach_printable("HTTPS proxy configuration error")?
                .no_proxy(proxy_exclusion_config.clone()),
        );
    }

    // Proxy all HTTP traffic through the configured HTTP proxy
    if let Some(url) = proxy_config.http_url.as_ref() {
        client_builder = client_builder.proxy(
            reqwest::Proxy::http(url)
                .change_context(HttpClientError::InvalidProxyConfiguration)
                .attach_printable("HTTP proxy configuration error")?
                .no_proxy(proxy_exclusion_config),
        );
    }

    Ok(client_builder)
}

#[async_trait]
impl ApiClient for ReqwestClient {
    async fn send_request(&self, request: Request) -> CustomResult<Response, HttpClientError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };
        let mut request_builder = self.client.request(method, &request.url);
        for (name, value) in request.headers {
            request_builder = request_builder.header(&name, value.into_inner());
        }
        if let Some(body) = request.body {
            request_builder = request_builder.body(body.payload().to_owned());
        }

        let response = request_builder
            .send()
            .await
            .change_context(HttpClientError::RequestNotSent)?;
        let status_code = response.status().as_u16();
        let response = response
            .bytes()
            .await
            .change_context(HttpClientError::ResponseDecodingFailed)?;
        Ok(Response {
            status_code,
            response,
        })
    }
}
