//! HTTP transports for the controller clients.

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};

use super::request::{ApiRequest, RawResponse};
use crate::config::ClientConfig;
use crate::error::Result;

/// Issues one request and returns the status and body, whatever the status.
pub trait Transport {
    fn issue(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// Cooperative counterpart of [`Transport`].
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn issue(&self, request: &ApiRequest) -> Result<RawResponse>;
}

/// Async transport over a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder().pool_max_idle_per_host(5);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }
}

#[async_trait]
impl AsyncTransport for HttpTransport {
    async fn issue(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = request.url(&self.base_url)?;
        tracing::debug!("{} {}", request.method, request.path());

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        tracing::debug!("{} {} -> {}", request.method, request.path(), status);
        Ok(RawResponse::new(status, body.to_vec()))
    }
}

/// Blocking transport over `reqwest::blocking::Client`.
///
/// Must not be constructed or dropped inside an async runtime.
#[derive(Debug, Clone)]
pub struct BlockingTransport {
    client: reqwest::blocking::Client,
    base_url: String,
    token: String,
}

impl BlockingTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        // The blocking builder defaults to a 30s timeout; unset means unbounded here
        let client = reqwest::blocking::Client::builder()
            .pool_max_idle_per_host(5)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token: config.token.clone(),
        })
    }
}

impl Transport for BlockingTransport {
    fn issue(&self, request: &ApiRequest) -> Result<RawResponse> {
        let url = request.url(&self.base_url)?;
        tracing::debug!("{} {}", request.method, request.path());

        let mut builder = self
            .client
            .request(request.method.into(), url)
            .header(AUTHORIZATION, format!("Bearer {}", self.token));
        if let Some(body) = &request.body {
            builder = builder.header(CONTENT_TYPE, "application/json").json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.bytes()?;

        tracing::debug!("{} {} -> {}", request.method, request.path(), status);
        Ok(RawResponse::new(status, body.to_vec()))
    }
}
