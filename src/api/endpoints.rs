//! Controller endpoints: how each one is requested and how its response maps
//! onto the data model.
//!
//! Both clients drive the same endpoint values, so the request shape and the
//! status policy live here and nowhere else.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};

use super::request::{ApiRequest, Method, RawResponse};
use crate::error::{Error, Result};
use crate::models::{ConnectionsSnapshot, DnsQueryResult, Proxy, VersionInfo};

/// A single controller call.
pub trait Endpoint {
    type Output;

    fn request(&self) -> ApiRequest;

    fn parse(&self, response: RawResponse) -> Result<Self::Output>;
}

/// Decode a read response, treating any non-2xx status as an error.
fn decode<T: DeserializeOwned>(response: RawResponse) -> Result<T> {
    if !response.is_success() {
        return Err(Error::Status {
            status: response.status,
            body: response.text(),
        });
    }
    Ok(serde_json::from_slice(&response.body)?)
}

/// `GET /version`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetVersion;

impl Endpoint for GetVersion {
    type Output = VersionInfo;

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["version"])
    }

    fn parse(&self, response: RawResponse) -> Result<VersionInfo> {
        decode(response)
    }
}

/// `GET /proxies`, flattened to a list ordered by name.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProxies;

#[derive(Deserialize)]
struct ProxiesBody {
    proxies: BTreeMap<String, Proxy>,
}

impl Endpoint for GetProxies {
    type Output = Vec<Proxy>;

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["proxies"])
    }

    fn parse(&self, response: RawResponse) -> Result<Vec<Proxy>> {
        let body: ProxiesBody = decode(response)?;
        Ok(body.proxies.into_values().collect())
    }
}

/// `GET /providers/proxies`, left as raw JSON per provider.
///
/// Entries are validated when merged with the proxy list, where ones that are
/// not shaped like a provider are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetProviders;

#[derive(Deserialize)]
struct ProvidersBody {
    providers: BTreeMap<String, Value>,
}

impl Endpoint for GetProviders {
    type Output = BTreeMap<String, Value>;

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["providers", "proxies"])
    }

    fn parse(&self, response: RawResponse) -> Result<Self::Output> {
        let body: ProvidersBody = decode(response)?;
        Ok(body.providers)
    }
}

/// `PUT /proxies/{group}` with `{"name": proxy}`.
#[derive(Debug, Clone)]
pub struct SelectProxy {
    pub group: String,
    pub proxy: String,
}

impl Endpoint for SelectProxy {
    type Output = bool;

    fn request(&self) -> ApiRequest {
        ApiRequest::new(Method::Put, ["proxies", self.group.as_str()])
            .json(json!({ "name": self.proxy }))
    }

    fn parse(&self, response: RawResponse) -> Result<bool> {
        if !response.is_success() {
            tracing::warn!(
                "Selecting '{}' in '{}' rejected with status {}",
                self.proxy,
                self.group,
                response.status
            );
        }
        Ok(response.is_success())
    }
}

/// Optional parameters for a delay test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayTest {
    pub url: String,
    pub timeout_ms: u32,
}

impl DelayTest {
    pub fn new(url: impl Into<String>, timeout_ms: u32) -> Self {
        Self {
            url: url.into(),
            timeout_ms,
        }
    }
}

/// `GET /proxies/{name}/delay`
#[derive(Debug, Clone)]
pub struct GetDelay {
    pub name: String,
    pub test: Option<DelayTest>,
}

#[derive(Deserialize)]
struct DelayBody {
    delay: u32,
}

impl Endpoint for GetDelay {
    type Output = u32;

    fn request(&self) -> ApiRequest {
        let request = ApiRequest::get(["proxies", self.name.as_str(), "delay"]);
        match &self.test {
            Some(test) => request
                .query("timeout", test.timeout_ms.to_string())
                .query("url", test.url.as_str()),
            None => request,
        }
    }

    /// Only an exact 200 carries a measurement; anything else reads as 0.
    fn parse(&self, response: RawResponse) -> Result<u32> {
        if response.status != 200 {
            tracing::warn!(
                "Delay test for '{}' returned status {}",
                self.name,
                response.status
            );
            return Ok(0);
        }
        let body: DelayBody = serde_json::from_slice(&response.body)?;
        Ok(body.delay)
    }
}

/// `GET /connections`
#[derive(Debug, Clone, Copy, Default)]
pub struct GetConnections;

impl Endpoint for GetConnections {
    type Output = ConnectionsSnapshot;

    fn request(&self) -> ApiRequest {
        ApiRequest::get(["connections"])
    }

    fn parse(&self, response: RawResponse) -> Result<ConnectionsSnapshot> {
        decode(response)
    }
}

/// `DELETE /connections/{id}`, or `DELETE /connections` when `id` is `None`.
#[derive(Debug, Clone, Default)]
pub struct CloseConnection {
    pub id: Option<String>,
}

impl Endpoint for CloseConnection {
    type Output = bool;

    fn request(&self) -> ApiRequest {
        match &self.id {
            Some(id) => ApiRequest::new(Method::Delete, ["connections", id.as_str()]),
            None => ApiRequest::new(Method::Delete, ["connections"]),
        }
    }

    /// The controller answers a successful close with 204 and nothing else.
    fn parse(&self, response: RawResponse) -> Result<bool> {
        let closed = response.status == 204;
        if !closed {
            tracing::warn!(
                "Closing connection {} returned status {}",
                self.id.as_deref().unwrap_or("(all)"),
                response.status
            );
        }
        Ok(closed)
    }
}

/// `GET /dns/query?name=..[&type=..]`
#[derive(Debug, Clone)]
pub struct DnsQuery {
    pub name: String,
    pub record_type: Option<String>,
}

impl Endpoint for DnsQuery {
    type Output = DnsQueryResult;

    fn request(&self) -> ApiRequest {
        let request = ApiRequest::get(["dns", "query"]).query("name", self.name.as_str());
        match &self.record_type {
            Some(ty) => request.query("type", ty.as_str()),
            None => request,
        }
    }

    fn parse(&self, response: RawResponse) -> Result<DnsQueryResult> {
        decode(response)
    }
}
