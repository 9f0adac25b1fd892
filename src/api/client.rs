//! Async controller client.

use crate::api::endpoints::{
    CloseConnection, DelayTest, DnsQuery, Endpoint, GetConnections, GetDelay, GetProviders,
    GetProxies, GetVersion, SelectProxy,
};
use crate::api::pipeline;
use crate::api::transport::{AsyncTransport, HttpTransport};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{
    Connection, ConnectionsSnapshot, DnsQueryResult, Proxy, ProxyGroup, Selector, VersionInfo,
};

/// Non-blocking client for the controller API.
///
/// Each method awaits a single request, except `get_providers` and
/// `get_selectors`, which await two in sequence.
#[derive(Debug, Clone)]
pub struct AsyncClient<T = HttpTransport> {
    transport: T,
}

impl AsyncClient<HttpTransport> {
    /// Create a client for the controller at `base_url`, authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url, token))
    }

    /// Create a client from a full config, including its timeout.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(HttpTransport::new(&config)?))
    }
}

impl<T: AsyncTransport> AsyncClient<T> {
    /// Wrap an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one endpoint and map its response.
    async fn call<E: Endpoint>(&self, endpoint: E) -> Result<E::Output> {
        let response = self.transport.issue(&endpoint.request()).await?;
        endpoint.parse(response)
    }

    /// Controller build identity.
    pub async fn get_version(&self) -> Result<VersionInfo> {
        self.call(GetVersion).await
    }

    /// All proxies and groups, ordered by name.
    pub async fn get_proxies(&self) -> Result<Vec<Proxy>> {
        self.call(GetProxies).await
    }

    /// Providers with members resolved against `/proxies`.
    pub async fn get_providers(&self) -> Result<Vec<ProxyGroup>> {
        let proxies = self.call(GetProxies).await?;
        let providers = self.call(GetProviders).await?;
        Ok(pipeline::merge_providers(&proxies, providers))
    }

    /// Selector groups across all providers.
    pub async fn get_selectors(&self) -> Result<Vec<Selector>> {
        let groups = self.get_providers().await?;
        Ok(pipeline::selectors(&groups))
    }

    /// Switch `provider` to `proxy`. Returns `false` if the controller refused.
    pub async fn select_proxy_for_provider(&self, provider: &str, proxy: &str) -> Result<bool> {
        self.call(SelectProxy {
            group: provider.to_string(),
            proxy: proxy.to_string(),
        })
        .await
    }

    /// Last measured delay in milliseconds, or 0 if the controller has none.
    pub async fn get_delay(&self, provider: &str) -> Result<u32> {
        self.call(GetDelay {
            name: provider.to_string(),
            test: None,
        })
        .await
    }

    /// Run a fresh delay test against `test.url`.
    pub async fn get_delay_with(&self, provider: &str, test: &DelayTest) -> Result<u32> {
        self.call(GetDelay {
            name: provider.to_string(),
            test: Some(test.clone()),
        })
        .await
    }

    /// Snapshot of active connections.
    pub async fn get_connections(&self) -> Result<ConnectionsSnapshot> {
        self.call(GetConnections).await
    }

    /// Connections whose host contains `keyword`.
    pub async fn search_connections_by_host(&self, keyword: &str) -> Result<Vec<Connection>> {
        let snapshot = self.get_connections().await?;
        Ok(pipeline::filter_by_host(snapshot.connections, keyword))
    }

    /// Close one connection. Returns `true` only on 204.
    pub async fn close_connection(&self, id: &str) -> Result<bool> {
        self.call(CloseConnection {
            id: Some(id.to_string()),
        })
        .await
    }

    /// Close every connection. Returns `true` only on 204.
    pub async fn close_all_connections(&self) -> Result<bool> {
        self.call(CloseConnection { id: None }).await
    }

    /// Resolve `name` through the controller.
    pub async fn dns_query(&self, name: &str) -> Result<DnsQueryResult> {
        self.call(DnsQuery {
            name: name.to_string(),
            record_type: None,
        })
        .await
    }

    /// Query a specific record type, e.g. `"AAAA"` or `"MX"`.
    pub async fn dns_query_type(&self, name: &str, record_type: &str) -> Result<DnsQueryResult> {
        self.call(DnsQuery {
            name: name.to_string(),
            record_type: Some(record_type.to_string()),
        })
        .await
    }
}
