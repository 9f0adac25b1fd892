//! Blocking controller client.

use crate::api::endpoints::{
    CloseConnection, DelayTest, DnsQuery, Endpoint, GetConnections, GetDelay, GetProviders,
    GetProxies, GetVersion, SelectProxy,
};
use crate::api::pipeline;
use crate::api::transport::{BlockingTransport, Transport};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::models::{
    Connection, ConnectionsSnapshot, DnsQueryResult, Proxy, ProxyGroup, Selector, VersionInfo,
};

/// Blocking client for the controller API. Same surface as
/// [`AsyncClient`](crate::AsyncClient).
#[derive(Debug, Clone)]
pub struct SyncClient<T = BlockingTransport> {
    transport: T,
}

impl SyncClient<BlockingTransport> {
    /// Create a client for the controller at `base_url`, authenticating with `token`.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::new(base_url, token))
    }

    /// Create a client from a full config, including its timeout.
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Ok(Self::with_transport(BlockingTransport::new(&config)?))
    }
}

impl<T: Transport> SyncClient<T> {
    /// Wrap an existing transport.
    pub fn with_transport(transport: T) -> Self {
        Self { transport }
    }

    /// Borrow the underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Issue one endpoint and map its response.
    fn call<E: Endpoint>(&self, endpoint: E) -> Result<E::Output> {
        let response = self.transport.issue(&endpoint.request())?;
        endpoint.parse(response)
    }

    /// Controller build identity.
    pub fn get_version(&self) -> Result<VersionInfo> {
        self.call(GetVersion)
    }

    /// All proxies and groups, ordered by name.
    pub fn get_proxies(&self) -> Result<Vec<Proxy>> {
        self.call(GetProxies)
    }

    /// Providers with members resolved against `/proxies`.
    pub fn get_providers(&self) -> Result<Vec<ProxyGroup>> {
        let proxies = self.call(GetProxies)?;
        let providers = self.call(GetProviders)?;
        Ok(pipeline::merge_providers(&proxies, providers))
    }

    /// Selector groups across all providers.
    pub fn get_selectors(&self) -> Result<Vec<Selector>> {
        let groups = self.get_providers()?;
        Ok(pipeline::selectors(&groups))
    }

    /// Switch `provider` to `proxy`. Returns `false` if the controller refused.
    pub fn select_proxy_for_provider(&self, provider: &str, proxy: &str) -> Result<bool> {
        self.call(SelectProxy {
            group: provider.to_string(),
            proxy: proxy.to_string(),
        })
    }

    /// Last measured delay in milliseconds, or 0 if the controller has none.
    pub fn get_delay(&self, provider: &str) -> Result<u32> {
        self.call(GetDelay {
            name: provider.to_string(),
            test: None,
        })
    }

    /// Run a fresh delay test against `test.url`.
    pub fn get_delay_with(&self, provider: &str, test: &DelayTest) -> Result<u32> {
        self.call(GetDelay {
            name: provider.to_string(),
            test: Some(test.clone()),
        })
    }

    /// Snapshot of active connections.
    pub fn get_connections(&self) -> Result<ConnectionsSnapshot> {
        self.call(GetConnections)
    }

    /// Connections whose host contains `keyword`.
    pub fn search_connections_by_host(&self, keyword: &str) -> Result<Vec<Connection>> {
        let snapshot = self.get_connections()?;
        Ok(pipeline::filter_by_host(snapshot.connections, keyword))
    }

    /// Close one connection. Returns `true` only on 204.
    pub fn close_connection(&self, id: &str) -> Result<bool> {
        self.call(CloseConnection {
            id: Some(id.to_string()),
        })
    }

    /// Close every connection. Returns `true` only on 204.
    pub fn close_all_connections(&self) -> Result<bool> {
        self.call(CloseConnection { id: None })
    }

    /// Resolve `name` through the controller.
    pub fn dns_query(&self, name: &str) -> Result<DnsQueryResult> {
        self.call(DnsQuery {
            name: name.to_string(),
            record_type: None,
        })
    }

    /// Query a specific record type, e.g. `"AAAA"` or `"MX"`.
    pub fn dns_query_type(&self, name: &str, record_type: &str) -> Result<DnsQueryResult> {
        self.call(DnsQuery {
            name: name.to_string(),
            record_type: Some(record_type.to_string()),
        })
    }
}
