//! FGP service exposing the controller operations.

use anyhow::Result;
use fgp_daemon::service::{HealthStatus, MethodInfo, ParamInfo};
use fgp_daemon::FgpService;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::runtime::Runtime;

use crate::api::{AsyncClient, DelayTest};
use crate::config::ClientConfig;

/// Default URL used when `delay` is called with `timeout` but no `url`.
const DEFAULT_TEST_URL: &str = "https://www.gstatic.com/generate_204";

/// FGP service wrapping an [`AsyncClient`].
pub struct ControllerService {
    client: Arc<AsyncClient>,
    runtime: Runtime,
}

impl ControllerService {
    /// Create a new ControllerService for the given controller.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = AsyncClient::with_config(config)?;
        let runtime = Runtime::new()?;

        Ok(Self {
            client: Arc::new(client),
            runtime,
        })
    }

    /// Helper to get a string parameter.
    fn get_param_str<'a>(params: &'a HashMap<String, Value>, key: &str) -> Option<&'a str> {
        params.get(key).and_then(|v| v.as_str())
    }

    /// Helper to get a required string parameter.
    fn require_str<'a>(params: &'a HashMap<String, Value>, key: &str) -> Result<&'a str> {
        Self::get_param_str(params, key)
            .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {}", key))
    }

    /// Controller version implementation.
    fn controller_version(&self) -> Result<Value> {
        let client = self.client.clone();
        let version = self.runtime.block_on(async move { client.get_version().await })?;
        Ok(serde_json::to_value(version)?)
    }

    /// Health check implementation.
    fn health(&self) -> Result<Value> {
        let client = self.client.clone();
        let result = self.runtime.block_on(async move { client.get_version().await });

        Ok(match result {
            Ok(version) => serde_json::json!({
                "status": "healthy",
                "controller_connected": true,
                "controller_version": version.version,
                "version": env!("CARGO_PKG_VERSION"),
            }),
            Err(e) => serde_json::json!({
                "status": "unhealthy",
                "controller_connected": false,
                "error": e.to_string(),
                "version": env!("CARGO_PKG_VERSION"),
            }),
        })
    }

    /// List proxies implementation.
    fn proxies(&self) -> Result<Value> {
        let client = self.client.clone();
        let proxies = self.runtime.block_on(async move { client.get_proxies().await })?;

        Ok(serde_json::json!({
            "count": proxies.len(),
            "proxies": proxies,
        }))
    }

    /// List providers implementation.
    fn providers(&self) -> Result<Value> {
        let client = self.client.clone();
        let providers = self.runtime.block_on(async move { client.get_providers().await })?;

        Ok(serde_json::json!({
            "count": providers.len(),
            "providers": providers,
        }))
    }

    /// List selectors implementation.
    fn selectors(&self) -> Result<Value> {
        let client = self.client.clone();
        let selectors = self.runtime.block_on(async move { client.get_selectors().await })?;

        Ok(serde_json::json!({
            "count": selectors.len(),
            "selectors": selectors,
        }))
    }

    /// Select proxy implementation.
    fn select(&self, params: HashMap<String, Value>) -> Result<Value> {
        let provider = Self::require_str(&params, "provider")?.to_string();
        let proxy = Self::require_str(&params, "proxy")?.to_string();

        let client = self.client.clone();
        let selected = self.runtime.block_on(async move {
            client.select_proxy_for_provider(&provider, &proxy).await
        })?;

        Ok(serde_json::json!({ "selected": selected }))
    }

    /// Delay test implementation.
    fn delay(&self, params: HashMap<String, Value>) -> Result<Value> {
        let provider = Self::require_str(&params, "provider")?.to_string();
        let url = Self::get_param_str(&params, "url");
        let timeout = params.get("timeout").and_then(|v| v.as_u64());

        let test = match (url, timeout) {
            (None, None) => None,
            (url, timeout) => Some(DelayTest::new(
                url.unwrap_or(DEFAULT_TEST_URL),
                timeout.unwrap_or(5000).min(u32::MAX as u64) as u32,
            )),
        };

        let client = self.client.clone();
        let delay = self.runtime.block_on(async move {
            match test {
                Some(test) => client.get_delay_with(&provider, &test).await,
                None => client.get_delay(&provider).await,
            }
        })?;

        Ok(serde_json::json!({ "delay": delay }))
    }

    /// Connections snapshot implementation.
    fn connections(&self) -> Result<Value> {
        let client = self.client.clone();
        let snapshot = self.runtime.block_on(async move { client.get_connections().await })?;
        Ok(serde_json::to_value(snapshot)?)
    }

    /// Search connections implementation.
    fn search(&self, params: HashMap<String, Value>) -> Result<Value> {
        let host = Self::require_str(&params, "host")?.to_string();

        let client = self.client.clone();
        let connections = self.runtime.block_on(async move {
            client.search_connections_by_host(&host).await
        })?;

        Ok(serde_json::json!({
            "count": connections.len(),
            "connections": connections,
        }))
    }

    /// Close connection implementation.
    fn close(&self, params: HashMap<String, Value>) -> Result<Value> {
        let id = Self::require_str(&params, "id")?.to_string();

        let client = self.client.clone();
        let closed = self.runtime.block_on(async move { client.close_connection(&id).await })?;

        Ok(serde_json::json!({ "closed": closed }))
    }

    /// Close all connections implementation.
    fn close_all(&self) -> Result<Value> {
        let client = self.client.clone();
        let closed = self
            .runtime
            .block_on(async move { client.close_all_connections().await })?;

        Ok(serde_json::json!({ "closed": closed }))
    }

    /// DNS query implementation.
    fn dns(&self, params: HashMap<String, Value>) -> Result<Value> {
        let name = Self::require_str(&params, "name")?.to_string();
        let record_type = Self::get_param_str(&params, "type").map(str::to_string);

        let client = self.client.clone();
        let result = self.runtime.block_on(async move {
            match record_type {
                Some(ty) => client.dns_query_type(&name, &ty).await,
                None => client.dns_query(&name).await,
            }
        })?;

        Ok(serde_json::to_value(result)?)
    }
}

/// Helper to build a parameter description.
fn param(name: &str, param_type: &str, required: bool, default: Option<Value>) -> ParamInfo {
    ParamInfo {
        name: name.into(),
        param_type: param_type.into(),
        required,
        default,
    }
}

/// Helper to build a method description.
fn method(name: &str, description: &str, params: Vec<ParamInfo>) -> MethodInfo {
    MethodInfo {
        name: name.into(),
        description: description.into(),
        params,
    }
}

impl FgpService for ControllerService {
    fn name(&self) -> &str {
        "capi"
    }

    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn dispatch(&self, method: &str, params: HashMap<String, Value>) -> Result<Value> {
        match method {
            "health" => self.health(),
            "version" | "capi.version" => self.controller_version(),
            "proxies" | "capi.proxies" => self.proxies(),
            "providers" | "capi.providers" => self.providers(),
            "selectors" | "capi.selectors" => self.selectors(),
            "select" | "capi.select" => self.select(params),
            "delay" | "capi.delay" => self.delay(params),
            "connections" | "capi.connections" => self.connections(),
            "search" | "capi.search" => self.search(params),
            "close" | "capi.close" => self.close(params),
            "close_all" | "capi.close_all" => self.close_all(),
            "dns" | "capi.dns" => self.dns(params),
            _ => anyhow::bail!("Unknown method: {}", method),
        }
    }

    fn method_list(&self) -> Vec<MethodInfo> {
        vec![
            method("capi.version", "Get controller version", vec![]),
            method("capi.proxies", "List all proxies and groups", vec![]),
            method(
                "capi.providers",
                "List proxy providers with resolved members",
                vec![],
            ),
            method("capi.selectors", "List selector groups", vec![]),
            method(
                "capi.select",
                "Switch the active proxy of a selector group",
                vec![
                    param("provider", "string", true, None),
                    param("proxy", "string", true, None),
                ],
            ),
            method(
                "capi.delay",
                "Get delay for a proxy or group",
                vec![
                    param("provider", "string", true, None),
                    param("url", "string", false, Some(serde_json::json!(DEFAULT_TEST_URL))),
                    param("timeout", "integer", false, Some(serde_json::json!(5000))),
                ],
            ),
            method("capi.connections", "Snapshot of active connections", vec![]),
            method(
                "capi.search",
                "Find connections whose host contains a keyword",
                vec![param("host", "string", true, None)],
            ),
            method(
                "capi.close",
                "Close a connection by id",
                vec![param("id", "string", true, None)],
            ),
            method("capi.close_all", "Close all connections", vec![]),
            method(
                "capi.dns",
                "Resolve a name through the controller",
                vec![
                    param("name", "string", true, None),
                    param("type", "string", false, Some(serde_json::json!("A"))),
                ],
            ),
        ]
    }

    fn on_start(&self) -> Result<()> {
        tracing::info!("ControllerService starting, verifying controller connection...");
        let client = self.client.clone();
        self.runtime.block_on(async move {
            match client.get_version().await {
                Ok(version) => {
                    tracing::info!("Controller connection verified ({})", version.version);
                    Ok(())
                }
                Err(e) => {
                    tracing::error!("Failed to reach controller: {}", e);
                    Err(e.into())
                }
            }
        })
    }

    fn health_check(&self) -> HashMap<String, HealthStatus> {
        let mut checks = HashMap::new();

        let client = self.client.clone();
        let start = std::time::Instant::now();
        let result = self.runtime.block_on(async move { client.get_version().await });

        let latency = start.elapsed().as_secs_f64() * 1000.0;

        match result {
            Ok(_) => {
                checks.insert("controller".into(), HealthStatus::healthy_with_latency(latency));
            }
            Err(e) => {
                checks.insert("controller".into(), HealthStatus::unhealthy(e.to_string()));
            }
        }

        checks
    }
}
