//! Data models for controller API responses.

use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize};

/// Controller build identity, from `GET /version`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default)]
    pub meta: bool,
    /// Only reported by Clash Premium builds.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub premium: bool,
    pub version: String,
}

/// Adapter or group kind, as reported in the `type` field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
    Direct,
    Reject,
    RejectDrop,
    Compatible,
    Pass,
    Shadowsocks,
    ShadowsocksR,
    Snell,
    Socks5,
    Http,
    Vmess,
    Vless,
    Trojan,
    Hysteria,
    Hysteria2,
    WireGuard,
    Tuic,
    Ssh,
    Selector,
    Fallback,
    URLTest,
    LoadBalance,
    Relay,
    /// Any kind this crate does not know about yet.
    Other(String),
}

impl ProxyType {
    pub fn as_str(&self) -> &str {
        match self {
            ProxyType::Direct => "Direct",
            ProxyType::Reject => "Reject",
            ProxyType::RejectDrop => "RejectDrop",
            ProxyType::Compatible => "Compatible",
            ProxyType::Pass => "Pass",
            ProxyType::Shadowsocks => "Shadowsocks",
            ProxyType::ShadowsocksR => "ShadowsocksR",
            ProxyType::Snell => "Snell",
            ProxyType::Socks5 => "Socks5",
            ProxyType::Http => "Http",
            ProxyType::Vmess => "Vmess",
            ProxyType::Vless => "Vless",
            ProxyType::Trojan => "Trojan",
            ProxyType::Hysteria => "Hysteria",
            ProxyType::Hysteria2 => "Hysteria2",
            ProxyType::WireGuard => "WireGuard",
            ProxyType::Tuic => "Tuic",
            ProxyType::Ssh => "Ssh",
            ProxyType::Selector => "Selector",
            ProxyType::Fallback => "Fallback",
            ProxyType::URLTest => "URLTest",
            ProxyType::LoadBalance => "LoadBalance",
            ProxyType::Relay => "Relay",
            ProxyType::Other(name) => name,
        }
    }

    /// Whether this kind groups other proxies (and so carries `all`).
    pub fn is_group(&self) -> bool {
        matches!(
            self,
            ProxyType::Selector
                | ProxyType::Fallback
                | ProxyType::URLTest
                | ProxyType::LoadBalance
                | ProxyType::Relay
        )
    }
}

impl From<String> for ProxyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Direct" => ProxyType::Direct,
            "Reject" => ProxyType::Reject,
            "RejectDrop" => ProxyType::RejectDrop,
            "Compatible" => ProxyType::Compatible,
            "Pass" => ProxyType::Pass,
            "Shadowsocks" => ProxyType::Shadowsocks,
            "ShadowsocksR" => ProxyType::ShadowsocksR,
            "Snell" => ProxyType::Snell,
            "Socks5" => ProxyType::Socks5,
            "Http" => ProxyType::Http,
            "Vmess" => ProxyType::Vmess,
            "Vless" => ProxyType::Vless,
            "Trojan" => ProxyType::Trojan,
            "Hysteria" => ProxyType::Hysteria,
            "Hysteria2" => ProxyType::Hysteria2,
            "WireGuard" => ProxyType::WireGuard,
            "Tuic" => ProxyType::Tuic,
            "Ssh" => ProxyType::Ssh,
            "Selector" => ProxyType::Selector,
            "Fallback" => ProxyType::Fallback,
            "URLTest" => ProxyType::URLTest,
            "LoadBalance" => ProxyType::LoadBalance,
            "Relay" => ProxyType::Relay,
            _ => ProxyType::Other(value),
        }
    }
}

impl From<ProxyType> for String {
    fn from(value: ProxyType) -> Self {
        match value {
            ProxyType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for ProxyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One latency sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayHistory {
    pub time: DateTime<FixedOffset>,
    pub delay: u32,
    #[serde(rename = "meanDelay", default, skip_serializing_if = "Option::is_none")]
    pub mean_delay: Option<u32>,
}

/// A proxy node or a proxy group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Proxy {
    pub name: String,
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,
    /// Active member, groups only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub now: Option<String>,
    /// Member names, groups only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all: Option<Vec<String>>,
    #[serde(default)]
    pub history: Vec<DelayHistory>,
    #[serde(default)]
    pub udp: bool,
    #[serde(rename = "testUrl", default, skip_serializing_if = "Option::is_none")]
    pub test_url: Option<String>,
}

impl Proxy {
    /// Most recent delay sample, if any.
    pub fn last_delay(&self) -> Option<u32> {
        self.history.last().map(|h| h.delay)
    }
}

/// A provider: a named collection of proxies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyGroup {
    pub name: String,
    #[serde(rename = "type", default, skip_serializing_if = "String::is_empty")]
    pub provider_type: String,
    #[serde(rename = "vehicleType", default, skip_serializing_if = "String::is_empty")]
    pub vehicle_type: String,
    pub proxies: Vec<Proxy>,
    #[serde(rename = "updatedAt", default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(rename = "testUrl", default, skip_serializing_if = "Option::is_none")]
    pub test_url: Option<String>,
}

/// A proxy group whose active member can be switched.
///
/// Encodes exactly like the [`Proxy`] it wraps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Proxy", into = "Proxy")]
pub struct Selector {
    proxy: Proxy,
}

impl Selector {
    /// The underlying group.
    pub fn proxy(&self) -> &Proxy {
        &self.proxy
    }

    /// Test URL of the group, empty when the controller reports none.
    pub fn test_url(&self) -> &str {
        self.proxy.test_url.as_deref().unwrap_or_default()
    }

    pub fn into_proxy(self) -> Proxy {
        self.proxy
    }
}

impl From<Proxy> for Selector {
    fn from(proxy: Proxy) -> Self {
        Self { proxy }
    }
}

impl From<Selector> for Proxy {
    fn from(selector: Selector) -> Self {
        selector.proxy
    }
}

/// Addressing details of a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionMetadata {
    pub network: String,
    #[serde(rename = "type")]
    pub conn_type: String,
    #[serde(rename = "sourceIP")]
    pub source_ip: String,
    #[serde(rename = "destinationIP")]
    pub destination_ip: String,
    #[serde(rename = "sourcePort")]
    pub source_port: String,
    #[serde(rename = "destinationPort")]
    pub destination_port: String,
    /// Empty for connections made directly to an IP.
    #[serde(default)]
    pub host: String,
    #[serde(rename = "dnsMode", default, skip_serializing_if = "Option::is_none")]
    pub dns_mode: Option<String>,
    #[serde(rename = "processPath", default, skip_serializing_if = "Option::is_none")]
    pub process_path: Option<String>,
}

/// One live connection routed through the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub metadata: ConnectionMetadata,
    pub upload: u64,
    pub download: u64,
    pub start: DateTime<FixedOffset>,
    pub chains: Vec<String>,
    pub rule: String,
    #[serde(rename = "rulePayload", default)]
    pub rule_payload: String,
}

/// `GET /connections` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionsSnapshot {
    #[serde(rename = "downloadTotal")]
    pub download_total: u64,
    #[serde(rename = "uploadTotal")]
    pub upload_total: u64,
    // The controller sends `null` rather than `[]` when idle
    #[serde(default, deserialize_with = "null_as_default")]
    pub connections: Vec<Connection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<u64>,
}

/// Question section entry of a DNS response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsQuestion {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Qtype")]
    pub qtype: u16,
    #[serde(rename = "Qclass")]
    pub qclass: u16,
}

/// One resource record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsAnswer {
    pub name: String,
    #[serde(rename = "type")]
    pub rr_type: u16,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub data: String,
}

/// `GET /dns/query` response, shaped like DNS-over-HTTPS JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsQueryResult {
    #[serde(rename = "Status")]
    pub status: u16,
    #[serde(rename = "TC", default)]
    pub tc: bool,
    #[serde(rename = "RD", default)]
    pub rd: bool,
    #[serde(rename = "RA", default)]
    pub ra: bool,
    #[serde(rename = "AD", default)]
    pub ad: bool,
    #[serde(rename = "CD", default)]
    pub cd: bool,
    #[serde(rename = "Question")]
    pub question: Vec<DnsQuestion>,
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DnsAnswer>,
    #[serde(rename = "Authority", default, skip_serializing_if = "Option::is_none")]
    pub authority: Option<Vec<DnsAnswer>>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
