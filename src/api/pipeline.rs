//! Derived views built from already-decoded responses.
//!
//! `get_providers` fetches proxies, then providers, then joins them here. The
//! clients fail the whole operation if either fetch fails, so these functions
//! only ever see complete inputs.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde_json::Value;

use crate::models::{Connection, Proxy, ProxyGroup, ProxyType, Selector};

/// Join provider entries with the proxy list by name.
///
/// Each entry that decodes as a [`ProxyGroup`] is kept, with its members
/// replaced by the matching proxy from `proxies` where one exists (that copy
/// carries the full delay history). Entries that are not provider-shaped are
/// skipped.
pub fn merge_providers(proxies: &[Proxy], providers: BTreeMap<String, Value>) -> Vec<ProxyGroup> {
    let by_name: HashMap<&str, &Proxy> = proxies.iter().map(|p| (p.name.as_str(), p)).collect();

    providers
        .into_iter()
        .filter_map(|(key, raw)| match serde_json::from_value::<ProxyGroup>(raw) {
            Ok(group) => Some(group),
            Err(e) => {
                tracing::debug!("Skipping provider '{}': {}", key, e);
                None
            }
        })
        .map(|mut group| {
            for member in group.proxies.iter_mut() {
                if let Some(resolved) = by_name.get(member.name.as_str()) {
                    *member = (*resolved).clone();
                }
            }
            group
        })
        .collect()
}

/// Selector groups across all providers, first occurrence wins.
pub fn selectors(groups: &[ProxyGroup]) -> Vec<Selector> {
    let mut seen = HashSet::new();
    groups
        .iter()
        .flat_map(|g| g.proxies.iter())
        .filter(|p| p.proxy_type == ProxyType::Selector)
        .filter(|p| seen.insert(p.name.clone()))
        .cloned()
        .map(Selector::from)
        .collect()
}

/// Connections whose host contains `keyword`. Case-sensitive.
pub fn filter_by_host(connections: Vec<Connection>, keyword: &str) -> Vec<Connection> {
    connections
        .into_iter()
        .filter(|c| c.metadata.host.contains(keyword))
        .collect()
}
