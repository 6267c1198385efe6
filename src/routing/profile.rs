//! Profile resolution to connection parameters.
//!
//! A decision only names a profile. This module turns that name into what the
//! host's request hook needs, falling back to a direct connection whenever the
//! profile is `"direct"`, unknown, or itself uses the `direct` scheme.

use serde::{Deserialize, Serialize};

use crate::routing::decision::Decision;
use crate::snapshot::{Profile, Scheme, Snapshot};

/// Transport type understood by the host proxy API.
///
/// Schemes this crate does not know are handed to the host unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProxyType {
    Direct,
    Http,
    Https,
    Socks4,
    Socks,
    Other(String),
}

impl From<&Scheme> for ProxyType {
    fn from(scheme: &Scheme) -> Self {
        match scheme {
            Scheme::Direct => ProxyType::Direct,
            Scheme::Http => ProxyType::Http,
            Scheme::Https => ProxyType::Https,
            Scheme::Socks4 => ProxyType::Socks4,
            Scheme::Socks | Scheme::Socks5 => ProxyType::Socks,
            Scheme::Other(other) => ProxyType::Other(other.clone()),
        }
    }
}

impl From<Scheme> for ProxyType {
    fn from(scheme: Scheme) -> Self {
        ProxyType::from(&scheme)
    }
}

impl From<String> for ProxyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "direct" => ProxyType::Direct,
            "http" => ProxyType::Http,
            "https" => ProxyType::Https,
            "socks4" => ProxyType::Socks4,
            "socks" => ProxyType::Socks,
            _ => ProxyType::Other(value),
        }
    }
}

impl From<ProxyType> for String {
    fn from(proxy_type: ProxyType) -> Self {
        match proxy_type {
            ProxyType::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl ProxyType {
    pub fn as_str(&self) -> &str {
        match self {
            ProxyType::Direct => "direct",
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks => "socks",
            ProxyType::Other(other) => other.as_str(),
        }
    }

    /// Bounded metric label; unknown schemes share `"other"`.
    pub fn label(&self) -> &'static str {
        match self {
            ProxyType::Direct => "direct",
            ProxyType::Http => "http",
            ProxyType::Https => "https",
            ProxyType::Socks4 => "socks4",
            ProxyType::Socks => "socks",
            ProxyType::Other(_) => "other",
        }
    }
}

fn is_zero(port: &u16) -> bool {
    *port == 0
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Connection parameters for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProxyInfo {
    #[serde(rename = "type")]
    pub proxy_type: ProxyType,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    #[serde(default, skip_serializing_if = "is_zero")]
    pub port: u16,

    /// Resolve DNS through the proxy. Set for SOCKS proxies.
    #[serde(rename = "proxyDNS", default, skip_serializing_if = "is_false")]
    pub proxy_dns: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxyInfo {
    /// The direct-connection marker.
    pub fn direct() -> Self {
        Self {
            proxy_type: ProxyType::Direct,
            host: String::new(),
            port: 0,
            proxy_dns: false,
            username: None,
            password: None,
        }
    }

    pub fn is_direct(&self) -> bool {
        self.proxy_type == ProxyType::Direct
    }

    /// Connection parameters for a profile.
    pub fn from_profile(profile: &Profile) -> Self {
        if profile.is_direct() {
            return Self::direct();
        }

        let proxy_type = ProxyType::from(&profile.scheme);
        if let ProxyType::Other(other) = &proxy_type {
            tracing::warn!(
                profile_id = %profile.id,
                scheme = %other,
                "Passing unknown proxy scheme through"
            );
        }
        let proxy_dns = proxy_type == ProxyType::Socks;
        let non_empty =
            |value: &Option<String>| value.as_ref().filter(|v| !v.is_empty()).cloned();

        Self {
            proxy_type,
            host: profile.host.clone(),
            port: profile.port,
            proxy_dns,
            username: non_empty(&profile.username),
            password: non_empty(&profile.password),
        }
    }
}

/// Resolve a profile id against the snapshot.
///
/// Unknown ids resolve to a direct connection.
pub fn resolve_profile(snapshot: &Snapshot, profile_id: &str) -> ProxyInfo {
    match snapshot.profile(profile_id) {
        Some(profile) => ProxyInfo::from_profile(profile),
        None => {
            tracing::debug!(profile_id = %profile_id, "Profile not found, connecting directly");
            ProxyInfo::direct()
        }
    }
}

/// Resolve a decision to connection parameters.
pub fn resolve_decision(snapshot: &Snapshot, decision: &Decision) -> ProxyInfo {
    match decision.profile_id() {
        Some(profile_id) => resolve_profile(snapshot, profile_id),
        None => ProxyInfo::direct(),
    }
}
