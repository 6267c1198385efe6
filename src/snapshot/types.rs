//! Profile, rule and override records.
//!
//! All types derive Serde traits and use the camelCase field names of the
//! persisted configuration.

use serde::{Deserialize, Serialize};

/// Identifier of the built-in no-proxy profile.
pub const DIRECT_PROFILE_ID: &str = "direct";

/// Proxy scheme of a profile.
///
/// Schemes outside the known set are kept verbatim in [`Scheme::Other`] so a
/// single odd profile does not invalidate the rest of the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum Scheme {
    Direct,
    #[default]
    Http,
    Https,
    Socks,
    Socks4,
    Socks5,
    Other(String),
}

impl Scheme {
    pub fn as_str(&self) -> &str {
        match self {
            Scheme::Direct => "direct",
            Scheme::Http => "http",
            Scheme::Https => "https",
            Scheme::Socks => "socks",
            Scheme::Socks4 => "socks4",
            Scheme::Socks5 => "socks5",
            Scheme::Other(other) => other.as_str(),
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Scheme::Other(_))
    }
}

impl From<String> for Scheme {
    fn from(value: String) -> Self {
        match value.as_str() {
            "" | "http" => Scheme::Http,
            "direct" => Scheme::Direct,
            "https" => Scheme::Https,
            "socks" => Scheme::Socks,
            "socks4" => Scheme::Socks4,
            "socks5" => Scheme::Socks5,
            _ => Scheme::Other(value),
        }
    }
}

impl From<Scheme> for String {
    fn from(scheme: Scheme) -> Self {
        match scheme {
            Scheme::Other(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Scheme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named proxy connection configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier, immutable once assigned.
    pub id: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Proxy scheme (defaults to `http`).
    #[serde(default)]
    pub scheme: Scheme,

    /// Proxy host. Empty for direct profiles.
    #[serde(default)]
    pub host: String,

    /// Proxy port. 0 for direct profiles.
    #[serde(default)]
    pub port: u16,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Profile {
    /// The built-in no-proxy profile.
    pub fn direct() -> Self {
        Self {
            id: DIRECT_PROFILE_ID.to_string(),
            name: "Direct (no proxy)".to_string(),
            scheme: Scheme::Direct,
            host: String::new(),
            port: 0,
            username: None,
            password: None,
        }
    }

    /// Create a proxy profile without credentials.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        scheme: Scheme,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scheme,
            host: host.into(),
            port,
            username: None,
            password: None,
        }
    }

    /// Attach credentials to the profile.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn is_direct(&self) -> bool {
        self.scheme == Scheme::Direct
    }
}

fn default_enabled() -> bool {
    true
}

/// An ordered pattern-to-profile mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,

    /// Wildcard pattern, or a regular expression prefixed with `re:`.
    pub pattern: String,

    /// Target profile (or `"direct"`).
    pub profile_id: String,

    /// Only an explicit `false` disables the rule.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl Rule {
    /// Create an enabled rule.
    pub fn new(
        id: impl Into<String>,
        pattern: impl Into<String>,
        profile_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            pattern: pattern.into(),
            profile_id: profile_id.into(),
            enabled: true,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A forced routing decision for a tab or a tab group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "lowercase", try_from = "RawOverride")]
pub enum Override {
    /// Force a direct connection.
    Disabled,
    /// Route through the named profile.
    Profile {
        #[serde(rename = "profileId")]
        profile_id: String,
    },
}

impl Override {
    pub fn profile(profile_id: impl Into<String>) -> Self {
        Override::Profile {
            profile_id: profile_id.into(),
        }
    }
}

/// Persisted override shape, including the legacy `disabled: true` and
/// untyped `profileId` forms.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOverride {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    disabled: Option<bool>,
    #[serde(default)]
    profile_id: Option<String>,
}

impl RawOverride {
    /// Interpret the record, or `None` when it neither disables nor names a
    /// profile.
    pub fn into_override(self) -> Option<Override> {
        if self.kind.as_deref() == Some("disabled") || self.disabled == Some(true) {
            return Some(Override::Disabled);
        }
        match self.profile_id {
            Some(id) if !id.is_empty() => Some(Override::Profile { profile_id: id }),
            _ => None,
        }
    }
}

impl TryFrom<RawOverride> for Override {
    type Error = String;

    fn try_from(raw: RawOverride) -> Result<Self, Self::Error> {
        raw.into_override()
            .ok_or_else(|| "override is neither disabled nor bound to a profile".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"id":"p1","name":"Work"}"#).unwrap();
        assert_eq!(profile.scheme, Scheme::Http);
        assert_eq!(profile.port, 0);
        assert!(profile.username.is_none());
    }

    #[test]
    fn test_rule_enabled_unless_explicitly_false() {
        let rule: Rule =
            serde_json::from_str(r#"{"id":"r1","pattern":"*.example.com","profileId":"p1"}"#)
                .unwrap();
        assert!(rule.enabled);

        let rule: Rule = serde_json::from_str(
            r#"{"id":"r1","pattern":"*.example.com","profileId":"p1","enabled":false}"#,
        )
        .unwrap();
        assert!(!rule.enabled);
    }

    #[test]
    fn test_override_wire_shapes() {
        let o: Override = serde_json::from_str(r#"{"type":"disabled"}"#).unwrap();
        assert_eq!(o, Override::Disabled);

        let o: Override = serde_json::from_str(r#"{"type":"profile","profileId":"p1"}"#).unwrap();
        assert_eq!(o, Override::profile("p1"));

        assert_eq!(
            serde_json::to_value(Override::profile("p1")).unwrap(),
            serde_json::json!({"type": "profile", "profileId": "p1"})
        );
    }

    #[test]
    fn test_override_legacy_shapes() {
        let o: Override = serde_json::from_str(r#"{"disabled":true}"#).unwrap();
        assert_eq!(o, Override::Disabled);

        let o: Override = serde_json::from_str(r#"{"profileId":"p2"}"#).unwrap();
        assert_eq!(o, Override::profile("p2"));

        assert!(serde_json::from_str::<Override>(r#"{"type":"profile"}"#).is_err());
    }

    #[test]
    fn test_unknown_scheme_passes_through() {
        let profile: Profile =
            serde_json::from_str(r#"{"id":"p1","scheme":"socks4a","host":"h","port":1}"#).unwrap();
        assert_eq!(profile.scheme, Scheme::Other("socks4a".to_string()));
        assert!(!profile.scheme.is_known());
        assert_eq!(
            serde_json::to_value(&profile.scheme).unwrap(),
            serde_json::json!("socks4a")
        );
    }

    #[test]
    fn test_scheme_string_conversions() {
        assert_eq!(Scheme::from("socks5".to_string()), Scheme::Socks5);
        assert_eq!(Scheme::from("SOCKS5".to_string()), Scheme::Other("SOCKS5".to_string()));
        assert_eq!(Scheme::from(String::new()), Scheme::Http);
        assert_eq!(String::from(Scheme::Socks5), "socks5");
    }
}
