//! The configuration snapshot consumed by one evaluation.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Deserializer, Serialize};

use crate::snapshot::types::{Override, Profile, RawOverride, Rule, DIRECT_PROFILE_ID};

/// Schema version this build understands.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Immutable point-in-time view of all routing configuration.
///
/// A snapshot is never mutated while it is shared. The `with_*`/`without_*`
/// methods return a modified copy instead.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    #[serde(default)]
    pub profiles: HashMap<String, Profile>,

    /// Ordered: the first enabled match wins.
    #[serde(default)]
    pub rules: Vec<Rule>,

    #[serde(default, deserialize_with = "lenient_overrides")]
    pub tab_overrides: HashMap<String, Override>,

    #[serde(default, deserialize_with = "lenient_overrides")]
    pub group_overrides: HashMap<String, Override>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            profiles: HashMap::new(),
            rules: Vec::new(),
            tab_overrides: HashMap::new(),
            group_overrides: HashMap::new(),
        }
    }
}

/// Drops override entries that neither disable nor name a profile instead of
/// failing the whole snapshot.
fn lenient_overrides<'de, D>(deserializer: D) -> Result<HashMap<String, Override>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: HashMap<String, RawOverride> = HashMap::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .filter_map(|(key, record)| match record.into_override() {
            Some(o) => Some((key, o)),
            None => {
                tracing::warn!(subject = %key, "Ignoring inert override record");
                None
            }
        })
        .collect())
}

fn builtin_direct() -> &'static Profile {
    static DIRECT: OnceLock<Profile> = OnceLock::new();
    DIRECT.get_or_init(Profile::direct)
}

impl Snapshot {
    /// Create an empty snapshot at the current schema version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a profile. `"direct"` always resolves to the built-in profile.
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        if id == DIRECT_PROFILE_ID {
            return Some(builtin_direct());
        }
        self.profiles.get(id)
    }

    /// Whether `id` refers to the built-in profile or a stored one.
    pub fn has_profile(&self, id: &str) -> bool {
        id == DIRECT_PROFILE_ID || self.profiles.contains_key(id)
    }

    /// The built-in direct profile followed by stored profiles ordered by id.
    pub fn profiles_with_builtin(&self) -> Vec<Profile> {
        let mut stored: Vec<&Profile> = self
            .profiles
            .values()
            .filter(|p| p.id != DIRECT_PROFILE_ID)
            .collect();
        stored.sort_by(|a, b| a.id.cmp(&b.id));

        std::iter::once(Profile::direct())
            .chain(stored.into_iter().cloned())
            .collect()
    }

    pub fn tab_override(&self, tab_id: i64) -> Option<&Override> {
        self.tab_overrides.get(&tab_id.to_string())
    }

    pub fn group_override(&self, group_id: i64) -> Option<&Override> {
        self.group_overrides.get(&group_id.to_string())
    }

    /// Add a profile, keyed by its id.
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.profiles.insert(profile.id.clone(), profile);
        self
    }

    /// Append a rule at the lowest priority.
    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_tab_override(mut self, tab_id: i64, value: Override) -> Self {
        self.tab_overrides.insert(tab_id.to_string(), value);
        self
    }

    pub fn without_tab_override(mut self, tab_id: i64) -> Self {
        self.tab_overrides.remove(&tab_id.to_string());
        self
    }

    pub fn with_group_override(mut self, group_id: i64, value: Override) -> Self {
        self.group_overrides.insert(group_id.to_string(), value);
        self
    }

    pub fn without_group_override(mut self, group_id: i64) -> Self {
        self.group_overrides.remove(&group_id.to_string());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::types::Scheme;

    #[test]
    fn test_empty_document_gets_defaults() {
        let snapshot: Snapshot = serde_json::from_str("{}").unwrap();
        assert_eq!(snapshot, Snapshot::new());
        assert_eq!(snapshot.schema_version, SCHEMA_VERSION);
    }

    #[test]
    fn test_parse_persisted_state() {
        let json = r#"{
            "schemaVersion": 1,
            "profiles": {
                "p1": {
                    "id": "p1", "name": "Corp", "scheme": "socks5", "host": "10.0.0.1", "port": 1080
                }
            },
            "rules": [
                {"id": "r1", "pattern": "*.corp.example", "profileId": "p1", "enabled": true}
            ],
            "tabOverrides": {"7": {"type": "disabled"}, "8": {"type": "bogus"}},
            "groupOverrides": {"3": {"type": "profile", "profileId": "p1"}}
        }"#;
        let snapshot: Snapshot = serde_json::from_str(json).unwrap();

        assert_eq!(snapshot.profiles["p1"].scheme, Scheme::Socks5);
        assert_eq!(snapshot.rules.len(), 1);
        assert_eq!(snapshot.tab_override(7), Some(&Override::Disabled));
        assert_eq!(snapshot.tab_override(8), None);
        assert_eq!(snapshot.group_override(3), Some(&Override::profile("p1")));
    }

    #[test]
    fn test_direct_profile_is_builtin() {
        let snapshot = Snapshot::new();
        let direct = snapshot.profile(DIRECT_PROFILE_ID).unwrap();
        assert!(direct.is_direct());
        assert!(std::ptr::eq(direct, snapshot.profile(DIRECT_PROFILE_ID).unwrap()));
        assert!(snapshot.has_profile("direct"));
        assert!(snapshot.profile("missing").is_none());
    }

    #[test]
    fn test_profiles_with_builtin_ordering() {
        let snapshot = Snapshot::new()
            .with_profile(Profile::new("b", "B", Scheme::Http, "b.proxy", 8080))
            .with_profile(Profile::new("a", "A", Scheme::Http, "a.proxy", 8080));

        let ids: Vec<String> =
            snapshot.profiles_with_builtin().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, vec!["direct", "a", "b"]);
    }

    #[test]
    fn test_override_copy_on_change() {
        let base = Snapshot::new();
        let next = base.clone().with_tab_override(4, Override::Disabled);

        assert!(base.tab_override(4).is_none());
        assert_eq!(next.tab_override(4), Some(&Override::Disabled));
        assert!(next.without_tab_override(4).tab_override(4).is_none());
    }
}
