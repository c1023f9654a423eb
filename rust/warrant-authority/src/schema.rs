use serde::{Deserialize, Serialize};
use warrant_common::StorageKey;

/// Configuration for where authorization records live inside each
/// account's storage.
///
/// Every slot name is the namespace followed by a fixed suffix; the names
/// are hashed into [`StorageKey`]s by [`Keys`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeySchema {
    /// Prefix shared by every slot name
    pub namespace: String,
}

impl Default for KeySchema {
    fn default() -> Self {
        Self {
            namespace: "ygl_addr_".to_string(),
        }
    }
}

impl KeySchema {
    /// Read a schema from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The storage keys derived from a [`KeySchema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keys {
    namespace: String,
    /// The account's capability set
    pub auth: StorageKey,
    /// The packed parent link
    pub parent: StorageKey,
    /// The number of child slots ever allocated
    pub child_count: StorageKey,
    /// The signed access allowance counter
    pub access_allowance: StorageKey,
}

impl Keys {
    /// The key of child slot `index`.
    pub fn child(&self, index: u64) -> StorageKey {
        StorageKey::named(&format!("{}child_prefix_{index}", self.namespace))
    }
}

impl From<&KeySchema> for Keys {
    fn from(schema: &KeySchema) -> Self {
        let named = |suffix: &str| StorageKey::named(&format!("{}{suffix}", schema.namespace));
        Self {
            namespace: schema.namespace.clone(),
            auth: named("auth"),
            parent: named("parent"),
            child_count: named("child_num"),
            access_allowance: named("can_access_num"),
        }
    }
}

impl Default for Keys {
    fn default() -> Self {
        Self::from(&KeySchema::default())
    }
}
