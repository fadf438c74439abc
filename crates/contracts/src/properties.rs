//! VoiceProperties - opaque rendering hints carried with a packet
//!
//! The dispatch stage never interprets these; they ride along verbatim for the
//! client-side audio renderer (spatial position, effect flags, and so on).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Extensible option bag attached to an outbound voice packet.
///
/// Keys are hint names, values are arbitrary JSON. An empty bag is the
/// default and means "no special rendering rules".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoiceProperties(BTreeMap<String, serde_json::Value>);

impl VoiceProperties {
    /// The empty sentinel: no rendering hints.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    ///
    /// ```
    /// use contracts::VoiceProperties;
    ///
    /// let props = VoiceProperties::empty()
    ///     .with("spatial", serde_json::json!(true))
    ///     .with("reverb", serde_json::json!("cave"));
    /// assert!(!props.is_empty());
    /// ```
    pub fn with(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Look up a hint by name.
    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    /// True when no hints are set.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of hints.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate over all hints.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_is_default() {
        assert_eq!(VoiceProperties::empty(), VoiceProperties::default());
        assert!(VoiceProperties::empty().is_empty());
    }

    #[test]
    fn test_with_builder() {
        let props = VoiceProperties::empty()
            .with("spatial", serde_json::json!(true))
            .with("distance", serde_json::json!(12.5));

        assert_eq!(props.len(), 2);
        assert_eq!(props.get("spatial"), Some(&serde_json::json!(true)));
        assert_eq!(props.get("missing"), None);
    }

    #[test]
    fn test_serde_transparent() {
        let props = VoiceProperties::empty().with("muffled", serde_json::json!(true));
        let json = serde_json::to_string(&props).unwrap();
        assert_eq!(json, r#"{"muffled":true}"#);

        let parsed: VoiceProperties = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, props);
    }
}
