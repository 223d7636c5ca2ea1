//! Default templates.
//!
//! A [`DefaultTemplate`] is the fixed, ordered list of filter keys and their
//! default values. It defines the key universe of a filter session and, per
//! key, the kind used by typed decoding. It is never mutated after
//! construction.

use indexmap::IndexMap;

use crate::error::{FilterError, Result};
use crate::value::{FilterKind, FilterValue};

#[derive(Debug, Clone, PartialEq)]
pub struct DefaultTemplate {
    entries: IndexMap<String, FilterValue>,
}

impl DefaultTemplate {
    pub fn builder() -> TemplateBuilder {
        TemplateBuilder::default()
    }

    /// Build a template from a JSON object, keeping the object's key order.
    ///
    /// Fails with `UnsupportedType` naming the key if a default is an
    /// object or a nested array. Fails with
    /// `InvalidTemplate` if `json` itself is not an object.
    pub fn from_json(json: serde_json::Value) -> Result<Self> {
        let serde_json::Value::Object(map) = json else {
            return Err(FilterError::InvalidTemplate("expected a JSON object".to_string()));
        };

        let mut entries = IndexMap::with_capacity(map.len());
        for (key, raw) in map {
            let value = FilterValue::try_from(raw).map_err(|e| e.for_key(&key))?;
            entries.insert(key, value);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.entries.get(key)
    }

    pub fn kind_of(&self, key: &str) -> Option<FilterKind> {
        self.entries.get(key).map(FilterValue::kind)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Entries in template order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`DefaultTemplate`].
///
/// Re-adding a key replaces its default but keeps its original position.
#[derive(Debug, Default)]
pub struct TemplateBuilder {
    entries: IndexMap<String, FilterValue>,
}

impl TemplateBuilder {
    pub fn with(mut self, key: impl Into<String>, default: impl Into<FilterValue>) -> Self {
        self.entries.insert(key.into(), default.into());
        self
    }

    pub fn build(self) -> DefaultTemplate {
        DefaultTemplate {
            entries: self.entries,
        }
    }
}
