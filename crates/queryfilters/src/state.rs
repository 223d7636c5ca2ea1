//! Snapshot types shared by the session and the sync bridge.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;

use crate::value::FilterValue;

/// Current value of every filter in a template, in template order.
///
/// Always holds exactly the template's keys. Sessions never edit a
/// `FilterState` in place: each mutation builds a new one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FilterState {
    values: IndexMap<String, FilterValue>,
}

impl FilterState {
    pub(crate) fn from_values(values: IndexMap<String, FilterValue>) -> Self {
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy with one value replaced. `key` must already be present.
    pub(crate) fn with_value(&self, key: &str, value: FilterValue) -> Self {
        let mut values = self.values.clone();
        if let Some(slot) = values.get_mut(key) {
            *slot = value;
        }
        Self { values }
    }
}

/// Keys whose filters hold a user-supplied value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveKeys(IndexSet<String>);

impl ActiveKeys {
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub(crate) fn insert(&mut self, key: &str) {
        if !self.0.contains(key) {
            self.0.insert(key.to_string());
        }
    }

    pub(crate) fn remove(&mut self, key: &str) {
        self.0.shift_remove(key);
    }

    pub(crate) fn clear(&mut self) {
        self.0.clear();
    }
}

/// Filters currently encoded in the parameter store: the active subset of
/// the state decoded from it. Read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AppliedView {
    values: IndexMap<String, FilterValue>,
}

impl AppliedView {
    pub(crate) fn from_state(state: &FilterState, active: &ActiveKeys) -> Self {
        let values = state
            .iter()
            .filter(|(key, _)| active.contains(key))
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect();
        Self { values }
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FilterValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
