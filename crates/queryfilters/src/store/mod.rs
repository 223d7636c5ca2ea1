//! # Parameter Stores
//!
//! The query string is owned by the embedding environment (a browser URL, a
//! router, a test harness). This module defines the [`ParamStore`] trait the
//! rest of the crate talks to, plus the [`QueryParams`] snapshot type.
//!
//! ## Contract
//!
//! - The store is the only durable state. Filter sessions persist nothing.
//! - Every write is a whole-snapshot replace through [`ParamStore::commit`].
//!   `set` and `delete` are conveniences built on top of it.
//! - Every commit (and every external change) yields a new version number,
//!   so consumers can tell when they need to re-derive state.
//!
//! ## Implementations
//!
//! - [`memory::MemParamStore`]: in-memory, for tests and headless use.
//! - [`url_store::UrlParamStore`]: backed by a [`url::Url`], rewriting its query.
//!
//! All methods take `&self`. Implementations are single-threaded and use
//! interior mutability, like the rest of the filter session.

use crate::error::Result;

pub mod memory;
pub mod url_store;

/// Ordered list of query parameter pairs.
///
/// Keys may repeat (`tag=a&tag=b`); every pair is kept in order, so
/// parameters this crate does not own survive a round trip untouched.
/// Values are stored decoded; percent-encoding only happens at the URL
/// boundary ([`QueryParams::parse`] and [`QueryParams::to_query_string`]).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `a=1&b=2`, with or without a leading `?`.
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self::from_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.pairs
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    /// Set a value, replacing every existing pair for `key`. The first
    /// existing pair keeps its position; a new key goes at the end.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();

        match self.pairs.iter().position(|(k, _)| *k == key) {
            Some(first) => {
                self.pairs[first].1 = value;
                let mut index = 0;
                self.pairs.retain(|(k, _)| {
                    let keep = index <= first || *k != key;
                    index += 1;
                    keep
                });
            }
            None => self.pairs.push((key, value)),
        }
    }

    /// Add a pair at the end, even if `key` is already present.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    /// Remove every pair for `key`, keeping the order of the others.
    /// Returns the first removed value.
    pub fn delete(&mut self, key: &str) -> Option<String> {
        let first = self.get(key).map(str::to_string);
        self.pairs.retain(|(k, _)| k != key);
        first
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs, counting repeated keys.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Serialize as `application/x-www-form-urlencoded`, without a leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

/// Abstract interface for the external store of query parameters.
pub trait ParamStore {
    /// Current snapshot of all parameters.
    fn snapshot(&self) -> QueryParams;

    /// Replace all parameters at once. Returns the new version.
    ///
    /// MUST be atomic: either the whole snapshot is visible afterwards, or
    /// (on error) nothing changed.
    fn commit(&self, params: QueryParams) -> Result<u64>;

    /// Version of the current snapshot. Increases on every change.
    fn version(&self) -> u64;

    fn get(&self, key: &str) -> Option<String> {
        self.snapshot().get(key).map(str::to_string)
    }

    fn set(&self, key: &str, value: &str) -> Result<u64> {
        let mut params = self.snapshot();
        params.set(key, value);
        self.commit(params)
    }

    fn delete(&self, key: &str) -> Result<u64> {
        let mut params = self.snapshot();
        params.delete(key);
        self.commit(params)
    }
}
