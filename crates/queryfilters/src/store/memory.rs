use super::{ParamStore, QueryParams};
use crate::error::{FilterError, Result};
use std::cell::{Cell, RefCell};

/// In-memory parameter store.
///
/// Uses `RefCell` for interior mutability since a filter session is
/// single-threaded. This keeps `ParamStore` methods on `&self` without
/// paying for a lock.
#[derive(Default)]
pub struct MemParamStore {
    params: RefCell<QueryParams>,
    version: Cell<u64>,
    simulate_write_error: Cell<bool>,
}

impl MemParamStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing query string, e.g. `"?age=5&page=2"`.
    pub fn from_query(query: &str) -> Self {
        Self::with_params(QueryParams::parse(query))
    }

    pub fn with_params(params: QueryParams) -> Self {
        Self {
            params: RefCell::new(params),
            ..Self::default()
        }
    }

    /// Enable write error simulation for testing error handling.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    pub fn to_query_string(&self) -> String {
        self.params.borrow().to_query_string()
    }
}

impl ParamStore for MemParamStore {
    fn snapshot(&self) -> QueryParams {
        self.params.borrow().clone()
    }

    fn commit(&self, params: QueryParams) -> Result<u64> {
        if self.simulate_write_error.get() {
            return Err(FilterError::Store("Simulated write error".to_string()));
        }
        *self.params.borrow_mut() = params;
        let version = self.version.get() + 1;
        self.version.set(version);
        Ok(version)
    }

    fn version(&self) -> u64 {
        self.version.get()
    }
}
