//! # queryfilters
//!
//! Keeps a set of named UI filters addressable in a shareable URL, and tracks
//! which filters the user has touched versus which still sit at their
//! defaults.
//!
//! ## Layers
//!
//! - [`codec`]: value ↔ query-string text, no state.
//! - [`params`]: template + parameter snapshot → initial values and active keys.
//! - [`session`]: current values, active keys, update/reset operations.
//! - [`sync`]: flushes a session into a [`store::ParamStore`] and derives the
//!   applied view back from it.
//!
//! ## Usage
//!
//! ```
//! use queryfilters::{DecodeOptions, DefaultTemplate, FilterSet, FilterSync};
//! use queryfilters::store::memory::MemParamStore;
//!
//! let template = DefaultTemplate::builder()
//!     .with("name", "")
//!     .with("age", 0)
//!     .with("statuses", FilterSet::new())
//!     .build();
//!
//! let store = MemParamStore::from_query("page=2");
//! let mut filters = FilterSync::new(template, store, DecodeOptions::default());
//!
//! filters.session_mut().update("age", 5)?;
//! assert!(filters.session().is_active("age"));
//!
//! filters.apply()?;
//! assert_eq!(filters.store().to_query_string(), "page=2&age=5");
//! # Ok::<(), queryfilters::FilterError>(())
//! ```
//!
//! Everything is single-threaded and synchronous: operations run in call
//! order and complete before returning.

pub mod codec;
pub mod config;
pub mod error;
pub mod params;
pub mod session;
pub mod state;
pub mod store;
pub mod sync;
pub mod template;
pub mod value;

#[cfg(any(test, feature = "test_utils"))]
pub mod test_utils;

pub use codec::{decode, encode, DecodeMode, DecodeOptions};
pub use config::FilterConfig;
pub use error::{FilterError, Result};
pub use session::FilterSession;
pub use state::{ActiveKeys, AppliedView, FilterState};
pub use sync::FilterSync;
pub use template::DefaultTemplate;
pub use value::{FilterKind, FilterSet, FilterValue, Number, Scalar};
