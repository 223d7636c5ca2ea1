//! # Sync Bridge
//!
//! [`FilterSync`] connects a [`FilterSession`] to a [`ParamStore`].
//!
//! ## Directions
//!
//! - **Session → store** happens only on [`FilterSync::apply`]. Edits in
//!   between stay local; the form and the URL diverge until then.
//! - **Store → session** happens on [`FilterSync::refresh`], when the store's
//!   version moved without us committing (back/forward navigation, a shared
//!   link). The store wins and local edits are discarded.
//!
//! ## Apply
//!
//! Starts from the store's current snapshot, so parameters outside the
//! template survive. Active keys are encoded and set; inactive keys are
//! removed, since an absent parameter means "default". Every value is encoded
//! before anything is written: an encoding error leaves the store untouched.
//!
//! ## Applied View
//!
//! [`FilterSync::applied`] answers "what does the URL currently encode": the
//! active filters decoded back from the store. After applying a string filter
//! set to `"true"`, the applied view holds boolean `true` while the session
//! still holds the string.

use std::cell::RefCell;
use std::rc::Rc;

use crate::codec::{self, DecodeOptions};
use crate::error::Result;
use crate::params;
use crate::session::FilterSession;
use crate::state::AppliedView;
use crate::store::ParamStore;
use crate::template::DefaultTemplate;

pub struct FilterSync<S: ParamStore> {
    session: FilterSession,
    store: S,
    options: DecodeOptions,
    /// Store version last committed or observed by this bridge.
    seen_version: u64,
    /// Session revision at that point, to spot uncommitted edits.
    synced_revision: u64,
    applied: RefCell<Option<(u64, Rc<AppliedView>)>>,
}

impl<S: ParamStore> FilterSync<S> {
    /// Start a session from the store's current parameters.
    pub fn new(template: DefaultTemplate, store: S, options: DecodeOptions) -> Self {
        let session = FilterSession::from_params(template, &store.snapshot(), &options);
        let seen_version = store.version();
        let synced_revision = session.revision();
        Self {
            session,
            store,
            options,
            seen_version,
            synced_revision,
            applied: RefCell::new(None),
        }
    }

    pub fn session(&self) -> &FilterSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut FilterSession {
        &mut self.session
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Whether the session has edits that have not been applied.
    pub fn has_pending_edits(&self) -> bool {
        self.session.revision() != self.synced_revision
    }

    /// Write the session's active filters to the store in one commit.
    /// Returns the store's new version.
    pub fn apply(&mut self) -> Result<u64> {
        let mut params = self.store.snapshot();
        let filters = self.session.filters();

        for (key, value) in filters.iter() {
            if self.session.is_active(key) {
                let text = codec::encode(value).map_err(|e| e.for_key(key))?;
                params.set(key, text);
            } else {
                params.delete(key);
            }
        }

        let version = self.store.commit(params)?;
        self.seen_version = version;
        self.synced_revision = self.session.revision();

        tracing::debug!(
            version,
            active = self.session.active_count(),
            "applied filters to params"
        );
        Ok(version)
    }

    /// Resynchronize the session if the store changed since we last looked.
    ///
    /// Returns `true` when the session was rebuilt from the store.
    pub fn refresh(&mut self) -> bool {
        let version = self.store.version();
        if version == self.seen_version {
            return false;
        }

        if self.has_pending_edits() {
            tracing::warn!(
                version,
                "params changed externally, discarding unapplied filter edits"
            );
        }

        let extracted = params::extract(
            self.session.template(),
            &self.store.snapshot(),
            &self.options,
        );
        self.session.replace(extracted);
        self.seen_version = version;
        self.synced_revision = self.session.revision();

        tracing::debug!(version, "resynced filters from params");
        true
    }

    /// Filters currently encoded in the store, recomputed when its version
    /// changes.
    pub fn applied(&self) -> Rc<AppliedView> {
        let version = self.store.version();
        let mut cache = self.applied.borrow_mut();

        if let Some((cached_version, view)) = cache.as_ref() {
            if *cached_version == version {
                return Rc::clone(view);
            }
        }

        let view = Rc::new(
            params::extract(
                self.session.template(),
                &self.store.snapshot(),
                &self.options,
            )
            .applied(),
        );
        *cache = Some((version, Rc::clone(&view)));
        view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FilterError;
    use crate::store::memory::MemParamStore;
    use crate::test_utils::orders_template;
    use crate::value::{FilterSet, FilterValue};

    fn bridge(query: &str) -> FilterSync<MemParamStore> {
        FilterSync::new(
            orders_template(),
            MemParamStore::from_query(query),
            DecodeOptions::default(),
        )
    }

    #[test]
    fn apply_writes_active_and_removes_inactive() {
        let mut sync = bridge("name=old");
        sync.session_mut().reset_one("name").unwrap();
        sync.session_mut().update("age", 5).unwrap();
        sync.apply().unwrap();

        assert_eq!(sync.store().get("age"), Some("5".to_string()));
        assert_eq!(sync.store().get("name"), None);
    }

    #[test]
    fn apply_keeps_unrelated_params() {
        let mut sync = bridge("page=2&sort=desc");
        sync.session_mut().update("isPaid", true).unwrap();
        sync.apply().unwrap();

        assert_eq!(sync.store().to_query_string(), "page=2&sort=desc&isPaid=true");
    }

    #[test]
    fn apply_encodes_sets() {
        let mut sync = bridge("");
        sync.session_mut()
            .update("statuses", FilterSet::from_iter(["completed", "delivered"]))
            .unwrap();
        sync.apply().unwrap();

        assert_eq!(
            sync.store().get("statuses"),
            Some("{completed,delivered}".to_string())
        );
    }

    #[test]
    fn apply_is_atomic_on_encode_error() {
        let mut sync = bridge("page=2");
        sync.session_mut().update("age", 5).unwrap();
        sync.session_mut()
            .update("name", FilterValue::Undefined)
            .unwrap();

        let err = sync.apply().unwrap_err();
        assert!(matches!(
            err,
            FilterError::UnsupportedType { key: Some(ref key), .. } if key == "name"
        ));
        assert_eq!(sync.store().version(), 0);
        assert_eq!(sync.store().get("age"), None);
        assert!(sync.has_pending_edits());
    }

    #[test]
    fn apply_propagates_store_errors() {
        let mut sync = bridge("");
        sync.session_mut().update("age", 1).unwrap();
        sync.store().set_simulate_write_error(true);

        assert!(matches!(sync.apply(), Err(FilterError::Store(_))));
        assert!(sync.has_pending_edits());
    }

    #[test]
    fn applied_view_tracks_store_not_session() {
        let mut sync = bridge("age=3");
        sync.session_mut().update("age", 9).unwrap();

        assert_eq!(sync.applied().get("age"), Some(&FilterValue::from(3)));

        sync.apply().unwrap();
        assert_eq!(sync.applied().get("age"), Some(&FilterValue::from(9)));
    }

    #[test]
    fn applied_view_is_cached_per_version() {
        let mut sync = bridge("age=3");
        let first = sync.applied();
        assert!(Rc::ptr_eq(&first, &sync.applied()));

        sync.session_mut().update("name", "x").unwrap();
        sync.apply().unwrap();
        assert!(!Rc::ptr_eq(&first, &sync.applied()));
    }

    #[test]
    fn own_apply_does_not_trigger_refresh() {
        let mut sync = bridge("");
        sync.session_mut().update("name", "true").unwrap();
        sync.apply().unwrap();

        assert!(!sync.refresh());
        assert_eq!(sync.session().get("name"), Some(&FilterValue::from("true")));
    }

    #[test]
    fn external_change_resyncs_session() {
        let mut sync = bridge("age=3");
        sync.session_mut().update("name", "draft").unwrap();

        sync.store().set("isPaid", "true").unwrap();
        sync.store().delete("age").unwrap();

        assert!(sync.refresh());
        let session = sync.session();
        assert!(session.is_active("isPaid"));
        assert!(!session.is_active("age"));
        assert!(!session.is_active("name"));
        assert_eq!(session.get("name"), Some(&FilterValue::from("")));
        assert_eq!(session.active_count(), 1);
        assert!(!sync.has_pending_edits());
        assert!(!sync.refresh());
    }
}
