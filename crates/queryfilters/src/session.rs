//! # Filter Sessions
//!
//! A [`FilterSession`] owns the state of one filter UI: the immutable
//! default template, the current values, and which keys the user has
//! touched. Create one per independent filter UI; sessions share nothing.
//!
//! ## Snapshots
//!
//! Current values are exposed as `Rc<FilterState>`. Every mutation swaps in
//! a new snapshot, so a reader holding the previous `Rc` can detect change
//! with [`Rc::ptr_eq`] instead of comparing values.
//!
//! ## Active Keys
//!
//! A key is active exactly when its value came from the user
//! ([`FilterSession::update`]) or from a present parameter, and stops being
//! active when reset. Activity is independent of the value: updating a key
//! to its default still marks it active.
//!
//! ## Unknown Keys
//!
//! `update` and `reset_one` reject keys outside the template with
//! [`FilterError::UnknownKey`] and leave the session untouched.

use std::rc::Rc;

use crate::codec::DecodeOptions;
use crate::error::{FilterError, Result};
use crate::params::{self, Extracted};
use crate::state::{ActiveKeys, FilterState};
use crate::store::QueryParams;
use crate::template::DefaultTemplate;
use crate::value::FilterValue;

#[derive(Debug)]
pub struct FilterSession {
    template: DefaultTemplate,
    state: Rc<FilterState>,
    active: ActiveKeys,
    revision: u64,
}

impl FilterSession {
    /// A session with every filter at its default and nothing active.
    pub fn new(template: DefaultTemplate) -> Self {
        let state = defaults_of(&template);
        Self {
            template,
            state: Rc::new(state),
            active: ActiveKeys::default(),
            revision: 0,
        }
    }

    /// A session initialized from a parameter snapshot.
    pub fn from_params(
        template: DefaultTemplate,
        params: &QueryParams,
        options: &DecodeOptions,
    ) -> Self {
        let Extracted { state, active } = params::extract(&template, params, options);
        Self {
            template,
            state: Rc::new(state),
            active,
            revision: 0,
        }
    }

    pub fn template(&self) -> &DefaultTemplate {
        &self.template
    }

    /// The current snapshot.
    pub fn filters(&self) -> Rc<FilterState> {
        Rc::clone(&self.state)
    }

    pub fn get(&self, key: &str) -> Option<&FilterValue> {
        self.state.get(key)
    }

    /// Set a filter's value and mark it active.
    ///
    /// The value's kind is not checked against the default; a kind the codec
    /// cannot encode surfaces when the session is applied.
    pub fn update(&mut self, key: &str, value: impl Into<FilterValue>) -> Result<()> {
        self.ensure_known(key)?;
        let next = self.state.with_value(key, value.into());
        self.active.insert(key);
        self.commit(next);
        Ok(())
    }

    /// Restore one filter to its default and mark it inactive.
    pub fn reset_one(&mut self, key: &str) -> Result<()> {
        let default = self
            .template
            .get(key)
            .cloned()
            .ok_or_else(|| FilterError::UnknownKey(key.to_string()))?;
        let next = self.state.with_value(key, default);
        self.active.remove(key);
        self.commit(next);
        Ok(())
    }

    /// Restore every filter to its default and clear the active set.
    pub fn reset_all(&mut self) {
        let next = defaults_of(&self.template);
        self.active.clear();
        self.commit(next);
    }

    /// `false` for keys outside the template.
    pub fn is_active(&self, key: &str) -> bool {
        self.active.contains(key)
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn active_keys(&self) -> &ActiveKeys {
        &self.active
    }

    /// Number of mutations since the session was created.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Replace values and active keys wholesale, e.g. after the parameter
    /// store changed underneath the session.
    pub(crate) fn replace(&mut self, extracted: Extracted) {
        self.active = extracted.active;
        self.commit(extracted.state);
    }

    fn ensure_known(&self, key: &str) -> Result<()> {
        if self.template.contains(key) {
            Ok(())
        } else {
            Err(FilterError::UnknownKey(key.to_string()))
        }
    }

    fn commit(&mut self, next: FilterState) {
        self.state = Rc::new(next);
        self.revision += 1;
    }
}

fn defaults_of(template: &DefaultTemplate) -> FilterState {
    FilterState::from_values(
        template
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::orders_template;
    use crate::value::FilterSet;

    fn session() -> FilterSession {
        FilterSession::new(orders_template())
    }

    fn assert_count_matches(session: &FilterSession) {
        let counted = session
            .template()
            .keys()
            .filter(|key| session.is_active(key))
            .count();
        assert_eq!(session.active_count(), counted);
        assert!(session.active_count() <= session.template().len());
    }

    #[test]
    fn new_session_is_all_defaults() {
        let session = session();
        assert_eq!(session.active_count(), 0);
        assert_eq!(session.get("isPaid"), Some(&FilterValue::Bool(false)));
        assert_eq!(session.filters().len(), 4);
    }

    #[test]
    fn update_marks_key_active() {
        let mut session = session();
        session.update("age", 5).unwrap();

        assert!(session.is_active("age"));
        assert!(!session.is_active("name"));
        assert_eq!(session.active_count(), 1);
        assert_eq!(session.get("age"), Some(&FilterValue::from(5)));
        assert_count_matches(&session);
    }

    #[test]
    fn update_to_default_value_still_activates() {
        let mut session = session();
        session.update("age", 0).unwrap();
        assert!(session.is_active("age"));
    }

    #[test]
    fn update_does_not_check_kind() {
        let mut session = session();
        session.update("age", "not a number").unwrap();
        assert_eq!(session.get("age"), Some(&FilterValue::from("not a number")));
    }

    #[test]
    fn update_same_key_twice_counts_once() {
        let mut session = session();
        session.update("name", "a").unwrap();
        session.update("name", "b").unwrap();
        assert_eq!(session.active_count(), 1);
        assert_eq!(session.get("name"), Some(&FilterValue::from("b")));
    }

    #[test]
    fn reset_one_restores_default() {
        let mut session = session();
        session.update("age", 5).unwrap();
        session.reset_one("age").unwrap();

        assert_eq!(session.get("age"), Some(&FilterValue::from(0)));
        assert!(!session.is_active("age"));
        assert_count_matches(&session);
    }

    #[test]
    fn reset_all_is_idempotent() {
        let mut session = session();
        session.update("age", 5).unwrap();
        session
            .update("statuses", FilterSet::from_iter(["completed"]))
            .unwrap();

        session.reset_all();
        let first = session.filters();
        assert_eq!(session.active_count(), 0);

        session.reset_all();
        assert_eq!(*session.filters(), *first);
        assert_eq!(session.active_count(), 0);
    }

    #[test]
    fn unknown_key_is_rejected_without_change() {
        let mut session = session();
        let before = session.filters();

        assert!(matches!(
            session.update("color", "red"),
            Err(FilterError::UnknownKey(key)) if key == "color"
        ));
        assert!(matches!(
            session.reset_one("color"),
            Err(FilterError::UnknownKey(_))
        ));

        assert!(Rc::ptr_eq(&before, &session.filters()));
        assert_eq!(session.revision(), 0);
        assert!(!session.is_active("color"));
    }

    #[test]
    fn mutations_produce_new_snapshots() {
        let mut session = session();
        let before = session.filters();

        session.update("name", "bob").unwrap();
        let after = session.filters();

        assert!(!Rc::ptr_eq(&before, &after));
        assert_eq!(before.get("name"), Some(&FilterValue::from("")));
        assert_eq!(after.get("name"), Some(&FilterValue::from("bob")));
        assert_eq!(session.revision(), 1);
    }

    #[test]
    fn from_params_activates_present_keys() {
        let params = QueryParams::parse("isPaid=true");
        let session =
            FilterSession::from_params(orders_template(), &params, &DecodeOptions::default());

        assert!(session.is_active("isPaid"));
        assert_eq!(session.get("isPaid"), Some(&FilterValue::Bool(true)));
        assert_eq!(session.revision(), 0);
    }
}
