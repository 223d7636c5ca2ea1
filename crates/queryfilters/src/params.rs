//! Param extraction: turn a parameter snapshot into initial filter state.
//!
//! For every template key, in template order:
//! - a present parameter is decoded and the key becomes active,
//! - an absent parameter leaves the template default, inactive.
//!
//! Parameters outside the template are ignored. Extraction is pure and never
//! fails; defaults were validated when the template was built.

use indexmap::IndexMap;

use crate::codec::{self, DecodeOptions};
use crate::state::{ActiveKeys, AppliedView, FilterState};
use crate::store::QueryParams;
use crate::template::DefaultTemplate;

#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub state: FilterState,
    pub active: ActiveKeys,
}

impl Extracted {
    /// The active subset, i.e. what the parameters actually encode.
    pub fn applied(&self) -> AppliedView {
        AppliedView::from_state(&self.state, &self.active)
    }
}

pub fn extract(
    template: &DefaultTemplate,
    params: &QueryParams,
    options: &DecodeOptions,
) -> Extracted {
    let mut values = IndexMap::with_capacity(template.len());
    let mut active = ActiveKeys::default();

    for (key, default) in template.iter() {
        let value = match params.get(key) {
            Some(text) => {
                active.insert(key);
                codec::decode_for(text, default.kind(), options)
            }
            None => default.clone(),
        };
        values.insert(key.to_string(), value);
    }

    tracing::debug!(
        keys = template.len(),
        active = active.len(),
        "extracted filters from params"
    );

    Extracted {
        state: FilterState::from_values(values),
        active,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::orders_template;
    use crate::value::{FilterSet, FilterValue};

    #[test]
    fn absent_params_keep_defaults() {
        let extracted = extract(
            &orders_template(),
            &QueryParams::new(),
            &DecodeOptions::default(),
        );

        assert!(extracted.active.is_empty());
        assert_eq!(extracted.state.get("name"), Some(&FilterValue::from("")));
        assert_eq!(extracted.state.get("age"), Some(&FilterValue::from(0)));
        assert_eq!(extracted.state.len(), 4);
    }

    #[test]
    fn present_params_decode_and_activate() {
        let params = QueryParams::parse("statuses=%7Bcompleted%2Ccanceled%7D&age=5");
        let extracted = extract(&orders_template(), &params, &DecodeOptions::default());

        assert_eq!(
            extracted.state.get("statuses"),
            Some(&FilterValue::Set(FilterSet::from_iter(["completed", "canceled"])))
        );
        assert_eq!(extracted.state.get("age"), Some(&FilterValue::from(5)));
        assert!(extracted.active.contains("statuses"));
        assert!(extracted.active.contains("age"));
        assert!(!extracted.active.contains("name"));
    }

    #[test]
    fn empty_param_value_is_still_present() {
        let params = QueryParams::parse("name=");
        let extracted = extract(&orders_template(), &params, &DecodeOptions::default());

        assert!(extracted.active.contains("name"));
        assert_eq!(extracted.state.get("name"), Some(&FilterValue::from("")));
    }

    #[test]
    fn unrelated_params_are_ignored() {
        let params = QueryParams::parse("page=2&sort=desc");
        let extracted = extract(&orders_template(), &params, &DecodeOptions::default());

        assert!(extracted.active.is_empty());
        assert!(extracted.state.get("page").is_none());
    }

    #[test]
    fn state_follows_template_order() {
        let params = QueryParams::parse("isPaid=true&name=bob");
        let extracted = extract(&orders_template(), &params, &DecodeOptions::default());

        let keys: Vec<_> = extracted.state.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["name", "age", "isPaid", "statuses"]);
    }

    #[test]
    fn typed_mode_uses_default_kind() {
        let params = QueryParams::parse("name=true");
        let lenient = extract(&orders_template(), &params, &DecodeOptions::default());
        let typed = extract(&orders_template(), &params, &DecodeOptions::typed());

        assert_eq!(lenient.state.get("name"), Some(&FilterValue::Bool(true)));
        assert_eq!(typed.state.get("name"), Some(&FilterValue::from("true")));
    }

    #[test]
    fn applied_contains_only_active_keys() {
        let params = QueryParams::parse("age=5");
        let applied = extract(&orders_template(), &params, &DecodeOptions::default()).applied();

        assert_eq!(applied.len(), 1);
        assert_eq!(applied.get("age"), Some(&FilterValue::from(5)));
        assert!(!applied.contains("name"));
    }
}
