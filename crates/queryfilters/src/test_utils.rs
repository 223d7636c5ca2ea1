use crate::template::DefaultTemplate;
use crate::value::FilterSet;

/// The order-list filters used throughout the tests: a text search, a
/// numeric filter, a flag and a multi-select.
pub fn orders_template() -> DefaultTemplate {
    DefaultTemplate::builder()
        .with("name", "")
        .with("age", 0)
        .with("isPaid", false)
        .with("statuses", FilterSet::new())
        .build()
}
