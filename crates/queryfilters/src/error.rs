use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilterError {
    /// A value of a kind the query-string codec cannot represent.
    ///
    /// `key` is set when the offending value belongs to a named filter
    /// (template construction or `apply`), and `None` for bare codec calls.
    #[error("Type is not supported{}: {kind}", key_suffix(.key))]
    UnsupportedType {
        key: Option<String>,
        kind: &'static str,
    },

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    #[error("Unknown filter key: {0}")]
    UnknownKey(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl FilterError {
    pub(crate) fn unsupported(kind: &'static str) -> Self {
        FilterError::UnsupportedType { key: None, kind }
    }

    /// Attach the filter key to an `UnsupportedType` error that has none yet.
    pub(crate) fn for_key(self, key: &str) -> Self {
        match self {
            FilterError::UnsupportedType { key: None, kind } => FilterError::UnsupportedType {
                key: Some(key.to_string()),
                kind,
            },
            other => other,
        }
    }
}

fn key_suffix(key: &Option<String>) -> String {
    match key {
        Some(key) => format!(" for filter '{}'", key),
        None => String::new(),
    }
}

pub type Result<T> = std::result::Result<T, FilterError>;
