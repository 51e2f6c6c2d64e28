use thiserror::Error;

/// Boxed error returned by computed replacement callbacks.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T> = std::result::Result<T, ReformatError>;

#[derive(Debug, Error)]
pub enum ReformatError {
    #[error("rule has an empty pattern")]
    EmptyPattern,

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("replacement callback failed: {message}")]
    Callback { message: String },

    #[error("unknown rule id: {0}")]
    UnknownRule(String),

    #[error("invalid rule set name '{0}' (allowed: letters, digits, '-', '_')")]
    InvalidName(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
