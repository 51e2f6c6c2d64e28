use crate::error::{BoxError, ReformatError, Result};
use crate::rules::template;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

// ===== RULE MODEL =====
// A Rule is what the engine consumes. RuleRecord is what gets stored,
// edited and exchanged; it always carries a template replacement.

/// Signature of a computed replacement.
///
/// Receives the full matched text and one entry per capture group
/// (`None` when the group did not participate in the match).
pub type ReplaceFn =
    dyn Fn(&str, &[Option<&str>]) -> std::result::Result<String, BoxError> + Send + Sync;

/// Pattern of a rule: source text or an already compiled regex.
///
/// Matching flags are never stored here. The engine derives them from the
/// source text on every call and always builds its own regex, so a
/// `Compiled` value owned by the caller is never altered.
#[derive(Debug, Clone)]
pub enum Pattern {
    Source(String),
    Compiled(Regex),
}

impl Pattern {
    pub fn source(&self) -> &str {
        match self {
            Pattern::Source(source) => source,
            Pattern::Compiled(regex) => regex.as_str(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.source().is_empty()
    }
}

impl From<&str> for Pattern {
    fn from(source: &str) -> Self {
        Pattern::Source(source.to_string())
    }
}

impl From<String> for Pattern {
    fn from(source: String) -> Self {
        Pattern::Source(source)
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Pattern::Compiled(regex)
    }
}

#[derive(Clone)]
pub enum Replacement {
    /// Literal text with `$1`, `$2`, ... backreferences
    Template(String),
    /// Callback invoked once per claimed match
    Computed(Arc<ReplaceFn>),
}

impl Replacement {
    pub fn computed<F>(callback: F) -> Self
    where
        F: Fn(&str, &[Option<&str>]) -> std::result::Result<String, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Replacement::Computed(Arc::new(callback))
    }

    /// Produce the final replacement text for one match.
    pub fn resolve(&self, matched: &str, groups: &[Option<&str>]) -> Result<String> {
        match self {
            Replacement::Template(text) => Ok(template::expand(text, groups)),
            Replacement::Computed(callback) => {
                callback(matched, groups).map_err(|e| ReformatError::Callback {
                    message: e.to_string(),
                })
            }
        }
    }
}

impl fmt::Debug for Replacement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacement::Template(text) => f.debug_tuple("Template").field(text).finish(),
            Replacement::Computed(_) => f.write_str("Computed(<callback>)"),
        }
    }
}

impl From<&str> for Replacement {
    fn from(text: &str) -> Self {
        Replacement::Template(text.to_string())
    }
}

impl From<String> for Replacement {
    fn from(text: String) -> Self {
        Replacement::Template(text)
    }
}

#[derive(Debug, Clone)]
pub struct Rule {
    /// List identity only, the engine never reads it
    pub id: Option<String>,
    /// `None` models a rule whose pattern is missing; such rules are skipped
    pub pattern: Option<Pattern>,
    pub replacement: Replacement,
    /// Display only
    pub description: Option<String>,
}

impl Rule {
    pub fn new(pattern: impl Into<Pattern>, replacement: impl Into<Replacement>) -> Self {
        Self {
            id: None,
            pattern: Some(pattern.into()),
            replacement: replacement.into(),
            description: None,
        }
    }

    pub fn computed<F>(pattern: impl Into<Pattern>, callback: F) -> Self
    where
        F: Fn(&str, &[Option<&str>]) -> std::result::Result<String, BoxError>
            + Send
            + Sync
            + 'static,
    {
        Self::new(pattern, Replacement::computed(callback))
    }

    /// A rule with no pattern at all.
    pub fn without_pattern(replacement: impl Into<Replacement>) -> Self {
        Self {
            id: None,
            pattern: None,
            replacement: replacement.into(),
            description: None,
        }
    }
}

impl From<RuleRecord> for Rule {
    fn from(record: RuleRecord) -> Self {
        Self {
            id: record.id,
            pattern: Some(Pattern::Source(record.pattern)),
            replacement: Replacement::Template(record.replacement),
            description: record.description,
        }
    }
}

impl From<&RuleRecord> for Rule {
    fn from(record: &RuleRecord) -> Self {
        Rule::from(record.clone())
    }
}

/// Interchange form of a rule: `{ id?, pattern, replacement, description? }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl RuleRecord {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            id: None,
            pattern: pattern.into(),
            replacement: replacement.into(),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

// ===== ENGINE OUTPUT TYPES =====

/// A span of the original text claimed by one rule.
///
/// Offsets are byte offsets into the input, half-open `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claim {
    pub rule_index: usize,
    pub original: String,
    pub replacement: String,
    pub start: usize,
    pub end: usize,
}

impl Claim {
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// A rule the engine could not apply during one call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRule {
    pub rule_index: usize,
    pub pattern: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransformReport {
    pub output: String,
    /// Accepted claims ordered by `start`
    pub claims: Vec<Claim>,
    pub skipped: Vec<SkippedRule>,
    pub elapsed_micros: u64,
}

impl TransformReport {
    pub fn passthrough(text: &str) -> Self {
        Self {
            output: text.to_string(),
            claims: Vec::new(),
            skipped: Vec::new(),
            elapsed_micros: 0,
        }
    }

    pub fn changed(&self) -> bool {
        !self.claims.is_empty()
    }
}
