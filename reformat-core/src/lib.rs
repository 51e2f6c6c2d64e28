// Reformat Core Library
//
// Applies an ordered list of pattern/replacement rules to text.
// Earlier rules claim their matches first; later rules only rewrite
// text nobody has claimed.

pub mod types;
pub mod error;
pub mod rules;
pub mod rule_set;
pub mod config;
pub mod storage;

// Re-export main types and functions for easy use
pub use types::*;
pub use error::{BoxError, ReformatError, Result};
pub use rules::{transform, transform_opt, transform_with_report, RuleEngine};
pub use rule_set::RuleSet;
pub use config::{ConfigFormat, RuleSetConfig};
pub use storage::{FileStorage, NoOpStorage, RuleStore, StoredRuleSet};
