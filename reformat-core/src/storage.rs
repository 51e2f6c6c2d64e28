use crate::config::RuleSetConfig;
use crate::error::{ReformatError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A rule set as persisted, with save metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredRuleSet {
    pub config: RuleSetConfig,
    pub saved_at: DateTime<Utc>,
    /// `RuleSetConfig::fingerprint` at save time
    pub fingerprint: String,
}

impl StoredRuleSet {
    pub fn new(config: RuleSetConfig) -> Result<Self> {
        let fingerprint = config.fingerprint()?;
        Ok(Self {
            config,
            saved_at: Utc::now(),
            fingerprint,
        })
    }

    /// False when the rules were changed after the fingerprint was taken.
    pub fn is_intact(&self) -> bool {
        self.config
            .fingerprint()
            .map(|current| current == self.fingerprint)
            .unwrap_or(false)
    }
}

/// Storage abstraction for named rule sets
pub trait RuleStore {
    fn load(&self, name: &str) -> Result<Option<StoredRuleSet>>;
    fn save(&self, name: &str, config: &RuleSetConfig) -> Result<()>;
    fn remove(&self, name: &str) -> Result<()>;
    fn list(&self) -> Result<Vec<String>>;
}

/// Rule-set names double as file names.
pub fn validate_name(name: &str) -> Result<()> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(ReformatError::InvalidName(name.to_string()))
    }
}

/// File-based storage: one JSON file per rule set under `<dir>/rulesets`
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    pub fn new(dir: impl AsRef<Path>) -> Result<Self> {
        let root = dir.as_ref().join("rulesets");
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn rule_set_path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }
}

impl RuleStore for FileStorage {
    fn load(&self, name: &str) -> Result<Option<StoredRuleSet>> {
        validate_name(name)?;
        let path = self.rule_set_path(name);
        if !path.exists() {
            return Ok(None);
        }
        let json_str = fs::read_to_string(&path)?;
        let stored: StoredRuleSet = serde_json::from_str(&json_str)?;
        debug!(rule_set = name, rules = stored.config.rules.len(), "rule set loaded");
        Ok(Some(stored))
    }

    fn save(&self, name: &str, config: &RuleSetConfig) -> Result<()> {
        validate_name(name)?;
        let stored = StoredRuleSet::new(config.clone())?;
        let json_str = serde_json::to_string_pretty(&stored)?;
        fs::write(self.rule_set_path(name), json_str)?;
        debug!(rule_set = name, fingerprint = %stored.fingerprint, "rule set stored");
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<()> {
        validate_name(name)?;
        let path = self.rule_set_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = fs::read_dir(&self.root)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("json"))
            .filter_map(|path| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();
        Ok(names)
    }
}

/// No-op storage implementation that disables persistence
pub struct NoOpStorage;

impl Default for NoOpStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl NoOpStorage {
    pub fn new() -> Self {
        Self
    }
}

impl RuleStore for NoOpStorage {
    fn load(&self, _name: &str) -> Result<Option<StoredRuleSet>> {
        Ok(None)
    }

    fn save(&self, _name: &str, _config: &RuleSetConfig) -> Result<()> {
        Ok(())
    }

    fn remove(&self, _name: &str) -> Result<()> {
        Ok(())
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
