use crate::error::Result;
use crate::types::{Rule, RuleRecord};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

// Default value functions for serde
fn default_name() -> String {
    "default".to_string()
}

/// A named, ordered rule set as it appears in YAML or JSON files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSetConfig {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Rules in priority order, first rule wins on overlap
    #[serde(default)]
    pub rules: Vec<RuleRecord>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
}

impl ConfigFormat {
    /// `.json` files are JSON, everything else is read as YAML.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ConfigFormat::Json,
            _ => ConfigFormat::Yaml,
        }
    }
}

/// Built-in rules: Markdown-style markup to chat-style markup.
pub fn default_rules() -> Vec<RuleRecord> {
    vec![
        RuleRecord::new(r"^#+[ \t]*(.*)$", "*_$1_*").with_description("Heading line"),
        RuleRecord::new(r"\*\*(.+?)\*\*", "*$1*").with_description("Bold"),
        RuleRecord::new(r"__(.+?)__", "_$1_").with_description("Underline to italic"),
        RuleRecord::new(r"~~(.+?)~~", "~$1~").with_description("Strikethrough"),
        RuleRecord::new(r"^[ \t]*[-*][ \t]+", "• ").with_description("Bullet item"),
    ]
}

impl RuleSetConfig {
    pub fn new(name: impl Into<String>, rules: Vec<RuleRecord>) -> Self {
        Self {
            name: name.into(),
            description: None,
            rules,
        }
    }

    pub fn from_str_with_format(content: &str, format: ConfigFormat) -> Result<Self> {
        let config = match format {
            ConfigFormat::Json => serde_json::from_str(content)?,
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
        };
        Ok(config)
    }

    /// Load a rule set from a YAML or JSON file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_str_with_format(&content, ConfigFormat::from_path(path))
    }

    /// Load with fallback to the built-in rules
    pub fn load_with_fallback(path: Option<&str>) -> Self {
        match path {
            Some(p) => Self::load_from_file(p).unwrap_or_else(|e| {
                warn!("failed to load rules from {p}: {e}; using defaults");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    pub fn to_string_with_format(&self, format: ConfigFormat) -> Result<String> {
        let content = match format {
            ConfigFormat::Json => serde_json::to_string_pretty(self)?,
            ConfigFormat::Yaml => serde_yaml::to_string(self)?,
        };
        Ok(content)
    }

    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = self.to_string_with_format(ConfigFormat::from_path(path))?;
        fs::write(path, content)?;
        info!(rule_set = %self.name, path = %path.display(), "rule set saved");
        Ok(())
    }

    /// Rules in engine form, order preserved.
    pub fn to_rules(&self) -> Vec<Rule> {
        self.rules.iter().map(Rule::from).collect()
    }

    /// SHA-256 over the serialized rules (ids and descriptions included).
    pub fn fingerprint(&self) -> Result<String> {
        let rules_json = serde_json::to_string(&self.rules)?;
        let mut hasher = Sha256::new();
        hasher.update(rules_json.as_bytes());
        Ok(format!("{:x}", hasher.finalize()))
    }
}

impl Default for RuleSetConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            description: Some("Markdown-style markup to chat-style markup".to_string()),
            rules: default_rules(),
        }
    }
}
