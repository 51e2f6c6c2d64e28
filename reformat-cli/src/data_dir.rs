//! Data directory for the CLI
//!
//! Named rule sets live under the user's data directory so they can be
//! reused across invocations. `--store` overrides the location.

use anyhow::{anyhow, Context, Result};
use reformat_core::FileStorage;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "reformat";

/// Resolves and prepares the directory that backs the rule store
pub struct DataDir {
    /// Base directory (e.g., ~/.local/share/reformat)
    root: PathBuf,
}

impl DataDir {
    /// Use the default per-user data directory
    pub fn new() -> Result<Self> {
        Ok(Self {
            root: Self::default_root()?,
        })
    }

    /// Use an explicit directory, as given by `--store`
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `--store` when given, the default directory otherwise
    pub fn resolve(store: Option<&str>) -> Result<Self> {
        match store {
            Some(dir) => Ok(Self::at(dir)),
            None => Self::new(),
        }
    }

    /// ~/.local/share/reformat on macOS/Linux, the local app data folder on Windows
    fn default_root() -> Result<PathBuf> {
        #[cfg(windows)]
        {
            let base = dirs::data_local_dir()
                .ok_or_else(|| anyhow!("Could not determine local data directory"))?;
            Ok(base.join(APP_DIR))
        }

        #[cfg(not(windows))]
        {
            let home = dirs::home_dir().ok_or_else(|| anyhow!("Could not determine home directory"))?;
            Ok(home.join(".local").join("share").join(APP_DIR))
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `FileStorage` keeps its JSON files
    pub fn rulesets_path(&self) -> PathBuf {
        self.root.join("rulesets")
    }

    /// Open the rule store, creating the directory on first use
    pub fn open_store(&self) -> Result<FileStorage> {
        fs::create_dir_all(&self.root)
            .with_context(|| format!("Failed to create data directory {}", self.root.display()))?;
        FileStorage::new(&self.root)
            .with_context(|| format!("Failed to open rule store in {}", self.root.display()))
    }
}
