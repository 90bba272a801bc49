//! Run-level configuration

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::identity::TestIdentity;

pub const THRESHOLD_KEY: &str = "playwright_visual_snapshot_threshold";
pub const FAILURE_DIRECTORY_KEY: &str = "playwright_visual_failure_directory";
pub const DEFAULT_THRESHOLD: &str = "0.1";

/// Settings shared by every snapshot check in one test run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunConfig {
    /// Overwrite baselines instead of comparing
    pub update_snapshots: bool,

    /// Raw key/value settings, as read from the settings file
    pub settings: BTreeMap<String, String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SettingValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl SettingValue {
    fn into_string(self) -> String {
        match self {
            SettingValue::String(s) => s,
            SettingValue::Integer(i) => i.to_string(),
            SettingValue::Float(f) => f.to_string(),
            SettingValue::Boolean(b) => b.to_string(),
        }
    }
}

impl RunConfig {
    /// Load settings from a TOML file of top-level scalar keys.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = Self::from_toml(&content)?;
            debug!("Loaded {} setting(s) from {}", config.settings.len(), path.display());
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: BTreeMap<String, SettingValue> = toml::from_str(content)?;
        Ok(Self {
            update_snapshots: false,
            settings: raw.into_iter().map(|(k, v)| (k, v.into_string())).collect(),
        })
    }

    pub fn with_update_snapshots(mut self, update: bool) -> Self {
        self.update_snapshots = update;
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Run-level threshold, defaulting to 0.1
    pub fn threshold(&self) -> Result<f64> {
        let raw = self.get(THRESHOLD_KEY).unwrap_or(DEFAULT_THRESHOLD);
        raw.trim().parse::<f64>().map_err(|e| {
            Error::InvalidConfig(format!("{} = {:?}: {}", THRESHOLD_KEY, raw, e))
        })
    }

    pub fn failure_directory(&self) -> Option<PathBuf> {
        self.get(FAILURE_DIRECTORY_KEY).map(PathBuf::from)
    }

    /// Per-call threshold if given, else the run-level one
    pub fn resolve_threshold(&self, threshold: Option<f64>) -> Result<f64> {
        match threshold {
            Some(threshold) => Ok(threshold),
            None => self.threshold(),
        }
    }

    /// Configured failure root, else the test file's own directory
    pub fn resolve_failure_root(&self, identity: &TestIdentity) -> PathBuf {
        self.failure_directory()
            .unwrap_or_else(|| identity.test_dir())
    }
}
