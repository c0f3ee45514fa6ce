//! Report viewer configuration.
//!
//! Selects how mapping payloads are acquired (embedded in the report or
//! fetched by manifest path), where the classification dataset lives and
//! how parenthesized table values are read. Load from environment
//! variables or from a YAML file.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use rrmap_classify::ClassificationSource;
use rrmap_core::{FetchFailure, FsFetcher};
use rrmap_reconcile::{ParenthesesPolicy, ReconcileOptions};

use crate::source::SnapshotSource;

/// How mapping payloads reach the viewer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataMode {
    /// Every payload is embedded in the report.
    #[default]
    Embedded,
    /// Payload paths come from a manifest and are fetched on selection.
    Manifest,
}

/// Configuration of one open report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportConfig {
    /// Payload acquisition strategy.
    #[serde(default)]
    pub data_mode: DataMode,
    /// Manifest file. Required in manifest mode.
    #[serde(default)]
    pub manifest_path: Option<String>,
    /// Classification dataset file, if the report has one.
    #[serde(default)]
    pub classification_path: Option<String>,
    /// Directory relative paths are resolved against.
    #[serde(default)]
    pub base_dir: Option<PathBuf>,
    /// Reading of parenthesized values.
    #[serde(default)]
    pub parentheses: ParenthesesPolicy,
}

impl ReportConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `RRMAP_DATA_MODE` (`embedded` | `manifest`, default: `embedded`)
    /// - `RRMAP_MANIFEST_PATH` (required in manifest mode)
    /// - `RRMAP_CLASSIFICATION_FILE` (optional)
    /// - `RRMAP_BASE_DIR` (optional)
    /// - `RRMAP_PARENTHESES` (`negative` | `ignore`, default: `negative`)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration from any variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let data_mode = match var("RRMAP_DATA_MODE").as_deref() {
            None | Some("embedded") => DataMode::Embedded,
            Some("manifest") => DataMode::Manifest,
            Some(other) => return Err(ConfigError::InvalidValue("RRMAP_DATA_MODE".into(), other.into())),
        };
        let parentheses = match var("RRMAP_PARENTHESES").as_deref() {
            None | Some("negative") => ParenthesesPolicy::Negative,
            Some("ignore") => ParenthesesPolicy::Ignore,
            Some(other) => return Err(ConfigError::InvalidValue("RRMAP_PARENTHESES".into(), other.into())),
        };

        let config = Self {
            data_mode,
            manifest_path: var("RRMAP_MANIFEST_PATH"),
            classification_path: var("RRMAP_CLASSIFICATION_FILE"),
            base_dir: var("RRMAP_BASE_DIR").map(PathBuf::from),
            parentheses,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e.to_string()))?;
        Self::from_yaml(&text)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.data_mode == DataMode::Manifest && self.manifest_path.is_none() {
            return Err(ConfigError::MissingManifestPath);
        }
        Ok(())
    }

    /// Filesystem fetcher rooted at `base_dir`.
    pub fn fetcher(&self) -> FsFetcher {
        match &self.base_dir {
            Some(dir) => FsFetcher::with_base_dir(dir),
            None => FsFetcher::new(),
        }
    }

    /// Snapshot source for this configuration. `embedded` supplies the
    /// report's embedded maps and is only consulted in embedded mode.
    pub fn snapshot_source(&self, embedded: impl FnOnce() -> SnapshotSource) -> Result<SnapshotSource, FetchFailure> {
        match (&self.data_mode, &self.manifest_path) {
            (DataMode::Manifest, Some(path)) => SnapshotSource::manifest_from(Box::new(self.fetcher()), path),
            (DataMode::Manifest, None) => Err(FetchFailure::new("<manifest>", "no manifest path configured")),
            (DataMode::Embedded, _) => Ok(embedded()),
        }
    }

    /// Where the classification dataset comes from.
    pub fn classification_source(&self) -> ClassificationSource {
        match &self.classification_path {
            Some(path) => ClassificationSource::File(path.clone()),
            None => ClassificationSource::None,
        }
    }

    /// Reconciliation options derived from the configuration.
    pub fn reconcile_options(&self) -> ReconcileOptions {
        ReconcileOptions {
            parentheses: self.parentheses,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("manifest mode requires RRMAP_MANIFEST_PATH (or manifest_path)")]
    MissingManifestPath,
    #[error("invalid value for {0}: '{1}'")]
    InvalidValue(String, String),
    #[error("cannot read config file {0}: {1}")]
    Read(String, String),
    #[error("invalid YAML configuration: {0}")]
    Yaml(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_nothing_set() {
        let cfg = ReportConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, ReportConfig::default());
        assert!(matches!(cfg.classification_source(), ClassificationSource::None));
    }

    #[test]
    fn manifest_mode_from_variables() {
        let cfg = ReportConfig::from_lookup(lookup(&[
            ("RRMAP_DATA_MODE", "manifest"),
            ("RRMAP_MANIFEST_PATH", "maps/manifest.json"),
            ("RRMAP_CLASSIFICATION_FILE", "classify.json"),
            ("RRMAP_PARENTHESES", "ignore"),
        ]))
        .unwrap();
        assert_eq!(cfg.data_mode, DataMode::Manifest);
        assert_eq!(cfg.reconcile_options().parentheses, ParenthesesPolicy::Ignore);
        assert!(matches!(cfg.classification_source(), ClassificationSource::File(p) if p == "classify.json"));
    }

    #[test]
    fn manifest_mode_requires_path() {
        let err = ReportConfig::from_lookup(lookup(&[("RRMAP_DATA_MODE", "manifest")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingManifestPath));
    }

    #[test]
    fn rejects_unknown_values() {
        let err = ReportConfig::from_lookup(lookup(&[("RRMAP_DATA_MODE", "remote")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RRMAP_DATA_MODE"));
        let err = ReportConfig::from_lookup(lookup(&[("RRMAP_PARENTHESES", "positive")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(var, _) if var == "RRMAP_PARENTHESES"));
    }

    #[test]
    fn yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.yaml");
        std::fs::write(
            &path,
            "data_mode: manifest\nmanifest_path: manifest.json\nbase_dir: /srv/report\nparentheses: ignore\n",
        )
        .unwrap();
        let cfg = ReportConfig::from_yaml_file(&path).unwrap();
        assert_eq!(cfg.manifest_path.as_deref(), Some("manifest.json"));
        assert_eq!(cfg.base_dir, Some(PathBuf::from("/srv/report")));
        assert_eq!(cfg.parentheses, ParenthesesPolicy::Ignore);
    }

    #[test]
    fn yaml_rejects_unknown_keys() {
        let err = ReportConfig::from_yaml("data_mode: embedded\nmode_flag: 1\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn manifest_source_from_config() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manifest.json"), r#"{"regression": {"v1": "v1.json"}}"#).unwrap();
        let cfg = ReportConfig {
            data_mode: DataMode::Manifest,
            manifest_path: Some("manifest.json".into()),
            base_dir: Some(dir.path().to_path_buf()),
            ..ReportConfig::default()
        };
        let source = cfg
            .snapshot_source(|| SnapshotSource::Embedded(Default::default()))
            .unwrap();
        assert_eq!(source.map_types().len(), 1);
    }
}
