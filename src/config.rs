use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable naming a YAML config file.
pub const CONFIG_ENV: &str = "SALES_DASHBOARD_CONFIG";
/// Environment variable overriding `store.path`.
pub const DB_ENV: &str = "SALES_DASHBOARD_DB";

/// Where the star-schema warehouse lives.
///
/// `path` is a `DuckDB` database file, or `:memory:` for an empty in-process
/// store (mostly useful for tests).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default = "default_path")]
    pub path: String,
    #[serde(default = "default_read_only")]
    pub read_only: bool,
}

fn default_path() -> String {
    ":memory:".to_string()
}

fn default_read_only() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_path(),
            read_only: default_read_only(),
        }
    }
}

/// Top-level dashboard configuration.
///
/// ```yaml
/// store:
///   path: /data/AdventureWorksDW2019.duckdb
///   read_only: true
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DashboardConfig {
    #[serde(default)]
    pub store: StoreConfig,
}

impl DashboardConfig {
    /// Parse a YAML document. `origin` is used only in error messages.
    pub fn from_yaml(origin: &str, yaml: &str) -> Result<Self, ConfigError> {
        yaml_serde::from_str(yaml).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml(&display, &yaml)
    }

    /// Apply environment overrides using `lookup` (normally `std::env::var`).
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup(DB_ENV).filter(|p| !p.trim().is_empty()) {
            self.store.path = path;
        }
        self
    }

    /// Resolve the host configuration: the file named by `CONFIG_ENV` (if
    /// set), then the `DB_ENV` override.
    ///
    /// The host needs a real warehouse file, so a store left at `:memory:`
    /// is [`ConfigError::NoWarehouse`].
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let base = match lookup(CONFIG_ENV).filter(|p| !p.trim().is_empty()) {
            Some(path) => Self::from_file(Path::new(&path))?,
            None => Self::default(),
        };
        let config = base.with_overrides(lookup);
        if config.store.path == ":memory:" {
            return Err(ConfigError::NoWarehouse);
        }
        Ok(config)
    }

    /// [`DashboardConfig::resolve`] against the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(|key| std::env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = DashboardConfig::from_yaml("test", "{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
        assert_eq!(cfg.store.path, ":memory:");
        assert!(cfg.store.read_only);
    }

    #[test]
    fn store_section_is_parsed() {
        let yaml = "store:\n  path: /data/aw.duckdb\n  read_only: false\n";
        let cfg = DashboardConfig::from_yaml("test", yaml).unwrap();
        assert_eq!(cfg.store.path, "/data/aw.duckdb");
        assert!(!cfg.store.read_only);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let yaml = "store:\n  path: x.duckdb\n  server: ARJUN\n";
        let err = DashboardConfig::from_yaml("dash.yaml", yaml).unwrap_err();
        assert!(err.to_string().starts_with("invalid config 'dash.yaml'"));
    }

    #[test]
    fn env_override_wins_over_file() {
        let cfg = DashboardConfig::default().with_overrides(|key| {
            (key == DB_ENV).then(|| "/tmp/override.duckdb".to_string())
        });
        assert_eq!(cfg.store.path, "/tmp/override.duckdb");
    }

    #[test]
    fn blank_env_override_is_ignored() {
        let cfg = DashboardConfig::default().with_overrides(|_| Some("  ".to_string()));
        assert_eq!(cfg.store.path, ":memory:");
    }

    #[test]
    fn resolve_without_warehouse_is_an_error() {
        let err = DashboardConfig::resolve(|_| None).unwrap_err();
        assert!(matches!(err, ConfigError::NoWarehouse));
        assert!(err.to_string().contains(DB_ENV), "unexpected: {err}");
    }

    #[test]
    fn resolve_takes_warehouse_from_env() {
        let cfg = DashboardConfig::resolve(|key| {
            (key == DB_ENV).then(|| "/data/aw.duckdb".to_string())
        })
        .unwrap();
        assert_eq!(cfg.store.path, "/data/aw.duckdb");
        assert!(cfg.store.read_only);
    }

    #[test]
    fn resolve_reads_named_config_file() {
        let path = std::env::temp_dir().join(format!(
            "sales_dashboard_config_{}.yaml",
            std::process::id()
        ));
        std::fs::write(&path, "store:\n  path: /data/from_file.duckdb\n").unwrap();
        let file = path.display().to_string();
        let cfg = DashboardConfig::resolve(|key| (key == CONFIG_ENV).then(|| file.clone()));
        std::fs::remove_file(&path).unwrap();
        assert_eq!(cfg.unwrap().store.path, "/data/from_file.duckdb");
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = DashboardConfig::from_file(Path::new("/nonexistent/dash.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
