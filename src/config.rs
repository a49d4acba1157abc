use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

const ENV_PREFIX: &str = "FACTURAS_";

/// Settings read from `FACTURAS_*` environment variables (and `.env`).
#[derive(Debug, Deserialize)]
pub(crate) struct AppConfig {
    /// Database file; defaults to the platform data directory.
    pub(crate) db_path: Option<PathBuf>,
    /// `tracing` filter directive, e.g. `debug` or `facturas=info`.
    #[serde(default = "default_log")]
    pub(crate) log: String,
}

fn default_log() -> String {
    "warn".into()
}

impl AppConfig {
    pub(crate) fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        envy::prefixed(ENV_PREFIX)
            .from_env()
            .context("Invalid FACTURAS_* environment variable")
    }

    #[cfg(test)]
    pub(crate) fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        Ok(envy::prefixed(ENV_PREFIX).from_iter(vars)?)
    }

    /// Resolve the database file, creating its directory if needed.
    pub(crate) fn db_path(&self) -> Result<PathBuf> {
        let path = match &self.db_path {
            Some(path) => path.clone(),
            None => {
                let proj_dirs = directories::ProjectDirs::from("com", "facturas", "Facturas")
                    .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
                proj_dirs.data_dir().join("facturas.db")
            }
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_defaults() {
        let config = AppConfig::from_vars(vars(&[("PATH", "/usr/bin")])).unwrap();
        assert!(config.db_path.is_none());
        assert_eq!(config.log, "warn");
    }

    #[test]
    fn test_prefixed_overrides() {
        let config = AppConfig::from_vars(vars(&[
            ("FACTURAS_DB_PATH", "/tmp/x/facturas.db"),
            ("FACTURAS_LOG", "debug"),
        ]))
        .unwrap();
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/x/facturas.db")));
        assert_eq!(config.log, "debug");
    }

    #[test]
    fn test_db_path_creates_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("nested").join("facturas.db");
        let config = AppConfig {
            db_path: Some(target.clone()),
            log: default_log(),
        };
        assert_eq!(config.db_path().unwrap(), target);
        assert!(dir.path().join("nested").is_dir());
    }
}
