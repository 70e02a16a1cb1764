// ⚙️ Settings - optional TOML file plus WMS__* environment overrides

use crate::error::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// Which of the two store databases to use
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Env {
    Dev,
    Prod,
}

impl Env {
    pub fn as_str(&self) -> &'static str {
        match self {
            Env::Dev => "dev",
            Env::Prod => "prod",
        }
    }
}

impl fmt::Display for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Env {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Env::Dev),
            "prod" => Ok(Env::Prod),
            other => Err(format!("unknown environment '{}' (expected dev or prod)", other)),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Stores {
    #[serde(default = "default_dev_store")]
    pub dev: String,
    #[serde(default = "default_prod_store")]
    pub prod: String,
}

impl Default for Stores {
    fn default() -> Self {
        Stores {
            dev: default_dev_store(),
            prod: default_prod_store(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    #[serde(default)]
    pub stores: Stores,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    /// Directory holding a replacement SQL bundle
    #[serde(default)]
    pub sql_dir: Option<PathBuf>,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_connect_attempts")]
    pub connect_attempts: u32,
}

fn default_dev_store() -> String {
    "sqlite://wms_dev.db".to_string()
}

fn default_prod_store() -> String {
    "sqlite://wms_prod.db".to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_batch_size() -> usize {
    100_000
}

fn default_connect_attempts() -> u32 {
    5
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            stores: Stores::default(),
            log_dir: default_log_dir(),
            sql_dir: None,
            batch_size: default_batch_size(),
            connect_attempts: default_connect_attempts(),
        }
    }
}

impl Settings {
    /// Layer the optional file under `WMS__*` environment variables
    /// (e.g. `WMS__STORES__PROD`, `WMS__BATCH_SIZE`).
    pub fn load(path: Option<&Path>) -> Result<Settings> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        let settings: Settings = builder
            .add_source(
                Environment::with_prefix("WMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        debug!(
            log_dir = %settings.log_dir.display(),
            batch_size = settings.batch_size,
            "settings loaded"
        );
        Ok(settings)
    }

    pub fn connection_string(&self, env: Env) -> &str {
        match env {
            Env::Dev => &self.stores.dev,
            Env::Prod => &self.stores.prod,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.batch_size, 100_000);
        assert_eq!(settings.connect_attempts, 5);
        assert_eq!(settings.log_dir, PathBuf::from("logs"));
        assert_eq!(settings.connection_string(Env::Prod), "sqlite://wms_prod.db");
    }

    #[test]
    fn test_file_overrides() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("wms.toml");
        fs::write(
            &path,
            "log_dir = \"/tmp/wms-logs\"\nbatch_size = 500\n\n[stores]\ndev = \"sqlite:///tmp/dev.db\"\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.batch_size, 500);
        assert_eq!(settings.log_dir, PathBuf::from("/tmp/wms-logs"));
        assert_eq!(settings.connection_string(Env::Dev), "sqlite:///tmp/dev.db");
        assert_eq!(settings.connection_string(Env::Prod), "sqlite://wms_prod.db");
        assert_eq!(settings.connect_attempts, 5);
    }

    #[test]
    fn test_env_parse() {
        assert_eq!("PROD".parse::<Env>().unwrap(), Env::Prod);
        assert_eq!(Env::Dev.to_string(), "dev");
        assert!("staging".parse::<Env>().is_err());
    }
}
