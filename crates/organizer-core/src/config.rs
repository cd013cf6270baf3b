use crate::error::Error;
use crate::linker::RunMode;
use config::{Config, ConfigError, Environment, File as ConfigFile};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

pub const DEFAULT_ALLOWED_ROOTS: [&str; 7] = [
    "Anime", "Movies", "TV Shows", "Manga", "Music", "Software", "Other",
];
pub const DATA_DIR_NAME: &str = ".organizer";
pub const DEFAULT_INTERVAL_SECS: u64 = 600;
pub const DEFAULT_API_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Which entries are sent to the classifier on a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReclassifyPolicy {
    /// Once anything new appears, reclassify every entry and rebuild the tree.
    #[default]
    Full,
    /// Classify only unprocessed entries and patch the tree without cleaning.
    Incremental,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub source_dir: String,
    pub target_dir: String,
    #[serde(default)]
    pub data_dir: Option<String>,
    #[serde(default)]
    pub real_run: bool,
    #[serde(default = "default_allowed_roots")]
    pub allowed_roots: Vec<String>,
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
    #[serde(default)]
    pub policy: ReclassifyPolicy,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub openrouter_api_key: Option<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_allowed_roots() -> Vec<String> {
    DEFAULT_ALLOWED_ROOTS.iter().map(|s| s.to_string()).collect()
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    120
}

/// Load configuration from `Config.toml` (optional) overlaid with the
/// process environment, e.g. `SOURCE_DIR`, `TARGET_DIR`, `REAL_RUN`.
pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let builder = Config::builder()
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::default()
                .try_parsing(true)
                .ignore_empty(true)
                .list_separator(",")
                .with_list_parse_key("allowed_roots")
                .with_list_parse_key("ignore_patterns"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Validated, filesystem-checked view of [`AppConfig`] used by the engine.
#[derive(Debug, Clone)]
pub struct Settings {
    pub source_root: PathBuf,
    pub target_root: PathBuf,
    pub data_dir: PathBuf,
    pub run_mode: RunMode,
    pub allowed_roots: Vec<String>,
    pub ignore_patterns: Vec<Pattern>,
    pub policy: ReclassifyPolicy,
    pub interval: Duration,
}

impl Settings {
    pub fn ledger_path(&self) -> PathBuf {
        self.data_dir.join("organizer.db")
    }
}

impl AppConfig {
    /// Check both roots and the remaining values, canonicalize the roots and
    /// create the data directory when it does not exist yet.
    pub fn resolve(&self) -> Result<Settings, Error> {
        let source_root = existing_dir(&self.source_dir)?;
        let target_root = existing_dir(&self.target_dir)?;

        if self.allowed_roots.is_empty() {
            return Err(Error::InvalidConfig(
                "allowed_roots must name at least one folder".to_string(),
            ));
        }
        if let Some(bad) = self
            .allowed_roots
            .iter()
            .find(|root| root.is_empty() || root.contains('/') || root.contains('\\'))
        {
            return Err(Error::InvalidConfig(format!(
                "allowed root '{}' must be a single path segment",
                bad
            )));
        }
        if self.interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "interval_secs must be greater than zero".to_string(),
            ));
        }

        let ignore_patterns = self
            .ignore_patterns
            .iter()
            .map(|glob| {
                Pattern::new(glob).map_err(|e| {
                    Error::InvalidConfig(format!("invalid ignore pattern '{}': {}", glob, e))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let data_dir = match &self.data_dir {
            Some(dir) => PathBuf::from(dir),
            None => target_root.join(DATA_DIR_NAME),
        };
        if !data_dir.is_dir() {
            info!("Creating data directory {}", data_dir.display());
            fs::create_dir_all(&data_dir)?;
        }

        Ok(Settings {
            source_root,
            target_root,
            data_dir,
            run_mode: if self.real_run {
                RunMode::Apply
            } else {
                RunMode::DryRun
            },
            allowed_roots: self.allowed_roots.clone(),
            ignore_patterns,
            policy: self.policy,
            interval: Duration::from_secs(self.interval_secs),
        })
    }

    /// Copy of the configuration that is safe to print.
    pub fn redacted(&self) -> AppConfig {
        let mut copy = self.clone();
        if copy.openrouter_api_key.is_some() {
            copy.openrouter_api_key = Some("********".to_string());
        }
        copy
    }

    pub fn to_toml(&self) -> Result<String, Error> {
        toml::to_string_pretty(self).map_err(|e| Error::Other(e.to_string()))
    }
}

fn existing_dir(raw: &str) -> Result<PathBuf, Error> {
    let path = Path::new(raw);
    if raw.trim().is_empty() {
        return Err(Error::InvalidRoot {
            path: path.to_path_buf(),
            reason: "path is empty".to_string(),
        });
    }
    let metadata = fs::metadata(path).map_err(|e| Error::InvalidRoot {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(Error::InvalidRoot {
            path: path.to_path_buf(),
            reason: "not a directory".to_string(),
        });
    }
    Ok(fs::canonicalize(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn minimal(source: &Path, target: &Path) -> AppConfig {
        Config::builder()
            .set_override("source_dir", source.to_string_lossy().into_owned())
            .unwrap()
            .set_override("target_dir", target.to_string_lossy().into_owned())
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_defaults_applied() {
        let tmp = tempdir().unwrap();
        let config = minimal(tmp.path(), tmp.path());
        assert!(!config.real_run);
        assert_eq!(config.allowed_roots.len(), 7);
        assert_eq!(config.allowed_roots[0], "Anime");
        assert_eq!(config.policy, ReclassifyPolicy::Full);
        assert_eq!(config.interval_secs, DEFAULT_INTERVAL_SECS);
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }

    #[test]
    fn test_resolve_creates_data_dir_under_target() {
        let source = tempdir().unwrap();
        let target = tempdir().unwrap();
        let settings = minimal(source.path(), target.path()).resolve().unwrap();

        assert_eq!(settings.run_mode, RunMode::DryRun);
        assert!(settings.source_root.is_absolute());
        assert_eq!(
            settings.data_dir,
            fs::canonicalize(target.path()).unwrap().join(DATA_DIR_NAME)
        );
        assert!(settings.data_dir.is_dir());
    }

    #[test]
    fn test_resolve_rejects_missing_root() {
        let target = tempdir().unwrap();
        let config = minimal(&target.path().join("nope"), target.path());
        assert!(matches!(config.resolve(), Err(Error::InvalidRoot { .. })));
    }

    #[test]
    fn test_resolve_rejects_file_root() {
        let tmp = tempdir().unwrap();
        let file = tmp.path().join("plain.txt");
        fs::write(&file, "x").unwrap();
        let config = minimal(&file, tmp.path());
        assert!(matches!(config.resolve(), Err(Error::InvalidRoot { .. })));
    }

    #[test]
    fn test_resolve_rejects_bad_glob() {
        let tmp = tempdir().unwrap();
        let mut config = minimal(tmp.path(), tmp.path());
        config.ignore_patterns = vec!["[unclosed".to_string()];
        assert!(matches!(config.resolve(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_redacted_hides_api_key() {
        let tmp = tempdir().unwrap();
        let mut config = minimal(tmp.path(), tmp.path());
        config.openrouter_api_key = Some("sk-secret".to_string());
        let rendered = config.redacted().to_toml().unwrap();
        assert!(!rendered.contains("sk-secret"));
        assert!(rendered.contains("source_dir"));
    }
}
