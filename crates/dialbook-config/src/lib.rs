use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use dialbook_core::{CoreError, Locale};
use serde::Deserialize;
use thiserror::Error;

const APP_DIR: &str = "dialbook";
const CONFIG_FILENAME: &str = "config.toml";

pub const DEFAULT_BATCH_SIZE: usize = 1000;
pub const DEFAULT_REJECTS_PATH: &str = "rejected_rows.csv";
pub const DEFAULT_PREVIEW_PATH: &str = "dry_run_normalized.csv";
pub const DEFAULT_PATTERN: &str = "*.csv";
pub const DEFAULT_JOBS: usize = 1;

#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub ingest: IngestConfig,
    pub locale: Locale,
}

#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub batch_size: usize,
    pub rejects_path: PathBuf,
    pub preview_path: PathBuf,
    pub pattern: String,
    pub jobs: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            rejects_path: PathBuf::from(DEFAULT_REJECTS_PATH),
            preview_path: PathBuf::from(DEFAULT_PREVIEW_PATH),
            pattern: DEFAULT_PATTERN.to_string(),
            jobs: DEFAULT_JOBS,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing home directory")]
    MissingHomeDir,
    #[error("invalid config path: {0}")]
    InvalidConfigPath(PathBuf),
    #[error("config file not found: {0}")]
    MissingConfigFile(PathBuf),
    #[error("invalid store path: {0}")]
    InvalidStorePath(PathBuf),
    #[error("invalid batch_size value: {0}")]
    InvalidBatchSize(usize),
    #[error("invalid jobs value: {0}")]
    InvalidJobs(usize),
    #[error("invalid ingest.{field}: {message}")]
    InvalidIngestField {
        field: &'static str,
        message: &'static str,
    },
    #[error("invalid locale: {0}")]
    InvalidLocale(#[from] CoreError),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    store: Option<StoreFile>,
    ingest: Option<IngestFile>,
    locale: Option<LocaleFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct StoreFile {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct IngestFile {
    batch_size: Option<usize>,
    rejects_path: Option<PathBuf>,
    preview_path: Option<PathBuf>,
    pattern: Option<String>,
    jobs: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct LocaleFile {
    country_code: Option<String>,
    primary_city: Option<String>,
    primary_state: Option<String>,
    known_cities: Option<Vec<String>>,
}

pub fn load(config_path: Option<PathBuf>) -> Result<AppConfig> {
    let required = config_path.is_some();
    let path = match resolve_config_path(config_path) {
        Ok(path) => path,
        Err(ConfigError::MissingHomeDir) if !required => return Ok(AppConfig::default()),
        Err(ConfigError::InvalidConfigPath(_)) if !required => return Ok(AppConfig::default()),
        Err(err) => return Err(err),
    };
    match load_at_path(&path, required)? {
        Some(config) => Ok(config),
        None => Ok(AppConfig::default()),
    }
}

pub fn resolve_config_path(custom: Option<PathBuf>) -> Result<PathBuf> {
    match custom {
        Some(path) => {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidConfigPath(path));
            }
            Ok(path)
        }
        None => {
            let base = if let Some(dir) = env::var_os("XDG_CONFIG_HOME") {
                let path = PathBuf::from(dir);
                if path.as_os_str().is_empty() {
                    return Err(ConfigError::InvalidConfigPath(path));
                }
                path
            } else {
                let home = dirs::home_dir().ok_or(ConfigError::MissingHomeDir)?;
                home.join(".config")
            };
            Ok(base.join(APP_DIR).join(CONFIG_FILENAME))
        }
    }
}

fn load_at_path(path: &Path, required: bool) -> Result<Option<AppConfig>> {
    if !path.exists() {
        if required {
            return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
        }
        return Ok(None);
    }

    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let parsed: ConfigFile = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Some(merge_config(parsed)?))
}

fn merge_config(parsed: ConfigFile) -> Result<AppConfig> {
    let mut config = AppConfig::default();

    if let Some(store) = parsed.store {
        if let Some(path) = store.path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidStorePath(path));
            }
            config.store.path = Some(path);
        }
    }

    if let Some(ingest) = parsed.ingest {
        if let Some(batch_size) = ingest.batch_size {
            if batch_size == 0 {
                return Err(ConfigError::InvalidBatchSize(batch_size));
            }
            config.ingest.batch_size = batch_size;
        }
        if let Some(jobs) = ingest.jobs {
            if jobs == 0 {
                return Err(ConfigError::InvalidJobs(jobs));
            }
            config.ingest.jobs = jobs;
        }
        if let Some(path) = ingest.rejects_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidIngestField {
                    field: "rejects_path",
                    message: "path cannot be empty",
                });
            }
            config.ingest.rejects_path = path;
        }
        if let Some(path) = ingest.preview_path {
            if path.as_os_str().is_empty() {
                return Err(ConfigError::InvalidIngestField {
                    field: "preview_path",
                    message: "path cannot be empty",
                });
            }
            config.ingest.preview_path = path;
        }
        if let Some(pattern) = ingest.pattern {
            let trimmed = pattern.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::InvalidIngestField {
                    field: "pattern",
                    message: "pattern cannot be empty",
                });
            }
            config.ingest.pattern = trimmed.to_string();
        }
    }

    if let Some(locale) = parsed.locale {
        if let Some(code) = locale.country_code {
            config.locale.country_code = code.trim().to_string();
        }
        if let Some(city) = locale.primary_city {
            config.locale.primary_city = city.trim().to_string();
        }
        if let Some(state) = locale.primary_state {
            config.locale.primary_state = state.trim().to_string();
        }
        if let Some(cities) = locale.known_cities {
            config.locale.known_cities = cities
                .into_iter()
                .map(|city| city.trim().to_string())
                .collect();
        }
        config.locale.validate()?;
    }

    Ok(config)
}
