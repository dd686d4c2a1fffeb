// Configuration loading and parsing (selector.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

use crate::aggregate::YearRange;
use crate::corpus::MatchFormat;

const CONFIG_FILE: &str = "selector.toml";

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to initialize config from defaults: {message}")]
    DefaultsCopyError { message: String },
}

// ---------------------------------------------------------------------------
// Assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub data: DataPaths,
    pub query: QueryDefaults,
    pub solver: SolverConfig,
    pub leaders: LeadersConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    pub corpus: String,
    pub csv_dir: String,
}

/// Default query used when the command line does not override it.
#[derive(Debug, Clone, Copy)]
pub struct QueryDefaults {
    pub format: MatchFormat,
    pub range: YearRange,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SolverConfig {
    pub timeout_secs: u64,
}

impl SolverConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LeadersConfig {
    pub limit: usize,
}

// ---------------------------------------------------------------------------
// selector.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire selector.toml file.
#[derive(Debug, Clone, Deserialize)]
struct SelectorFile {
    data: DataPaths,
    query: QuerySection,
    solver: SolverConfig,
    leaders: LeadersConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct QuerySection {
    format: String,
    start_year: i32,
    end_year: i32,
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/selector.toml` relative to
/// `base_dir`. Does not copy defaults; see `load_config()`.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE);
    let text = read_file(&path)?;
    let file: SelectorFile = toml::from_str(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;
    validate(file)
}

/// Make sure `config/selector.toml` exists under `base_dir`, seeding it from
/// `defaults/selector.toml` when missing. Returns the path written, or `None`
/// when a config file was already in place.
pub fn ensure_config_file(base_dir: &Path) -> Result<Option<PathBuf>, ConfigError> {
    let target = base_dir.join("config").join(CONFIG_FILE);
    if target.is_file() {
        return Ok(None);
    }

    let source = base_dir.join("defaults").join(CONFIG_FILE);
    if !source.is_file() {
        return Err(ConfigError::DefaultsCopyError {
            message: format!(
                "no {CONFIG_FILE} in {} or {}; run from the project root",
                target.display(),
                source.display()
            ),
        });
    }

    let copy_err = |e: std::io::Error| ConfigError::DefaultsCopyError {
        message: format!("failed to copy {} to {}: {e}", source.display(), target.display()),
    };
    if let Some(dir) = target.parent() {
        std::fs::create_dir_all(dir).map_err(copy_err)?;
    }
    std::fs::copy(&source, &target).map_err(copy_err)?;
    info!("seeded {} from defaults", target.display());
    Ok(Some(target))
}

/// Load config relative to the current working directory, copying defaults
/// first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_file(&cwd)?;
    load_config_from(&cwd)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn read_file(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
        path: path.to_path_buf(),
    })
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.into(),
        message: message.into(),
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

fn validate(file: SelectorFile) -> Result<Config, ConfigError> {
    let format = file
        .query
        .format
        .parse::<MatchFormat>()
        .map_err(|e| invalid("query.format", e.to_string()))?;

    let range = YearRange::new(file.query.start_year, file.query.end_year).ok_or_else(|| {
        invalid(
            "query.start_year",
            format!(
                "must not be after end_year ({} > {})",
                file.query.start_year, file.query.end_year
            ),
        )
    })?;

    if file.solver.timeout_secs == 0 {
        return Err(invalid("solver.timeout_secs", "must be > 0"));
    }
    if file.leaders.limit == 0 {
        return Err(invalid("leaders.limit", "must be > 0"));
    }
    if file.data.corpus.trim().is_empty() {
        return Err(invalid("data.corpus", "must not be empty"));
    }

    Ok(Config {
        data: file.data,
        query: QueryDefaults { format, range },
        solver: file.solver,
        leaders: file.leaders,
    })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
