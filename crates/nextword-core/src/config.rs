// Configuration loading and parsing (config/nextword.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::input::{
    DEFAULT_TEMPERATURE, DEFAULT_TOP_K, TEMPERATURE_MAX, TEMPERATURE_MIN, TOP_K_MAX, TOP_K_MIN,
};

/// File name of the main config, inside `config/` (and `defaults/`).
pub const CONFIG_FILE_NAME: &str = "nextword.toml";

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
// Config structs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub sampling: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceConfig {
    /// Base address of the prediction API, e.g. `http://127.0.0.1:8000`.
    pub base_url: String,
    /// Whole-request timeout. `None` leaves the HTTP client defaults.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

impl ServiceConfig {
    /// `POST` target for predictions.
    pub fn predict_url(&self) -> String {
        format!("{}/predict", self.base_url.trim_end_matches('/'))
    }

    /// `GET` target for the health check.
    pub fn health_url(&self) -> String {
        format!("{}/", self.base_url.trim_end_matches('/'))
    }
}

/// Initial sampling parameters for a fresh session.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SamplingConfig {
    #[serde(default = "default_top_k")]
    pub top_k: u8,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        SamplingConfig {
            top_k: DEFAULT_TOP_K,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

fn default_top_k() -> u8 {
    DEFAULT_TOP_K
}

fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate `config/nextword.toml` relative to `base_dir`.
///
/// Does not copy defaults; prefer `load_config()` for application startup.
pub fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let path = base_dir.join("config").join(CONFIG_FILE_NAME);
    let text = read_file(&path)?;
    let config = parse_config(&text).map_err(|e| ConfigError::ParseError {
        path: path.clone(),
        source: e,
    })?;

    validate(&config)?;

    Ok(config)
}

/// Parse config TOML text without validation.
pub fn parse_config(text: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(text)
}

/// Seed `config/` from `defaults/`: every regular file in `defaults/` that
/// has no counterpart in `config/` is copied over. Files ending in
/// `.example` are templates and stay behind. Returns the copied paths.
pub fn ensure_config_files(base_dir: &Path) -> Result<Vec<PathBuf>, ConfigError> {
    let defaults_dir = base_dir.join("defaults");
    let config_dir = base_dir.join("config");

    if !defaults_dir.is_dir() {
        return if config_dir.is_dir() {
            Ok(Vec::new())
        } else {
            Err(copy_error(
                format!("no defaults/ or config/ directory under {}", base_dir.display()),
                "start nextword from its project directory",
            ))
        };
    }

    std::fs::create_dir_all(&config_dir)
        .map_err(|e| copy_error(format!("cannot create {}", config_dir.display()), e))?;

    let mut seeds = Vec::new();
    for entry in std::fs::read_dir(&defaults_dir)
        .map_err(|e| copy_error(format!("cannot list {}", defaults_dir.display()), e))?
    {
        let source = entry
            .map_err(|e| copy_error(format!("cannot list {}", defaults_dir.display()), e))?
            .path();
        let is_template = source
            .extension()
            .is_some_and(|ext| ext == "example");
        if source.is_file() && !is_template {
            seeds.push(source);
        }
    }
    seeds.sort();

    let mut copied = Vec::new();
    for source in seeds {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = config_dir.join(name);
        if copy_if_missing(&source, &target)? {
            info!("Seeded {} from {}", target.display(), source.display());
            copied.push(target);
        }
    }
    Ok(copied)
}

/// Copy `source` to `target` unless `target` already exists. `create_new`
/// makes the existence check and the creation one step.
fn copy_if_missing(source: &Path, target: &Path) -> Result<bool, ConfigError> {
    let mut dest = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target)
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(copy_error(format!("cannot create {}", target.display()), e)),
    };
    let bytes = std::fs::read(source)
        .map_err(|e| copy_error(format!("cannot read {}", source.display()), e))?;
    std::io::Write::write_all(&mut dest, &bytes)
        .map_err(|e| copy_error(format!("cannot write {}", target.display()), e))?;
    Ok(true)
}

fn copy_error(what: String, cause: impl std::fmt::Display) -> ConfigError {
    ConfigError::DefaultsCopyError {
        message: format!("{what}: {cause}"),
    }
}

/// Load config relative to the current working directory, copying defaults
/// into `config/` first.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|_| ConfigError::FileNotFound {
        path: PathBuf::from("."),
    })?;
    ensure_config_files(&cwd)?;
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

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

pub fn validate(config: &Config) -> Result<(), ConfigError> {
    let url = config.service.base_url.trim();
    let has_scheme = url.starts_with("http://") || url.starts_with("https://");
    let has_host = url
        .split_once("://")
        .is_some_and(|(_, rest)| !rest.trim_matches('/').is_empty());
    if !has_scheme || !has_host {
        return Err(ConfigError::ValidationError {
            field: "service.base_url".into(),
            message: format!("must be an http(s) URL with a host, got {url:?}"),
        });
    }

    if config.service.request_timeout_secs == Some(0) {
        return Err(ConfigError::ValidationError {
            field: "service.request_timeout_secs".into(),
            message: "must be > 0 when set".into(),
        });
    }

    let top_k = config.sampling.top_k;
    if !(TOP_K_MIN..=TOP_K_MAX).contains(&top_k) {
        return Err(ConfigError::ValidationError {
            field: "sampling.top_k".into(),
            message: format!("must be between {TOP_K_MIN} and {TOP_K_MAX}, got {top_k}"),
        });
    }

    let temperature = config.sampling.temperature;
    if !(TEMPERATURE_MIN..=TEMPERATURE_MAX).contains(&temperature) {
        return Err(ConfigError::ValidationError {
            field: "sampling.temperature".into(),
            message: format!(
                "must be between {TEMPERATURE_MIN} and {TEMPERATURE_MAX}, got {temperature}"
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    /// Workspace root, located by walking up from this crate to `defaults/`.
    fn project_root() -> PathBuf {
        let manifest = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        manifest
            .ancestors()
            .find(|dir| dir.join("defaults").join(CONFIG_FILE_NAME).exists())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| panic!("Cannot locate defaults/ above {:?}", manifest))
    }

    /// Fresh scratch directory with an empty `config/` inside.
    fn scratch(name: &str) -> PathBuf {
        let tmp = std::env::temp_dir().join(format!("nextword_{name}"));
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(tmp.join("config")).unwrap();
        tmp
    }

    fn write_config(tmp: &Path, text: &str) {
        fs::write(tmp.join("config").join(CONFIG_FILE_NAME), text).unwrap();
    }

    fn default_text() -> String {
        fs::read_to_string(project_root().join("defaults").join(CONFIG_FILE_NAME)).unwrap()
    }

    fn expect_validation_field(tmp: &Path, expected: &str) {
        match load_config_from(tmp).unwrap_err() {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, expected),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn load_default_config_file() {
        let tmp = scratch("load_default");
        write_config(&tmp, &default_text());

        let config = load_config_from(&tmp).expect("defaults should be valid");
        assert_eq!(config.service.base_url, "http://127.0.0.1:8000");
        assert_eq!(config.service.request_timeout_secs, None);
        assert_eq!(config.sampling.top_k, 5);
        assert!((config.sampling.temperature - 0.8).abs() < f64::EPSILON);

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn sampling_section_is_optional() {
        let tmp = scratch("no_sampling");
        write_config(&tmp, "[service]\nbase_url = \"https://example.com\"\n");

        let config = load_config_from(&tmp).unwrap();
        assert_eq!(config.sampling, SamplingConfig::default());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn urls_are_derived_from_base() {
        let service = ServiceConfig {
            base_url: "https://api.example.com/".into(),
            request_timeout_secs: None,
        };
        assert_eq!(service.predict_url(), "https://api.example.com/predict");
        assert_eq!(service.health_url(), "https://api.example.com/");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let tmp = scratch("bad_url");
        write_config(&tmp, "[service]\nbase_url = \"ftp://example.com\"\n");
        expect_validation_field(&tmp, "service.base_url");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_base_url_without_host() {
        let tmp = scratch("no_host");
        write_config(&tmp, "[service]\nbase_url = \"http://\"\n");
        expect_validation_field(&tmp, "service.base_url");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_zero_timeout() {
        let tmp = scratch("zero_timeout");
        write_config(
            &tmp,
            "[service]\nbase_url = \"http://localhost:8000\"\nrequest_timeout_secs = 0\n",
        );
        expect_validation_field(&tmp, "service.request_timeout_secs");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_top_k_out_of_range() {
        let tmp = scratch("top_k_range");
        write_config(&tmp, &default_text().replace("top_k = 5", "top_k = 11"));
        expect_validation_field(&tmp, "sampling.top_k");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn rejects_temperature_out_of_range() {
        let tmp = scratch("temperature_range");
        write_config(
            &tmp,
            &default_text().replace("temperature = 0.8", "temperature = 0.1"),
        );
        expect_validation_field(&tmp, "sampling.temperature");
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn file_not_found_for_missing_config() {
        let tmp = scratch("missing_file");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::FileNotFound { path } => assert!(path.ends_with(CONFIG_FILE_NAME)),
            other => panic!("expected FileNotFound, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn parse_error_for_invalid_toml() {
        let tmp = scratch("invalid_toml");
        write_config(&tmp, "this is not valid [[[ toml");
        match load_config_from(&tmp).unwrap_err() {
            ConfigError::ParseError { path, .. } => assert!(path.ends_with(CONFIG_FILE_NAME)),
            other => panic!("expected ParseError, got: {other}"),
        }
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_copies_missing_files() {
        let tmp = std::env::temp_dir().join("nextword_ensure_copies");
        let _ = fs::remove_dir_all(&tmp);
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE_NAME), default_text()).unwrap();
        fs::write(defaults_dir.join("nextword.toml.example"), "# example\n").unwrap();

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert_eq!(copied.len(), 1);
        assert!(tmp.join("config").join(CONFIG_FILE_NAME).exists());
        assert!(!tmp.join("config/nextword.toml.example").exists());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_skips_existing() {
        let tmp = scratch("ensure_skips");
        let defaults_dir = tmp.join("defaults");
        fs::create_dir_all(&defaults_dir).unwrap();
        fs::write(defaults_dir.join(CONFIG_FILE_NAME), default_text()).unwrap();
        write_config(&tmp, "# custom\n");

        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let content = fs::read_to_string(tmp.join("config").join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(content, "# custom\n");

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_no_defaults_dir_is_ok() {
        let tmp = scratch("no_defaults");
        let copied = ensure_config_files(&tmp).expect("should succeed");
        assert!(copied.is_empty());
        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn ensure_config_files_errors_when_both_dirs_missing() {
        let tmp = std::env::temp_dir().join("nextword_both_missing");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();

        match ensure_config_files(&tmp).unwrap_err() {
            ConfigError::DefaultsCopyError { message } => {
                assert!(message.contains("no defaults/ or config/"));
            }
            other => panic!("expected DefaultsCopyError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
