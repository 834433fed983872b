use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::Path;
use thiserror::Error;
use validator::{Validate, ValidationError, ValidationErrors};

/// Default values for configuration
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_ENV: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOW_STOCK_THRESHOLD: u32 = 100;
const DEFAULT_CURRENCY: &str = "RWF";
pub const CONFIG_DIR: &str = "config";

/// Application configuration structure with validation
#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    #[validate(length(min = 1))]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    #[validate(range(min = 1))]
    pub port: u16,

    /// Application environment
    #[serde(default = "default_environment")]
    #[validate(length(min = 1))]
    pub environment: String,

    /// Logging level
    #[serde(default = "default_log_level")]
    #[validate(custom = "validate_log_level")]
    pub log_level: String,

    /// Log in JSON format (structured logging)
    #[serde(default)]
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins
    #[serde(default)]
    pub cors_allowed_origins: Option<String>,

    /// Allow any origin outside development
    #[serde(default)]
    pub cors_allow_any_origin: bool,

    /// Load the demo records at startup
    #[serde(default)]
    pub seed_demo_data: bool,

    /// Inventory lines with less current stock than this are flagged
    #[serde(default = "default_low_stock_threshold")]
    pub low_stock_threshold: u32,

    #[serde(default = "default_api_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub api_default_page_size: u32,

    #[serde(default = "default_api_max_page_size")]
    #[validate(range(min = 1, max = 1000))]
    pub api_max_page_size: u32,

    /// Currency code reported with the dashboard amounts
    #[serde(default = "default_currency")]
    #[validate(length(equal = 3))]
    pub currency: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
            log_level: default_log_level(),
            log_json: false,
            cors_allowed_origins: None,
            cors_allow_any_origin: false,
            seed_demo_data: false,
            low_stock_threshold: default_low_stock_threshold(),
            api_default_page_size: default_api_page_size(),
            api_max_page_size: default_api_max_page_size(),
            currency: default_currency(),
        }
    }
}

impl AppConfig {
    /// Checks if running in production environment
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Checks if running in development environment
    pub fn is_development(&self) -> bool {
        self.environment.eq_ignore_ascii_case("development")
    }

    /// Returns true if explicit CORS origins are configured
    pub fn has_cors_allowed_origins(&self) -> bool {
        !self.cors_origins().is_empty()
    }

    /// The configured origins, trimmed, blanks dropped.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_allowed_origins
            .as_deref()
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Whether we should fall back to permissive CORS
    pub fn should_allow_permissive_cors(&self) -> bool {
        self.is_development() || self.cors_allow_any_origin
    }

    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    fn validate_additional_constraints(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if !self.should_allow_permissive_cors() && !self.has_cors_allowed_origins() {
            let mut err = ValidationError::new("cors_allowed_origins_required");
            err.message = Some(
                "Set APP__CORS_ALLOWED_ORIGINS for non-development environments or explicitly opt-in via APP__CORS_ALLOW_ANY_ORIGIN=true".into(),
            );
            errors.add("cors_allowed_origins", err);
        }

        if self.api_default_page_size > self.api_max_page_size {
            let mut err = ValidationError::new("page_size_above_max");
            err.message = Some("api_default_page_size must not exceed api_max_page_size".into());
            errors.add("api_default_page_size", err);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Gets log level reference
    pub fn log_level(&self) -> &str {
        &self.log_level
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("Configuration loading failed: {0}")]
    Load(#[from] ConfigError),

    #[error("Configuration validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Default value functions
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_environment() -> String {
    DEFAULT_ENV.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_low_stock_threshold() -> u32 {
    DEFAULT_LOW_STOCK_THRESHOLD
}

fn default_api_page_size() -> u32 {
    20
}

fn default_api_max_page_size() -> u32 {
    100
}

fn default_currency() -> String {
    DEFAULT_CURRENCY.to_string()
}

/// Validates log level values
fn validate_log_level(level: &str) -> Result<(), ValidationError> {
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if valid_levels.contains(&level.to_lowercase().as_str()) {
        Ok(())
    } else {
        let mut err = ValidationError::new("log_level");
        err.message = Some("Must be one of: trace, debug, info, warn, error".into());
        Err(err)
    }
}

/// Initializes tracing using the provided log level as the default filter
pub fn init_tracing(level: &str, json: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_directive = format!("factory_ops_api={},tower_http=debug", level);
    let filter_directive = env::var("RUST_LOG")
        .ok()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(default_directive);
    let filter = EnvFilter::new(filter_directive);

    if json {
        let _ = fmt().with_env_filter(filter).json().try_init();
    } else {
        let _ = fmt().with_env_filter(filter).try_init();
    }
}

/// Config profile picked by `RUN_ENV`, falling back to `APP_ENV`.
pub fn selected_run_env() -> String {
    env::var("RUN_ENV")
        .or_else(|_| env::var("APP_ENV"))
        .unwrap_or_else(|_| DEFAULT_ENV.to_string())
}

/// Loads application configuration
///
/// Layers configuration sources in this order:
/// 1. Built-in defaults
/// 2. Default config (config/default.toml)
/// 3. Environment-specific config (config/{env}.toml)
/// 4. Environment variables (APP__*)
///
/// Runs before any subscriber is installed, so failures are returned rather
/// than logged.
pub fn load_config() -> Result<AppConfig, AppConfigError> {
    load_config_from(Path::new(CONFIG_DIR), &selected_run_env())
}

/// Same layering as [`load_config`], reading files from `config_dir`.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, AppConfigError> {
    let config = Config::builder()
        .set_default("environment", run_env)?
        .set_default("log_level", DEFAULT_LOG_LEVEL)?
        .set_default("log_json", false)?
        .add_source(File::with_name(&config_dir.join("default").to_string_lossy()).required(false))
        .add_source(File::with_name(&config_dir.join(run_env).to_string_lossy()).required(false))
        .add_source(Environment::with_prefix("APP").separator("__"))
        .build()?;

    let app_config: AppConfig = config.try_deserialize()?;

    app_config.validate().map_err(AppConfigError::Validation)?;
    app_config
        .validate_additional_constraints()
        .map_err(AppConfigError::Validation)?;

    Ok(app_config)
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn config_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (name, content) in files {
            fs::write(dir.path().join(name), content).unwrap();
        }
        dir
    }

    #[test]
    fn defaults_apply_without_files() {
        let dir = TempDir::new().unwrap();
        let cfg = load_config_from(&dir.path().join("missing"), "development").unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.environment, "development");
        assert_eq!(cfg.low_stock_threshold, DEFAULT_LOW_STOCK_THRESHOLD);
        assert_eq!(cfg.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn environment_file_overrides_default_file() {
        let dir = config_dir(&[
            ("default.toml", "port = 9000\nlow_stock_threshold = 50\n"),
            (
                "staging.toml",
                "port = 9100\ncors_allowed_origins = \"https://ops.example.com\"\n",
            ),
        ]);
        let cfg = load_config_from(dir.path(), "staging").unwrap();
        assert_eq!(cfg.port, 9100);
        assert_eq!(cfg.low_stock_threshold, 50);
        assert_eq!(cfg.environment, "staging");
    }

    #[test]
    fn invalid_values_fail_validation() {
        let dir = config_dir(&[("default.toml", "log_level = \"loud\"\ncurrency = \"RW\"\n")]);
        match load_config_from(dir.path(), "development") {
            Err(AppConfigError::Validation(errors)) => {
                assert!(errors.field_errors().contains_key("log_level"));
                assert!(errors.field_errors().contains_key("currency"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = config_dir(&[("default.toml", "database_url = \"postgres://x\"\n")]);
        assert!(matches!(
            load_config_from(dir.path(), "development"),
            Err(AppConfigError::Load(_))
        ));
    }

    #[test]
    fn production_without_cors_is_rejected() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            load_config_from(dir.path(), "production"),
            Err(AppConfigError::Validation(_))
        ));
    }
}
