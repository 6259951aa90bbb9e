use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::error::ConfigError;

pub const ENV_BIND_ADDRESS: &str = "SKYCAST_BIND_ADDRESS";
pub const ENV_GEOCODE_URL: &str = "SKYCAST_GEOCODE_URL";
pub const ENV_WEATHER_URL: &str = "SKYCAST_WEATHER_URL";

/// Nominatim refuses to return more than this many results per search.
const NOMINATIM_MAX_LIMIT: u32 = 40;
/// Open-Meteo serves at most 16 forecast days.
const OPEN_METEO_MAX_DAYS: u8 = 16;

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Joins all errors into a single line
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Location search upstream (Nominatim)
    #[serde(default)]
    pub geocode: GeocodeConfig,

    /// Forecast upstream (Open-Meteo)
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP server listens on, as `host:port`
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse the bind address into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.bind_address
            .parse()
            .map_err(|e| ConfigError::InvalidAddress(format!("{}: {}", self.bind_address, e)))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodeConfig {
    /// Base URL of the Nominatim instance (without `/search`)
    pub base_url: String,

    /// Identifying `User-Agent` sent upstream. Nominatim's usage policy requires one.
    pub user_agent: String,

    /// Maximum number of results requested
    #[serde(default = "default_result_limit")]
    pub result_limit: u32,

    /// Optional per-request timeout; no timeout when unset
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_result_limit() -> u32 {
    5
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: "WeatherApp/1.0".to_string(),
            result_limit: default_result_limit(),
            request_timeout_secs: None,
        }
    }
}

impl GeocodeConfig {
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}

/// Temperature unit preference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemperatureUnit {
    #[default]
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Value of Open-Meteo's `temperature_unit` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "celsius",
            TemperatureUnit::Fahrenheit => "fahrenheit",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Base URL of the Open-Meteo API (without `/forecast`)
    pub base_url: String,

    /// Temperature unit preference
    #[serde(default)]
    pub temperature_unit: TemperatureUnit,

    /// Number of forecast days requested
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

fn default_forecast_days() -> u8 {
    7
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.open-meteo.com/v1".to_string(),
            temperature_unit: TemperatureUnit::default(),
            forecast_days: default_forecast_days(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from `path`, writing defaults there if it doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!("No config at {}, writing defaults", path.display());
            let config = Self::default();
            config.save_to(path)?;
            return Ok(config);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError(format!("{}: {}", path.display(), e)))?;

        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged; any error fails the load.
    pub fn load_validated() -> Result<(Self, ValidationResult)> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()).into());
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Override fields from `lookup` (normally the process environment)
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup(ENV_BIND_ADDRESS) {
            tracing::debug!("{} overrides server.bind_address", ENV_BIND_ADDRESS);
            self.server.bind_address = addr;
        }
        if let Some(url) = lookup(ENV_GEOCODE_URL) {
            tracing::debug!("{} overrides geocode.base_url", ENV_GEOCODE_URL);
            self.geocode.base_url = url;
        }
        if let Some(url) = lookup(ENV_WEATHER_URL) {
            tracing::debug!("{} overrides weather.base_url", ENV_WEATHER_URL);
            self.weather.base_url = url;
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(e) = self.server.socket_addr() {
            result.add_error("server.bind_address", e.to_string());
        }

        Self::validate_url(&self.geocode.base_url, "geocode.base_url", &mut result);
        Self::validate_url(&self.weather.base_url, "weather.base_url", &mut result);

        if self.geocode.user_agent.trim().is_empty() {
            result.add_error(
                "geocode.user_agent",
                "A User-Agent is required by the Nominatim usage policy",
            );
        }

        if self.geocode.result_limit == 0 {
            result.add_error("geocode.result_limit", "Result limit must be greater than 0");
        } else if self.geocode.result_limit > NOMINATIM_MAX_LIMIT {
            result.add_warning(
                "geocode.result_limit",
                format!("Nominatim caps results at {}", NOMINATIM_MAX_LIMIT),
            );
        }

        if self.geocode.request_timeout_secs == Some(0) {
            result.add_error(
                "geocode.request_timeout_secs",
                "Timeout must be greater than 0 (omit it to disable)",
            );
        }

        if self.weather.forecast_days == 0 || self.weather.forecast_days > OPEN_METEO_MAX_DAYS {
            result.add_error(
                "weather.forecast_days",
                format!("Forecast days must be between 1 and {}", OPEN_METEO_MAX_DAYS),
            );
        }

        result
    }

    /// Validate a URL field
    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }

                if url.port() == Some(0) {
                    result.add_error(field_name, "Port cannot be 0");
                }

                if url.scheme() == "http" {
                    result.add_warning(field_name, "Upstream traffic is not encrypted");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Save configuration to `path`, creating parent directories
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Get the path to the configuration file
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get config directory")?
            .join("skycast");

        Ok(config_dir.join("config.toml"))
    }
}
