use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub ratio: RatioConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            ratio: RatioConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Licensing table: children permitted per staff member in each age group,
/// and the month counts at which the older bands begin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatioConfig {
    pub infant_ratio: u32,
    pub toddler_ratio: u32,
    pub preschool_ratio: u32,
    pub kindergarten_ratio: u32,
    pub toddler_min_months: u32,
    pub preschool_min_months: u32,
}

impl Default for RatioConfig {
    fn default() -> Self {
        Self {
            infant_ratio: 4,
            toddler_ratio: 6,
            preschool_ratio: 10,
            kindergarten_ratio: 15,
            toddler_min_months: 12,
            preschool_min_months: 36,
        }
    }
}

impl RatioConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let config = Self {
            infant_ratio: positive_var("APP_RATIO_INFANT", defaults.infant_ratio)?,
            toddler_ratio: positive_var("APP_RATIO_TODDLER", defaults.toddler_ratio)?,
            preschool_ratio: positive_var("APP_RATIO_PRESCHOOL", defaults.preschool_ratio)?,
            kindergarten_ratio: positive_var(
                "APP_RATIO_KINDERGARTEN",
                defaults.kindergarten_ratio,
            )?,
            toddler_min_months: positive_var(
                "APP_TODDLER_MIN_MONTHS",
                defaults.toddler_min_months,
            )?,
            preschool_min_months: positive_var(
                "APP_PRESCHOOL_MIN_MONTHS",
                defaults.preschool_min_months,
            )?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("APP_RATIO_INFANT", self.infant_ratio),
            ("APP_RATIO_TODDLER", self.toddler_ratio),
            ("APP_RATIO_PRESCHOOL", self.preschool_ratio),
            ("APP_RATIO_KINDERGARTEN", self.kindergarten_ratio),
        ];
        if let Some(&(key, _)) = ratios.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::InvalidRatio { key });
        }

        if self.toddler_min_months == 0 || self.toddler_min_months >= self.preschool_min_months {
            return Err(ConfigError::InvalidAgeBands {
                toddler_min_months: self.toddler_min_months,
                preschool_min_months: self.preschool_min_months,
            });
        }

        Ok(())
    }
}

fn positive_var(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|value| *value > 0)
            .ok_or(ConfigError::InvalidRatio { key }),
        Err(_) => Ok(default),
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidRatio {
        key: &'static str,
    },
    InvalidAgeBands {
        toddler_min_months: u32,
        preschool_min_months: u32,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidRatio { key } => {
                write!(f, "{key} must be a positive whole number")
            }
            ConfigError::InvalidAgeBands {
                toddler_min_months,
                preschool_min_months,
            } => write!(
                f,
                "age bands must ascend (toddler starts at {toddler_min_months} months, preschool at {preschool_min_months})"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidRatio { .. }
            | ConfigError::InvalidAgeBands { .. } => None,
        }
    }
}
