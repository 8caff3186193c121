//! Configuration module for fiscal-service.

use rust_decimal::Decimal;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::str::FromStr;

/// India Standard Time, UTC+05:30.
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 330;

#[derive(Debug, Clone)]
pub struct FiscalConfig {
    pub common: core_config::Config,
    pub service_name: String,
    pub service_version: String,
    pub log_level: String,
    pub otlp_endpoint: Option<String>,
    pub database: DatabaseConfig,
    pub gst: GstConfig,
    pub sequence: SequenceConfig,
    /// Offset used to derive the business date for counters and numbers.
    pub business_utc_offset_minutes: i32,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone)]
pub struct GstConfig {
    /// Used when a company profile carries neither GSTIN nor state code.
    pub seller_state_code: Option<String>,
    pub b2c_large_threshold: Decimal,
}

#[derive(Debug, Clone)]
pub struct SequenceConfig {
    pub max_attempts: u32,
}

impl Default for GstConfig {
    fn default() -> Self {
        Self {
            seller_state_code: None,
            b2c_large_threshold: Decimal::from(250_000),
        }
    }
}

impl Default for SequenceConfig {
    fn default() -> Self {
        Self { max_attempts: 5 }
    }
}

impl FiscalConfig {
    pub fn from_env() -> Result<Self, AppError> {
        let common = core_config::Config::load()?;

        let b2c_large_threshold = match env::var("GST_B2C_LARGE_THRESHOLD") {
            Ok(raw) => Decimal::from_str(raw.trim()).map_err(|e| {
                AppError::ConfigError(anyhow::anyhow!(
                    "GST_B2C_LARGE_THRESHOLD must be a decimal amount: {}",
                    e
                ))
            })?,
            Err(_) => GstConfig::default().b2c_large_threshold,
        };

        let business_utc_offset_minutes = env::var("BUSINESS_UTC_OFFSET_MINUTES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_UTC_OFFSET_MINUTES);
        if business_utc_offset_minutes.abs() >= 24 * 60 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "BUSINESS_UTC_OFFSET_MINUTES must be within +/- 1439"
            )));
        }

        Ok(Self {
            common,
            service_name: env::var("SERVICE_NAME")
                .unwrap_or_else(|_| "fiscal-service".to_string()),
            service_version: env::var("SERVICE_VERSION")
                .unwrap_or_else(|_| env!("CARGO_PKG_VERSION").to_string()),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            otlp_endpoint: env::var("OTLP_ENDPOINT").ok().filter(|s| !s.is_empty()),
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| {
                    AppError::ConfigError(anyhow::anyhow!("DATABASE_URL is required"))
                })?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(2),
            },
            gst: GstConfig {
                seller_state_code: env::var("GST_SELLER_STATE_CODE")
                    .ok()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
                b2c_large_threshold,
            },
            sequence: SequenceConfig {
                max_attempts: env::var("SEQUENCE_MAX_ATTEMPTS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(SequenceConfig::default().max_attempts),
            },
            business_utc_offset_minutes,
        })
    }

    /// Settings for tests and local runs that never touch the environment.
    pub fn for_tests() -> Self {
        Self {
            common: core_config::Config {
                port: 0,
                ..Default::default()
            },
            service_name: "fiscal-service".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            log_level: "debug".to_string(),
            otlp_endpoint: None,
            database: DatabaseConfig {
                url: String::new(),
                max_connections: 5,
                min_connections: 1,
            },
            gst: GstConfig::default(),
            sequence: SequenceConfig::default(),
            business_utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
        }
    }
}
