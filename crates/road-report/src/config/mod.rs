use std::env;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

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
    pub wizard: WizardConfig,
    pub storage: StorageConfig,
    pub telemetry: TelemetryConfig,
}

/// Simulated latencies accepted for the submission call.
pub const SUBMIT_LATENCY_RANGE_MS: std::ops::RangeInclusive<u64> = 1500..=2000;

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let submit_latency_ms = parse_millis("REPORT_SUBMIT_LATENCY_MS", 2000)?;
        if !SUBMIT_LATENCY_RANGE_MS.contains(&submit_latency_ms) {
            return Err(ConfigError::SubmitLatencyOutOfRange(submit_latency_ms));
        }
        let geolocation_timeout_ms = parse_millis("REPORT_GEO_TIMEOUT_MS", 10_000)?;
        let search_debounce_ms = parse_millis("REPORT_SEARCH_DEBOUNCE_MS", 300)?;

        let data_dir = env::var("REPORT_DATA_DIR").unwrap_or_else(|_| ".road-report".to_string());
        let installation_id =
            env::var("REPORT_INSTALLATION_ID").unwrap_or_else(|_| "default".to_string());
        if installation_id.trim().is_empty() {
            return Err(ConfigError::EmptyInstallationId);
        }

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            wizard: WizardConfig {
                submit_latency_ms,
                geolocation_timeout_ms,
                search_debounce_ms,
            },
            storage: StorageConfig {
                data_dir: PathBuf::from(data_dir),
                installation_id,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_millis(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidMillis { key, value: raw }),
        Err(_) => Ok(default),
    }
}

/// Timings that drive the wizard's asynchronous steps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WizardConfig {
    pub submit_latency_ms: u64,
    pub geolocation_timeout_ms: u64,
    pub search_debounce_ms: u64,
}

impl WizardConfig {
    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            submit_latency_ms: 2000,
            geolocation_timeout_ms: 10_000,
            search_debounce_ms: 300,
        }
    }
}

/// Where submitted reports are kept on this machine.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub installation_id: String,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidMillis { key: &'static str, value: String },
    SubmitLatencyOutOfRange(u64),
    EmptyInstallationId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidMillis { key, value } => {
                write!(f, "{key} must be a whole number of milliseconds, got '{value}'")
            }
            ConfigError::SubmitLatencyOutOfRange(value) => write!(
                f,
                "REPORT_SUBMIT_LATENCY_MS must be between {} and {} (got {value})",
                SUBMIT_LATENCY_RANGE_MS.start(),
                SUBMIT_LATENCY_RANGE_MS.end()
            ),
            ConfigError::EmptyInstallationId => {
                write!(f, "REPORT_INSTALLATION_ID must not be blank")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("REPORT_DATA_DIR");
        env::remove_var("REPORT_INSTALLATION_ID");
        env::remove_var("REPORT_SUBMIT_LATENCY_MS");
        env::remove_var("REPORT_GEO_TIMEOUT_MS");
        env::remove_var("REPORT_SEARCH_DEBOUNCE_MS");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.wizard, WizardConfig::default());
        assert_eq!(config.storage.installation_id, "default");
        assert_eq!(config.storage.data_dir, PathBuf::from(".road-report"));
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn rejects_submit_latency_outside_simulated_window() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_SUBMIT_LATENCY_MS", "2500");
        match AppConfig::load() {
            Err(ConfigError::SubmitLatencyOutOfRange(2500)) => {}
            other => panic!("expected latency range error, got {other:?}"),
        }
        env::set_var("REPORT_SUBMIT_LATENCY_MS", "1500");
        let config = AppConfig::load().expect("lower bound accepted");
        assert_eq!(config.wizard.submit_latency_ms, 1500);
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_timings() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("REPORT_SEARCH_DEBOUNCE_MS", "soon");
        match AppConfig::load() {
            Err(ConfigError::InvalidMillis { key, .. }) => {
                assert_eq!(key, "REPORT_SEARCH_DEBOUNCE_MS")
            }
            other => panic!("expected invalid millis error, got {other:?}"),
        }
        reset_env();
    }
}
