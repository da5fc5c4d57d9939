use domain::models::{AnomalyThresholds, UtilizationThresholds};
use serde::Deserialize;
use shared::period::PeriodKey;
use std::path::PathBuf;
use validator::Validate;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub input: InputConfig,
    #[serde(default)]
    pub output: OutputConfig,
    /// Anomaly battery thresholds
    #[serde(default)]
    pub anomaly: AnomalyThresholds,
    /// Utilization classification bands
    #[serde(default)]
    pub utilization: UtilizationThresholds,
    /// Contract churn aggregation
    #[serde(default)]
    pub churn: ChurnConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// JSON snapshot with the fact arrays to analyse
    #[serde(default)]
    pub snapshot_path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Write the delimited-text exports next to report.json
    #[serde(default = "default_write_csv")]
    pub write_csv: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            write_csv: default_write_csv(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChurnConfig {
    /// First month of a fixed calendar range (YYYY-MM)
    #[serde(default)]
    pub from: Option<String>,

    /// Last month of a fixed calendar range (YYYY-MM)
    #[serde(default)]
    pub to: Option<String>,

    /// Month whose contract events are exported record by record
    #[serde(default)]
    pub drill_down: Option<String>,

    #[serde(default = "default_churn_date_field")]
    pub date_field: String,

    #[serde(default = "default_churn_event_field")]
    pub event_field: String,

    #[serde(default)]
    pub value_field: Option<String>,
}

impl Default for ChurnConfig {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            drill_down: None,
            date_field: default_churn_date_field(),
            event_field: default_churn_event_field(),
            value_field: None,
        }
    }
}

impl ChurnConfig {
    /// Parsed calendar range, `None` unless both bounds are set.
    pub fn calendar_range(&self) -> Result<Option<(PeriodKey, PeriodKey)>, ConfigValidationError> {
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => Ok(Some((parse_period("churn.from", from)?, parse_period("churn.to", to)?))),
            (None, None) => Ok(None),
            _ => Err(ConfigValidationError::InvalidValue(
                "churn.from and churn.to must be set together".to_string(),
            )),
        }
    }

    pub fn drill_down_period(&self) -> Result<Option<PeriodKey>, ConfigValidationError> {
        self.drill_down
            .as_deref()
            .map(|raw| parse_period("churn.drill_down", raw))
            .transpose()
    }
}

fn parse_period(key: &str, raw: &str) -> Result<PeriodKey, ConfigValidationError> {
    raw.parse()
        .map_err(|e| ConfigValidationError::InvalidValue(format!("{}: {}", key, e)))
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports")
}
fn default_write_csv() -> bool {
    true
}
fn default_churn_date_field() -> String {
    "date".to_string()
}
fn default_churn_event_field() -> String {
    "event".to_string()
}

/// Configuration validation error
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with FLEET__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("FLEET").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration from embedded defaults plus overrides, without
    /// touching config files or validating.
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [logging]
            level = "info"
            format = "json"

            [input]
            snapshot_path = ""

            [output]
            dir = "reports"
            write_csv = true

            [anomaly]
            stale_after_days = 7
            cost_outlier_multiplier = 3.0
            max_rework_transitions = 2
            supplier_rework_rate_pct = 20.0

            [utilization]
            excellent_pct = 80.0
            good_pct = 60.0
            warning_pct = 40.0

            [churn]
            date_field = "date"
            event_field = "event"
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));

        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.input.snapshot_path.trim().is_empty() {
            return Err(ConfigValidationError::MissingRequired(
                "FLEET__INPUT__SNAPSHOT_PATH environment variable must be set".to_string(),
            ));
        }

        self.anomaly
            .validate()
            .map_err(|e| ConfigValidationError::InvalidValue(format!("anomaly: {}", e)))?;
        self.utilization
            .validate()
            .map_err(|e| ConfigValidationError::InvalidValue(format!("utilization: {}", e)))?;

        if let Some((from, to)) = self.churn.calendar_range()? {
            shared::validation::validate_period_range(from, to)
                .map_err(|e| ConfigValidationError::InvalidValue(format!("churn: {}", e)))?;
        }
        self.churn.drill_down_period()?;

        Ok(())
    }

    pub fn snapshot_path(&self) -> PathBuf {
        PathBuf::from(&self.input.snapshot_path)
    }
}
