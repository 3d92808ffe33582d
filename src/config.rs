//! TOML configuration with built-in defaults

use crate::cli::{Cli, SourceKind};
use crate::error::AppError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub source: SourceConfig,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Where prices come from and how much history to use
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourceConfig {
    pub kind: SourceKind,
    /// First day of closing-price history fed to the model
    pub start_date: NaiveDate,
    /// Directory of `<TICKER>.csv` files for the csv source
    pub csv_dir: PathBuf,
    /// Months of OHLC history drawn on the chart
    pub chart_months: u32,
    /// HTTP timeout for the yahoo source
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    pub chart_path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive. `RUST_LOG` wins when set,
    /// unless `--verbose` is given
    pub filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::Yahoo,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
            csv_dir: PathBuf::from("data"),
            chart_months: 6,
            timeout_secs: 10,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            chart_path: PathBuf::from("forecast.html"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, AppError> {
        toml::from_str(content).map_err(|e| AppError::Config(format!("invalid TOML: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self, AppError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// The file named by `--config` (or defaults), with command-line flags
    /// applied on top
    pub fn resolve(cli: &Cli) -> Result<Self, AppError> {
        let mut config = match &cli.config {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(cli);
        config.validate()?;
        Ok(config)
    }

    fn apply_overrides(&mut self, cli: &Cli) {
        if let Some(kind) = cli.source {
            self.source.kind = kind;
        }
        if let Some(start) = cli.start_date {
            self.source.start_date = start;
        }
        if let Some(dir) = &cli.csv_dir {
            self.source.csv_dir = dir.clone();
        }
        if let Some(months) = cli.chart_months {
            self.source.chart_months = months;
        }
        if let Some(path) = &cli.output {
            self.output.chart_path = path.clone();
        }
        if cli.verbose {
            self.logging.filter = "debug".to_string();
        }
    }

    fn validate(&self) -> Result<(), AppError> {
        if self.source.chart_months == 0 {
            return Err(AppError::Config(
                "source.chart_months must be at least 1".to_string(),
            ));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::Config(
                "source.timeout_secs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
