use crate::error::ConfigError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database: DatabaseSettings,
    pub data: DataSettings,
    #[serde(default)]
    pub queries: QuerySettings,
    #[serde(default)]
    pub report: ReportSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Connection settings for the persisted sales store.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseSettings {
    /// A sqlx connection string, e.g. `sqlite://database.db`.
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

/// Locations and parsing rules for the raw CSV inputs.
#[derive(Debug, Clone, Deserialize)]
pub struct DataSettings {
    pub invoices_csv: PathBuf,
    pub assignments_csv: PathBuf,
    /// `chrono` format of the `datepaid` column.
    #[serde(default = "default_date_format")]
    pub date_format: String,
    /// Records paid before this date are dropped during cleaning.
    pub analysis_start_date: Option<NaiveDate>,
    /// Records paid after this date are dropped during cleaning.
    pub analysis_end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct QuerySettings {
    /// SQL script with `-- Query name:` sections. The bundled catalog is used when unset.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportSettings {
    pub output_dir: PathBuf,
    /// Alpha used to label a t-test result as significant.
    pub significance_level: f64,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            significance_level: 0.05,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive when `RUST_LOG` is not set, e.g. "info" or "debug".
    pub level: String,
    /// Optional log file. It is truncated on every start.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

fn default_date_format() -> String {
    "%m/%d/%Y".to_string()
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let alpha = self.report.significance_level;
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "report.significance_level must be within (0, 1), got {alpha}"
            )));
        }

        if let (Some(start), Some(end)) = (self.data.analysis_start_date, self.data.analysis_end_date) {
            if start > end {
                return Err(ConfigError::ValidationError(format!(
                    "data.analysis_start_date ({start}) is after data.analysis_end_date ({end})"
                )));
            }
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::ValidationError(
                "database.max_connections must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
