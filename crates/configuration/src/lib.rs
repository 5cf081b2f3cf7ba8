use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use logging::init_tracing;
pub use settings::{
    Config, DataSettings, DatabaseSettings, LoggingSettings, QuerySettings, ReportSettings,
};

/// Loads the application configuration from a TOML file.
///
/// Values from the file can be overridden with `GROUPWISE__<SECTION>__<KEY>`
/// environment variables, and `DATABASE_URL` overrides `database.url`.
/// The merged result is deserialized into `Config` and validated.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::from(path.as_ref()))
        .add_source(config::Environment::with_prefix("GROUPWISE").separator("__"));

    if let Ok(url) = std::env::var("DATABASE_URL") {
        builder = builder.set_override("database.url", url)?;
    }

    let config = builder.build()?.try_deserialize::<Config>()?;
    config.validate()?;

    Ok(config)
}

/// Parses configuration from an in-memory TOML string without consulting the environment.
pub fn parse_config(toml: &str) -> Result<Config, ConfigError> {
    let config = config::Config::builder()
        .add_source(config::File::from_str(toml, config::FileFormat::Toml))
        .build()?
        .try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}
