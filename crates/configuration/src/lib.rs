use crate::error::ConfigError;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{Config, Dataset, StudyDefaults};

/// Loads the application configuration from the `config.toml` file.
///
/// This function is the primary entry point for this crate. It reads the
/// configuration file, layers `EVENTLAB__`-prefixed environment variables on
/// top, and deserializes the result into our strongly-typed `Config` struct.
pub fn load_config() -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        // Tells the builder to look for a file named `config.toml`
        .add_source(config::File::with_name("config.toml"))
        // Environment overrides, e.g. EVENTLAB__STUDY__WINDOW=10
        .add_source(config::Environment::with_prefix("EVENTLAB").separator("__"))
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    validate(&config)?;

    Ok(config)
}

/// Rejects parameter combinations the engine would refuse at run time.
fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.study.window == 0 {
        return Err(ConfigError::ValidationError(
            "study.window must be at least 1 trading day".to_string(),
        ));
    }
    if let (Some(lo), Some(hi)) = (config.study.start_date, config.study.end_date) {
        if lo > hi {
            return Err(ConfigError::ValidationError(format!(
                "study.start_date {lo} is after study.end_date {hi}"
            )));
        }
    }
    Ok(())
}
