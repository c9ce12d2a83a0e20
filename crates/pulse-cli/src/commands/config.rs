//! `pulse config show` and `pulse config path`

use anyhow::Result;
use pulse_core::Config;

/// Print the effective configuration with the API key redacted.
///
/// # Errors
///
/// Returns an error if the configuration cannot be serialized.
pub fn show(config: &Config) -> Result<()> {
    print!("{}", config.to_redacted_toml()?);
    Ok(())
}

/// Print where the configuration file is read from.
///
/// # Errors
///
/// Returns an error if the platform config directory cannot be determined.
pub fn show_path() -> Result<()> {
    println!("{}", Config::config_path()?.display());
    Ok(())
}
