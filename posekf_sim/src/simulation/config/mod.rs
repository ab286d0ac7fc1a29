// posekf_sim/src/simulation/config/mod.rs

//! This module handles loading and validating scenario configuration from
//! disk. Values come from the TOML file first, then from `POSEKF_`-prefixed
//! environment variables, with `__` separating nested keys
//! (`POSEKF_SIMULATION__SEED=7`). `POSEKF_LOG_FORMAT` belongs to logging and
//! is skipped.

pub mod structs;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::Path;
use tracing::info;

use crate::error::ConfigError;
pub use structs::{CovarianceKind, ScenarioConfig};

/// Loads, merges and validates the scenario at `path`.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    info!("Loading scenario from: {}", path.display());

    let figment = base_figment()
        .merge(Toml::file(path))
        .merge(Env::prefixed("POSEKF_").ignore(&["LOG_FORMAT"]).split("__"));
    extract(figment)
}

/// Parses a scenario from an in-memory TOML document, without environment
/// overrides.
pub fn load_scenario_str(toml: &str) -> Result<ScenarioConfig, ConfigError> {
    extract(base_figment().merge(Toml::string(toml)))
}

/// The built-in defaults rendered as a scenario file.
pub fn default_scenario_toml() -> Result<String, ConfigError> {
    Ok(toml::to_string_pretty(&ScenarioConfig::default())?)
}

fn base_figment() -> Figment {
    Figment::from(Serialized::defaults(ScenarioConfig::default()))
}

fn extract(figment: Figment) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig = figment.extract().map_err(Box::new)?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use posekf_core::models::measurement::position::JacobianPolicy;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(load_scenario_str("").unwrap(), ScenarioConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = load_scenario_str(
            r#"
            [simulation]
            seed = 7

            [sensor]
            antenna_offset = [0.3, 0.0]
            jacobian = "small_offset_identity"

            [filter]
            covariance = "square_root"
            "#,
        )
        .unwrap();

        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.simulation.rate_hz, 10.0);
        assert_eq!(config.sensor.antenna_offset, [0.3, 0.0]);
        assert_eq!(config.sensor.noise_stddev, [0.02, 0.02]);
        assert_eq!(config.sensor.jacobian, JacobianPolicy::SmallOffsetIdentity);
        assert_eq!(config.filter.covariance, CovarianceKind::SquareRoot);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_scenario_str("[sensor]\nantena_offset = [0.1, 0.0]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));
    }

    #[test]
    fn validation_rejects_non_positive_rate() {
        let err = load_scenario_str("[simulation]\nrate_hz = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("rate_hz")));
    }

    #[test]
    fn default_scenario_round_trips_through_toml() {
        let rendered = default_scenario_toml().unwrap();
        assert_eq!(load_scenario_str(&rendered).unwrap(), ScenarioConfig::default());
    }

    #[test]
    fn missing_file_is_reported() {
        let err = load_scenario(Path::new("does/not/exist.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
