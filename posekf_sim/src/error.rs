// posekf_sim/src/error.rs

use posekf_core::error::EstimationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("scenario file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to load scenario: {0}")]
    Load(#[from] Box<figment::Error>),

    #[error("invalid scenario: {0}")]
    Invalid(String),

    #[error("failed to serialize scenario: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Estimation(#[from] EstimationError),

    #[error("invalid noise distribution: {0}")]
    Noise(#[from] rand_distr::NormalError),
}
