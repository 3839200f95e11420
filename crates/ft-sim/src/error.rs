use std::path::PathBuf;

use ft_core::AgvId;
use ft_mobility::MobilityError;
use ft_radio::RadioError;
use ft_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("world configuration error: {0}")]
    Config(String),

    #[error("failed to read config {path}: {source}")]
    Io {
        path:   PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unknown AGV {0}")]
    UnknownAgv(AgvId),

    #[error(transparent)]
    Spatial(#[from] SpatialError),

    #[error(transparent)]
    Mobility(#[from] MobilityError),

    #[error(transparent)]
    Radio(#[from] RadioError),
}

pub type SimResult<T> = Result<T, SimError>;
