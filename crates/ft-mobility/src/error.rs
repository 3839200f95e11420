use ft_spatial::SpatialError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MobilityError {
    #[error("planning failed: {0}")]
    Planning(#[from] SpatialError),

    #[error("invalid motion parameters: {0}")]
    InvalidParams(String),
}

pub type MobilityResult<T> = Result<T, MobilityError>;
