//! Spatial-subsystem error type.

use thiserror::Error;

use crate::GridCell;

/// Errors produced by `ft-spatial`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SpatialError {
    #[error("no path from {from} to {to}")]
    NoPath { from: GridCell, to: GridCell },

    #[error("no free cell within {radius} cells of {cell}")]
    NoFreeCell { cell: GridCell, radius: i32 },

    #[error("invalid floor plan: {0}")]
    InvalidFloor(String),
}

pub type SpatialResult<T> = Result<T, SpatialError>;
