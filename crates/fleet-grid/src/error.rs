//! Grid-subsystem error type.

use thiserror::Error;

/// Errors produced by `fleet-grid`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GridError {
    #[error("invalid grid dimensions {cols}x{rows} with cell size {cell_size}")]
    InvalidDimensions { cols: u32, rows: u32, cell_size: f64 },
}

pub type GridResult<T> = Result<T, GridError>;
