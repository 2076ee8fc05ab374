//! Planning-subsystem error type.

use thiserror::Error;

use fleet_grid::GridError;

/// Errors produced by `fleet-plan`.
///
/// "No path" is not an error: it is reported per agent through
/// `PlanDiagnostics::found`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("invalid plan request: {0}")]
    InvalidRequest(String),

    #[error("planning grid of {cols}x{rows} cells exceeds the {limit}-cell limit")]
    GridTooLarge { cols: u64, rows: u64, limit: u64 },

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type PlanResult<T> = Result<T, PlanError>;
