use fleet_core::{AgentId, CoreError};
use fleet_grid::GridError;
use thiserror::Error;

/// Errors produced by `fleet-motion`.
///
/// A rejected command leaves every boat untouched.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MotionError {
    #[error("unknown agent {0}")]
    UnknownAgent(AgentId),

    #[error("agent {0} has no destination to dock at")]
    NoDestination(AgentId),

    #[error("boat ids must be dense from 0: expected {expected}, found {found}")]
    NonDenseIds { expected: AgentId, found: AgentId },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

pub type MotionResult<T> = Result<T, MotionError>;
