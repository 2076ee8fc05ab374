//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CoreError` as one
//! variant via `#[from]`, so a bad point or config surfaces unchanged at the
//! top of the stack.

use thiserror::Error;

use crate::AgentId;

/// The top-level error type for `fleet-core` and a common base for sub-crates.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CoreError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("invalid point ({x}, {y}): coordinates must be finite")]
    InvalidPoint { x: f64, y: f64 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for all `fleet-*` crates.
pub type CoreResult<T> = Result<T, CoreError>;
