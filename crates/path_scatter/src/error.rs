//! Error types and result alias for the crate.
//!
//! This module defines [`enum@crate::error::Error`] and the crate-wide [Result] alias. Variants cover
//! invalid configuration and paths, unresolvable content, scene host failures, and
//! ledger lookups. Per-instance placement failures are not errors; they are reported
//! through [`crate::placement::runner::SkipReason`] on the run result instead.
use thiserror::Error;

use crate::host::HostError;
use crate::ledger::GenerationId;

pub type Result<T> = std::result::Result<T, Error>;

#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid path: {0}")]
    InvalidPath(String),

    #[error("no path available for selection '{selection}'")]
    MissingPath { selection: String },

    #[error("content '{asset_id}' unavailable: {reason}")]
    Content { asset_id: String, reason: String },

    #[error(transparent)]
    Host(#[from] HostError),

    #[error("unknown generation '{0}'")]
    UnknownGeneration(GenerationId),

    #[error("generation has no placements")]
    EmptyGeneration,

    #[error("{0}")]
    Other(String),
}

impl From<String> for Error {
    fn from(value: String) -> Self {
        Error::Other(value)
    }
}

impl From<&str> for Error {
    fn from(value: &str) -> Self {
        Error::Other(value.to_owned())
    }
}
