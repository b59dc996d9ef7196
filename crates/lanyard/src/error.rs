use physics::PhysicsError;
use thiserror::Error;

use crate::scene::ChainId;

/// Failures scoped to one chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChainError {
    #[error("failed to allocate {what} for chain: {source}")]
    Allocation {
        what: &'static str,
        #[source]
        source: PhysicsError,
    },
    #[error("chain has already been destroyed")]
    Destroyed,
    #[error("unknown chain {0}")]
    UnknownChain(ChainId),
    #[error(transparent)]
    Physics(#[from] PhysicsError),
}

/// Failures parsing or validating upstream records.
#[derive(Error, Debug)]
pub enum RecordError {
    #[error("record feed must be a JSON array")]
    NotAList,
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
    #[error("record field `{field}` is invalid: {reason}")]
    InvalidField { field: &'static str, reason: String },
    #[error("malformed record JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(&'static str),
}
