//! Error types for payload parsing and revive planning.

use std::fmt;
use thiserror::Error;

/// Result type alias for parser operations.
pub type ParseResult<T> = Result<T, ParseError>;

/// Result type alias for planner operations.
pub type PlanResult<T> = Result<T, PlanError>;

/// Structured section of a revive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadBlock {
    /// Communal location block of the admintools output.
    CommunalLocation,
    /// Database and node details block of the admintools output.
    DatabaseDetails,
    /// Whole cluster config document returned by vcluster.
    ClusterConfig,
}

impl fmt::Display for PayloadBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadBlock::CommunalLocation => "communal location",
            PayloadBlock::DatabaseDetails => "database and node details",
            PayloadBlock::ClusterConfig => "cluster config",
        };
        f.write_str(name)
    }
}

/// Errors raised while decoding a revive payload.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("failed to decode {block} block: {source}")]
    Decode {
        block: PayloadBlock,
        #[source]
        source: serde_json::Error,
    },

    #[error("shard count in revive output is not usable: {0:?}")]
    ShardCount(String),
}

/// Errors raised while reducing node paths to a common path.
#[derive(Debug, Error)]
pub enum PlanError {
    #[error("no paths passed in")]
    NoPaths,

    #[error("multiple hosts don't have common paths: {first} and {last}")]
    NoCommonPath { first: String, last: String },

    #[error("invalid node path pattern: {0}")]
    Pattern(#[from] regex::Error),
}
