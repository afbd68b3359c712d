//! Revive compatibility planner.
//!
//! When a detached database is revived into a managed cluster, the planner
//! reads the `--display-only` output of the admin tool, works out the
//! catalog, data and depot directories the database actually uses, and
//! reconciles the declared target spec with them.
//!
//! # Components
//!
//! - **`parsers`** — admintools (text) and vcluster (JSON) payload parsers
//! - **`common_path`** — reduction of per-node paths to one shared directory
//! - **`planner`** — compatibility check and target spec reconciliation
//! - **`report`** — human-readable plan report

pub mod common_path;
pub mod error;
pub mod parsers;
pub mod planner;
pub mod report;

pub use common_path::NodePathConvention;
pub use error::{ParseError, ParseResult, PayloadBlock, PlanError, PlanResult};
pub use parsers::{ClusterConfigParser, PayloadFormat, RpcToolParser, TextToolParser, parser_for};
pub use planner::Planner;
