pub mod rpc_tool;
pub mod text_tool;

use revive_core::ClusterDescription;

use crate::error::{ParseError, ParseResult};

pub use rpc_tool::RpcToolParser;
pub use text_tool::TextToolParser;

/// Which admin tool produced the revive payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// Free-form `admintools -t revive_db --display-only` output.
    TextTool,
    /// `vcluster revive_db --display-only` cluster config document.
    RpcTool,
}

impl PayloadFormat {
    pub fn label(&self) -> &'static str {
        match self {
            PayloadFormat::TextTool => "admintools",
            PayloadFormat::RpcTool => "vcluster",
        }
    }
}

/// Decodes a revive payload into a [`ClusterDescription`].
///
/// Accessors are only meaningful after a successful [`parse`](Self::parse).
pub trait ClusterConfigParser: Send {
    fn parse(&mut self, payload: &str) -> ParseResult<()>;

    fn description(&self) -> &ClusterDescription;

    fn database_name(&self) -> &str {
        &self.description().database_name
    }

    /// Logical shard count found in the payload.
    fn num_shards(&self) -> ParseResult<u32> {
        self.description()
            .shard_count
            .ok_or_else(|| ParseError::ShardCount(String::new()))
    }

    fn catalog_paths(&self) -> Vec<String> {
        self.description().catalog_paths()
    }

    fn data_paths(&self) -> Vec<String> {
        self.description().data_paths()
    }

    fn depot_paths(&self) -> Vec<String> {
        self.description().depot_paths()
    }
}

/// Build an empty parser for the given payload format.
pub fn parser_for(format: PayloadFormat) -> Box<dyn ClusterConfigParser> {
    match format {
        PayloadFormat::TextTool => Box::new(TextToolParser::new()),
        PayloadFormat::RpcTool => Box::new(RpcToolParser::new()),
    }
}
