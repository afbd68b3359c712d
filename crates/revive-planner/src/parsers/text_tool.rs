//! Parser for `admintools -t revive_db --display-only` output.
//!
//! The output is free-form text with two embedded JSON records. Each record
//! sits between a start marker line and an end marker line:
//!
//! ```text
//! == Communal location details: ==
//! { "num_shards": "6", ... }
//! Cluster lease expiration: 2023-09-07 18:10:35
//!
//! == Database and node details: ==
//! { "name": "vertdb", "nodes": [ ... ] }
//! == ...
//! ```

use revive_core::{ClusterDescription, NodeInfo, StorageUsage};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::ClusterConfigParser;
use crate::error::{ParseError, ParseResult, PayloadBlock};

/// Start and end marker of one embedded block. Leading whitespace on a
/// line is ignored when matching either marker.
struct BlockMarkers {
    start: &'static str,
    end: &'static str,
}

const COMMUNAL_LOCATION_MARKERS: BlockMarkers = BlockMarkers {
    start: "== Communal location details: ==",
    end: "Cluster lease expiration:",
};

const DATABASE_DETAILS_MARKERS: BlockMarkers = BlockMarkers {
    start: "== Database and node details: ==",
    end: "== ",
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Searching,
    Capturing,
}

// The structs below mirror what admintools prints. Only the fields the
// planner needs are decoded, everything else is ignored.

#[derive(Debug, Default, Deserialize)]
struct CommunalLocation {
    #[serde(default)]
    communal_storage_url: String,
    #[serde(default)]
    num_shards: String,
}

#[derive(Debug, Default, Deserialize)]
struct Database {
    #[serde(default)]
    name: String,
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    #[serde(default)]
    name: String,
    #[serde(default, rename = "catalogpath")]
    catalog_path: String,
    #[serde(default, rename = "_vstorage_locations")]
    storage_locations: Vec<StorageLocation>,
}

#[derive(Debug, Deserialize)]
struct StorageLocation {
    #[serde(default)]
    path: String,
    #[serde(default)]
    usage: i64,
}

/// Parser for the admintools text payload.
///
/// Parsing happens once: after a successful [`parse`](ClusterConfigParser::parse)
/// later calls return immediately and keep the first result. The flag is a
/// memo, not a lock; concurrent callers must synchronize externally.
#[derive(Debug, Default)]
pub struct TextToolParser {
    parsed: bool,
    raw_num_shards: String,
    description: ClusterDescription,
}

impl TextToolParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already known description. The parser counts as parsed, so
    /// any later `parse` call is a no-op.
    pub fn from_description(description: ClusterDescription) -> Self {
        Self {
            parsed: true,
            raw_num_shards: description
                .shard_count
                .map(|n| n.to_string())
                .unwrap_or_default(),
            description,
        }
    }

    pub fn is_parsed(&self) -> bool {
        self.parsed
    }
}

impl ClusterConfigParser for TextToolParser {
    fn parse(&mut self, payload: &str) -> ParseResult<()> {
        if self.parsed {
            return Ok(());
        }

        let communal: CommunalLocation = decode_block(
            payload,
            &COMMUNAL_LOCATION_MARKERS,
            PayloadBlock::CommunalLocation,
        )?;
        let database: Database =
            decode_block(payload, &DATABASE_DETAILS_MARKERS, PayloadBlock::DatabaseDetails)?;

        debug!(
            communal_storage_url = %communal.communal_storage_url,
            nodes = database.nodes.len(),
            "decoded admintools revive output"
        );

        let nodes = database
            .nodes
            .into_iter()
            .map(|n| {
                let mut node = NodeInfo::new(&n.name, &n.catalog_path);
                for loc in &n.storage_locations {
                    if let Some(usage) = StorageUsage::from_code(loc.usage) {
                        node.add_storage(&loc.path, usage);
                    }
                }
                node
            })
            .collect();

        self.description = ClusterDescription {
            database_name: database.name,
            shard_count: communal.num_shards.trim().parse().ok(),
            nodes,
        };
        self.raw_num_shards = communal.num_shards;
        self.parsed = true;
        Ok(())
    }

    fn description(&self) -> &ClusterDescription {
        &self.description
    }

    fn num_shards(&self) -> ParseResult<u32> {
        self.description
            .shard_count
            .ok_or_else(|| ParseError::ShardCount(self.raw_num_shards.clone()))
    }
}

/// Decode the JSON record inside a block. A block that is absent, or
/// present but empty, decodes to the default value.
fn decode_block<T>(payload: &str, markers: &BlockMarkers, block: PayloadBlock) -> ParseResult<T>
where
    T: DeserializeOwned + Default,
{
    match extract_block(payload, markers) {
        Some(raw) if !raw.trim().is_empty() => {
            serde_json::from_str(&raw).map_err(|source| ParseError::Decode { block, source })
        }
        _ => Ok(T::default()),
    }
}

/// Single pass over the payload lines. Returns the lines between the first
/// start marker and the next end marker, or `None` if the start marker never
/// appears. A block left open at end of input keeps what was captured.
fn extract_block(payload: &str, markers: &BlockMarkers) -> Option<String> {
    let mut state = ScanState::Searching;
    let mut captured = String::new();

    for line in payload.lines() {
        let trimmed = line.trim_start();
        match state {
            ScanState::Searching => {
                if trimmed.starts_with(markers.start) {
                    state = ScanState::Capturing;
                }
            }
            ScanState::Capturing => {
                if trimmed.starts_with(markers.end) {
                    return Some(captured);
                }
                captured.push_str(line);
                captured.push('\n');
            }
        }
    }

    match state {
        ScanState::Searching => None,
        ScanState::Capturing => Some(captured),
    }
}
