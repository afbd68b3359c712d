//! Parser for the cluster config document printed by
//! `vcluster revive_db --display-only`.

use revive_core::{ClusterDescription, NodeInfo, StorageUsage};
use serde::Deserialize;

use super::ClusterConfigParser;
use crate::error::{ParseError, ParseResult, PayloadBlock};

/// Subdirectory the catalog lives in below the per-node catalog path.
const CATALOG_SUBDIR: &str = "Catalog";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ClusterConfig {
    #[serde(default)]
    database: DatabaseInfo,
    /// Includes the replica shard, one more than the logical count.
    #[serde(default)]
    shard_count: i64,
    #[serde(default)]
    node: Vec<Node>,
    #[serde(default)]
    storage_location: Vec<StorageLocation>,
}

#[derive(Debug, Default, Deserialize)]
struct DatabaseInfo {
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Node {
    #[serde(default)]
    name: String,
    #[serde(default)]
    oid: u64,
    #[serde(default)]
    catalog_path: String,
}

#[derive(Debug, Deserialize)]
struct StorageLocation {
    #[serde(default)]
    path: String,
    #[serde(default)]
    usage: i64,
    /// Oid of the node owning the location; 0 for communal storage.
    #[serde(default)]
    site: u64,
}

/// Parser for the vcluster JSON payload. Each call to `parse` decodes the
/// document afresh.
#[derive(Debug, Default)]
pub struct RpcToolParser {
    raw_shard_count: i64,
    description: ClusterDescription,
}

impl RpcToolParser {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ClusterConfigParser for RpcToolParser {
    fn parse(&mut self, payload: &str) -> ParseResult<()> {
        let config: ClusterConfig = serde_json::from_str(payload).map_err(|source| {
            ParseError::Decode {
                block: PayloadBlock::ClusterConfig,
                source,
            }
        })?;

        let nodes = config
            .node
            .iter()
            .map(|n| {
                let mut node = NodeInfo::new(&n.name, &strip_catalog_subdir(&n.catalog_path));
                for loc in config.storage_location.iter().filter(|l| l.site == n.oid) {
                    if let Some(usage) = StorageUsage::from_code(loc.usage) {
                        node.add_storage(&loc.path, usage);
                    }
                }
                node
            })
            .collect();

        self.raw_shard_count = config.shard_count;
        self.description = ClusterDescription {
            database_name: config.database.name,
            shard_count: config
                .shard_count
                .checked_sub(1)
                .and_then(|n| u32::try_from(n).ok()),
            nodes,
        };
        Ok(())
    }

    fn description(&self) -> &ClusterDescription {
        &self.description
    }

    fn num_shards(&self) -> ParseResult<u32> {
        self.description
            .shard_count
            .ok_or_else(|| ParseError::ShardCount(self.raw_shard_count.to_string()))
    }
}

/// `/data/db/v_db_node0001_catalog/Catalog` -> `/data/db/v_db_node0001_catalog`
fn strip_catalog_subdir(path: &str) -> String {
    match path.rsplit_once('/') {
        Some((dir, CATALOG_SUBDIR)) => dir.to_string(),
        _ => path.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = include_str!("../../tests/fixtures/vcluster_display_only.json");

    #[test]
    fn parses_vcluster_output() {
        let mut parser = RpcToolParser::new();
        parser.parse(SAMPLE).unwrap();
        assert_eq!(parser.database_name(), "vertdb");
        assert_eq!(parser.num_shards().unwrap(), 6);

        let depot = parser.depot_paths();
        assert_eq!(depot.len(), 3);
        assert!(depot.contains(&"/depot/vertdb/v_vertdb_node0002_depot".to_string()));

        let data = parser.data_paths();
        assert_eq!(data.len(), 3);
        assert!(data.contains(&"/data/vertdb/v_vertdb_node0003_data".to_string()));

        assert_eq!(
            parser.catalog_paths(),
            vec![
                "/data/vertdb/v_vertdb_node0001_catalog".to_string(),
                "/data/vertdb/v_vertdb_node0002_catalog".to_string(),
                "/data/vertdb/v_vertdb_node0003_catalog".to_string(),
            ]
        );
    }

    #[test]
    fn communal_location_is_not_assigned_to_nodes() {
        let mut parser = RpcToolParser::new();
        parser.parse(SAMPLE).unwrap();
        assert!(
            parser
                .data_paths()
                .iter()
                .chain(parser.depot_paths().iter())
                .all(|p| !p.starts_with("/communal"))
        );
    }

    #[test]
    fn missing_shard_count_is_an_error() {
        let mut parser = RpcToolParser::new();
        parser.parse(r#"{"Database": {"name": "db"}}"#).unwrap();
        assert!(matches!(parser.num_shards(), Err(ParseError::ShardCount(raw)) if raw == "0"));
    }

    #[test]
    fn out_of_range_shard_count_is_an_error() {
        let mut parser = RpcToolParser::new();
        parser
            .parse(r#"{"ShardCount": -9223372036854775808}"#)
            .unwrap();
        assert!(matches!(
            parser.num_shards(),
            Err(ParseError::ShardCount(raw)) if raw == i64::MIN.to_string()
        ));

        parser.parse(r#"{"ShardCount": 9223372036854775807}"#).unwrap();
        assert!(matches!(parser.num_shards(), Err(ParseError::ShardCount(_))));
    }

    #[test]
    fn malformed_document_is_a_decode_error() {
        let mut parser = RpcToolParser::new();
        let err = parser.parse("{\"ShardCount\": ").unwrap_err();
        assert!(matches!(
            err,
            ParseError::Decode {
                block: PayloadBlock::ClusterConfig,
                ..
            }
        ));
    }

    #[test]
    fn catalog_subdir_is_stripped_only_when_present() {
        assert_eq!(
            strip_catalog_subdir("/data/db/v_db_node0001_catalog/Catalog"),
            "/data/db/v_db_node0001_catalog"
        );
        assert_eq!(
            strip_catalog_subdir("/data/db/v_db_node0001_catalog"),
            "/data/db/v_db_node0001_catalog"
        );
    }
}
