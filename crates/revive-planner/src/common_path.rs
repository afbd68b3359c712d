//! Common-path reduction over per-node paths.
//!
//! Generated per-node paths look like
//! `<prefix>/<dbname>/v_<lowercase dbname>_node####_<suffix>`. Reducing a set
//! of them yields `<prefix>`, the single directory the target spec declares.
//! Paths that do not follow the convention are user supplied and are only
//! ever cut at directory boundaries.

use regex::Regex;
use revive_core::node_prefix;

use crate::error::{PlanError, PlanResult};

/// Node-path convention for one database name.
#[derive(Debug, Clone)]
pub struct NodePathConvention {
    db_name: String,
    node_dir_prefix: String,
    pattern: Regex,
}

impl NodePathConvention {
    pub fn new(db_name: &str) -> PlanResult<Self> {
        let prefix = node_prefix(db_name);
        let pattern = Regex::new(&format!(
            r"(.*)/{}/{}_node[0-9]{{4}}_",
            regex::escape(db_name),
            regex::escape(&prefix),
        ))?;
        Ok(Self {
            db_name: db_name.to_string(),
            node_dir_prefix: format!("{prefix}_node"),
            pattern,
        })
    }

    /// Return `<prefix>` of a generated per-node path, or `None` when the
    /// path does not follow the convention.
    pub fn extract_prefix(&self, path: &str) -> Option<String> {
        self.pattern
            .captures(path)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Reduce `paths` to the single directory they share.
    ///
    /// `allowed_outlier` names a path that may appear among the inputs
    /// (verbatim or as the prefix of a generated path) without taking part
    /// in the reduction. If every path is an outlier the outlier itself is
    /// the result.
    pub fn common_path(
        &self,
        paths: &[String],
        allowed_outlier: Option<&str>,
    ) -> PlanResult<String> {
        if paths.is_empty() {
            return Err(PlanError::NoPaths);
        }

        let mut remaining = self.remove_outliers(paths, allowed_outlier);
        match remaining.as_slice() {
            [] => return Ok(allowed_outlier.unwrap_or_default().to_string()),
            [only] => {
                return Ok(self
                    .extract_prefix(only)
                    .unwrap_or_else(|| trim_trailing_slash(only).to_string()));
            }
            _ => {}
        }

        // The common prefix of a set of strings is the common prefix of its
        // lexicographic min and max.
        remaining.sort_unstable();
        let first = remaining[0];
        let last = remaining[remaining.len() - 1];

        // Walk both while they agree, but only commit up to the last '/'
        // seen so the result never ends inside a directory name.
        let mut committed = 0;
        let mut matched = 0;
        for (i, (a, b)) in first.bytes().zip(last.bytes()).enumerate() {
            if a != b {
                break;
            }
            matched = i + 1;
            if a == b'/' {
                committed = matched;
            }
        }

        if committed <= 1 {
            return Err(PlanError::NoCommonPath {
                first: first.to_string(),
                last: last.to_string(),
            });
        }

        let full = &first[..committed];
        let partial_dir = &first.as_bytes()[committed..matched];
        Ok(trim_trailing_slash(self.trim_database_dir(full, partial_dir)).to_string())
    }

    fn remove_outliers<'a>(
        &self,
        paths: &'a [String],
        allowed_outlier: Option<&str>,
    ) -> Vec<&'a str> {
        let Some(outlier) = allowed_outlier else {
            return paths.iter().map(String::as_str).collect();
        };
        paths
            .iter()
            .map(String::as_str)
            .filter(|p| *p != outlier)
            .filter(|p| self.extract_prefix(p).as_deref() != Some(outlier))
            .collect()
    }

    /// When the walk stopped inside a node directory name, drop the
    /// `/<dbname>/` directory right above it.
    fn trim_database_dir<'a>(&self, full: &'a str, partial_dir: &[u8]) -> &'a str {
        let db_dir = format!("/{}/", self.db_name);
        if partial_dir.starts_with(self.node_dir_prefix.as_bytes()) {
            if let Some(trimmed) = full.strip_suffix(db_dir.as_str()) {
                return trimmed;
            }
        }
        full
    }
}

fn trim_trailing_slash(path: &str) -> &str {
    path.strip_suffix('/').unwrap_or(path)
}
