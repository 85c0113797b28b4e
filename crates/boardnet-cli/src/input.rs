//! Network and configuration loading for CLI commands.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use boardnet_core::{AnalysisConfig, EdgeRecord, NodeRecord, load_config};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

/// Records as submitted on disk or stdin.
///
/// Entries that do not deserialize as a record are skipped with a warning;
/// only a document that is not an object of record lists fails to load.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(from = "RawNetwork")]
pub struct NetworkInput {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct RawNetwork {
    #[serde(default)]
    nodes: Vec<Value>,
    #[serde(default)]
    edges: Vec<Value>,
}

impl From<RawNetwork> for NetworkInput {
    fn from(raw: RawNetwork) -> Self {
        Self {
            nodes: records("node", raw.nodes),
            edges: records("edge", raw.edges),
        }
    }
}

fn records<T: DeserializeOwned>(what: &'static str, raw: Vec<Value>) -> Vec<T> {
    raw.into_iter()
        .enumerate()
        .filter_map(|(index, value)| match serde_json::from_value(value) {
            Ok(record) => Some(record),
            Err(err) => {
                warn!(what, index, %err, "skipping malformed record");
                None
            }
        })
        .collect()
}

impl NetworkInput {
    /// Parse a JSON document of the form `{"nodes": [...], "edges": [...]}`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid JSON or its `nodes` and
    /// `edges` are not arrays.
    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Read a network from `path`, or from stdin when `path` is `-`.
pub fn read_network(path: &Path) -> Result<NetworkInput> {
    let (content, source) = if path.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read network from stdin")?;
        (buf, "stdin".to_string())
    } else {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        (content, path.display().to_string())
    };

    let input = NetworkInput::from_json_str(&content)
        .with_context(|| format!("Failed to parse network from {source}"))?;
    debug!(
        nodes = input.nodes.len(),
        edges = input.edges.len(),
        %source,
        "network loaded"
    );
    Ok(input)
}

/// Load the configuration file if one was given, else defaults.
pub fn read_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    path.map_or_else(|| Ok(AnalysisConfig::default()), load_config)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn accepts_camel_case_edge_fields() {
        let input = NetworkInput::from_json_str(
            r#"{
                "nodes": [{"id": "a", "kind": "member"}, {"id": "b", "kind": "member"}],
                "edges": [{"sourceId": "a", "targetId": "b", "relationshipType": "family", "strength": 0.4}]
            }"#,
        )
        .expect("parse");
        assert_eq!(input.nodes.len(), 2);
        assert_eq!(input.edges[0].source_id, "a");
        assert_eq!(input.edges[0].confidence, None);
    }

    #[test]
    fn malformed_entries_are_skipped() {
        let input = NetworkInput::from_json_str(
            r#"{
                "nodes": [{"id": "a", "kind": "member"}, {"id": "c"}, {"id": "b", "kind": "member"}],
                "edges": [
                    {"source_id": "a", "target_id": "b", "relationship_type": "family", "strength": "high"},
                    {"source_id": "a", "target_id": "b", "relationship_type": "family", "strength": 0.4, "confidence": 0.9}
                ]
            }"#,
        )
        .expect("parse");
        let ids: Vec<&str> = input.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(input.edges.len(), 1);
        assert!(input.edges[0].confidence.is_some_and(|c| (c - 0.9).abs() < f64::EPSILON));
    }

    #[test]
    fn non_array_sections_still_fail() {
        assert!(NetworkInput::from_json_str(r#"{"nodes": {"id": "a"}}"#).is_err());
        assert!(NetworkInput::from_json_str("42").is_err());
    }

    #[test]
    fn missing_sections_default_to_empty() {
        let input = NetworkInput::from_json_str("{}").expect("parse");
        assert!(input.nodes.is_empty());
        assert!(input.edges.is_empty());
    }

    #[test]
    fn reports_the_file_that_failed() {
        let mut file = tempfile::NamedTempFile::new().expect("tmp");
        write!(file, "not json").expect("write");
        let err = read_network(file.path()).expect_err("invalid");
        assert!(format!("{err:#}").contains("Failed to parse network"));
    }

    #[test]
    fn no_config_path_means_defaults() {
        let config = read_config(None).expect("defaults");
        assert_eq!(config, AnalysisConfig::default());
    }
}
