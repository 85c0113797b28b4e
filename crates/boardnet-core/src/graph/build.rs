//! Graph construction from data-layer records.
//!
//! # Overview
//!
//! [`build_graph`] validates node and edge records, converts them into the
//! typed model, merges duplicates, and assembles a [`BoardGraph`].
//!
//! ## Record handling
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | empty id, unknown kind or relationship type | record skipped, `warn!` |
//! | strength / confidence non-finite or outside `[0,1]` | record skipped, `warn!` |
//! | confidence missing | unrated (`0.0`), `warn!` |
//! | same node id, same kind | attributes merged (first value wins) |
//! | same node id, different kind | [`GraphError::DuplicateNode`] |
//! | edge with `source == target` | [`GraphError::SelfLoop`], whatever its weights |
//! | edge endpoint not in node set | [`GraphError::DanglingEdge`] |
//! | same unordered pair + relationship type | merged: max strength, max confidence |
//! | no node survives validation | [`GraphError::EmptyGraph`] |
//!
//! Edge orientation is kept from the first submission of a merged edge.

use std::collections::HashMap;

use petgraph::graph::{NodeIndex, UnGraph};
use tracing::{debug, instrument, warn};

use crate::error::GraphError;
use crate::graph::BoardGraph;
use crate::model::{
    Attributes, Edge, EdgeId, EdgeRecord, Node, NodeId, NodeKind, NodeRecord, RelationshipType,
};

/// Build a validated [`BoardGraph`] from raw records.
///
/// # Errors
///
/// Returns a [`GraphError`] for dangling edges, self-loops, nodes submitted
/// with conflicting kinds, or when no node record is usable. Construction
/// errors are fatal: no partial graph is returned.
#[instrument(skip_all, fields(nodes = node_records.len(), edges = edge_records.len()))]
pub fn build_graph(
    node_records: &[NodeRecord],
    edge_records: &[EdgeRecord],
) -> Result<BoardGraph, GraphError> {
    let nodes = collect_nodes(node_records)?;
    if nodes.is_empty() {
        return Err(GraphError::EmptyGraph);
    }

    let mut graph = UnGraph::<Node, Edge>::with_capacity(nodes.len(), edge_records.len());
    let mut node_map: HashMap<NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        let id = node.id.clone();
        let idx = graph.add_node(node);
        node_map.insert(id, idx);
    }

    let edges = collect_edges(edge_records, &node_map)?;
    for edge in edges {
        let a = node_map[&edge.source];
        let b = node_map[&edge.target];
        graph.add_edge(a, b, edge);
    }

    let content_hash = compute_content_hash(&graph);
    debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        %content_hash,
        "graph built"
    );

    Ok(BoardGraph {
        graph,
        node_map,
        content_hash,
    })
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

/// Validate node records, merging same-kind duplicates in first-seen order.
fn collect_nodes(records: &[NodeRecord]) -> Result<Vec<Node>, GraphError> {
    let mut nodes: Vec<Node> = Vec::with_capacity(records.len());
    let mut seen: HashMap<String, usize> = HashMap::with_capacity(records.len());

    for record in records {
        let id = record.id.trim();
        if id.is_empty() {
            warn!("skipping node record with empty id");
            continue;
        }
        let kind: NodeKind = match record.kind.parse() {
            Ok(kind) => kind,
            Err(err) => {
                warn!(node = id, %err, "skipping node record");
                continue;
            }
        };
        let attributes = Attributes::from_raw(id, &record.attributes);

        if let Some(&pos) = seen.get(id) {
            let existing = &mut nodes[pos];
            if existing.kind != kind {
                return Err(GraphError::DuplicateNode {
                    id: id.to_string(),
                    first: existing.kind.to_string(),
                    second: kind.to_string(),
                });
            }
            debug!(node = id, "merging duplicate node record");
            existing.attributes.merge_missing(attributes);
            continue;
        }

        seen.insert(id.to_string(), nodes.len());
        nodes.push(Node {
            id: NodeId::new(id),
            kind,
            attributes,
        });
    }

    Ok(nodes)
}

fn unit_interval(value: f64) -> bool {
    value.is_finite() && (0.0..=1.0).contains(&value)
}

/// Dedup key: unordered endpoint pair plus relationship type.
type EdgeKey = (NodeId, NodeId, RelationshipType);

fn edge_key(a: &NodeId, b: &NodeId, relationship_type: RelationshipType) -> EdgeKey {
    if a <= b {
        (a.clone(), b.clone(), relationship_type)
    } else {
        (b.clone(), a.clone(), relationship_type)
    }
}

/// Validate edge records against the node set and merge duplicates.
fn collect_edges(
    records: &[EdgeRecord],
    node_map: &HashMap<NodeId, NodeIndex>,
) -> Result<Vec<Edge>, GraphError> {
    let mut edges: Vec<Edge> = Vec::with_capacity(records.len());
    let mut seen: HashMap<EdgeKey, usize> = HashMap::with_capacity(records.len());

    for record in records {
        let source = record.source_id.trim();
        let target = record.target_id.trim();
        if source.is_empty() || target.is_empty() {
            warn!(source, target, "skipping edge record with empty endpoint");
            continue;
        }
        if source == target {
            return Err(GraphError::SelfLoop(source.to_string()));
        }
        let relationship_type: RelationshipType = match record.relationship_type.parse() {
            Ok(t) => t,
            Err(err) => {
                warn!(source, target, %err, "skipping edge record");
                continue;
            }
        };
        let confidence = record.confidence.unwrap_or_else(|| {
            warn!(source, target, "edge record has no confidence, treating as unrated");
            EdgeRecord::UNRATED_CONFIDENCE
        });
        if !unit_interval(record.strength) || !unit_interval(confidence) {
            warn!(
                source,
                target,
                strength = record.strength,
                confidence,
                "skipping edge record with out-of-range weight"
            );
            continue;
        }

        let source = NodeId::new(source);
        let target = NodeId::new(target);
        for endpoint in [&source, &target] {
            if !node_map.contains_key(endpoint) {
                return Err(GraphError::DanglingEdge {
                    source_id: source.to_string(),
                    target_id: target.to_string(),
                    missing: endpoint.to_string(),
                });
            }
        }

        let key = edge_key(&source, &target, relationship_type);
        if let Some(&pos) = seen.get(&key) {
            let existing = &mut edges[pos];
            existing.strength = existing.strength.max(record.strength);
            existing.confidence = existing.confidence.max(confidence);
            debug!(edge = %existing.id, "merged duplicate edge record");
            continue;
        }

        seen.insert(key, edges.len());
        edges.push(Edge {
            id: EdgeId(edges.len()),
            source,
            target,
            relationship_type,
            strength: record.strength,
            confidence,
        });
    }

    Ok(edges)
}

/// Compute a BLAKE3 hash of the canonical node and edge set.
///
/// Nodes are hashed sorted by id; edges are hashed with sorted endpoints and
/// sorted by key, so the hash is independent of submission order.
fn compute_content_hash(graph: &UnGraph<Node, Edge>) -> String {
    let mut nodes: Vec<&Node> = graph.node_weights().collect();
    nodes.sort_by(|a, b| a.id.cmp(&b.id));

    let mut edges: Vec<(EdgeKey, u64, u64)> = graph
        .edge_weights()
        .map(|e| {
            (
                edge_key(&e.source, &e.target, e.relationship_type),
                e.strength.to_bits(),
                e.confidence.to_bits(),
            )
        })
        .collect();
    edges.sort_by(|a, b| a.0.cmp(&b.0));

    let mut hasher = blake3::Hasher::new();
    for node in nodes {
        hasher.update(node.id.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(node.kind.as_str().as_bytes());
        for (key, value) in node.attributes.iter() {
            hasher.update(b"\x01");
            hasher.update(key.as_bytes());
            hasher.update(b"=");
            hasher.update(value.to_string().as_bytes());
        }
        hasher.update(b"\x00");
    }
    hasher.update(b"\x02");
    for ((a, b, t), strength, confidence) in edges {
        hasher.update(a.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(b.as_str().as_bytes());
        hasher.update(b"\x00");
        hasher.update(t.as_str().as_bytes());
        hasher.update(&strength.to_le_bytes());
        hasher.update(&confidence.to_le_bytes());
    }
    format!("blake3:{}", hasher.finalize())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
