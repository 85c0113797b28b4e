//! Typed data model for board networks.
//!
//! # Overview
//!
//! Two layers live here:
//!
//! - **Records** ([`NodeRecord`], [`EdgeRecord`]) are what the data-access
//!   layer hands us. They are deliberately loose: kinds and relationship
//!   types are strings and attributes are raw JSON scalars.
//! - **Model types** ([`Node`], [`Edge`], [`Attributes`]) are what the
//!   layout and analytics code sees. Everything is a closed enum or a typed
//!   scalar; no untyped JSON crosses into the core.
//!
//! [`crate::graph::build_graph`] is the only place records are converted
//! into model types.
//!
//! # Attribute schema
//!
//! Attributes follow schema version [`ATTRIBUTE_SCHEMA_VERSION`]. The
//! well-known keys in [`keys`] have a fixed scalar type; any other key may
//! carry any scalar. Attributes are used for display and clustering only and
//! never feed layout math.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Version of the attribute schema understood by this crate.
pub const ATTRIBUTE_SCHEMA_VERSION: u32 = 1;

/// Well-known attribute keys (schema v1).
pub mod keys {
    /// Display name (text).
    pub const NAME: &str = "name";
    /// Board role, e.g. "chair" (text).
    pub const ROLE: &str = "role";
    /// Industry sector (text).
    pub const INDUSTRY: &str = "industry";
    /// Tenure in years (number).
    pub const TENURE: &str = "tenure";
}

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque unique node identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(String);

impl NodeId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for NodeId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Dense edge identifier, assigned in first-submission order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(pub usize);

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "e{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Closed enums
// ---------------------------------------------------------------------------

/// Returned when a string does not name a known enum variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {what}: {value:?}")]
pub struct UnknownVariant {
    pub what: &'static str,
    pub value: String,
}

/// What a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Member,
    Organization,
}

impl NodeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "member",
            Self::Organization => "organization",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "member" | "person" => Ok(Self::Member),
            "organization" | "organisation" | "org" => Ok(Self::Organization),
            _ => Err(UnknownVariant {
                what: "node kind",
                value: s.to_string(),
            }),
        }
    }
}

/// Relationship category carried by an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    SharedBoard,
    Financial,
    Family,
    Competitive,
    Advisory,
    Other,
}

impl RelationshipType {
    pub const ALL: [Self; 6] = [
        Self::SharedBoard,
        Self::Financial,
        Self::Family,
        Self::Competitive,
        Self::Advisory,
        Self::Other,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SharedBoard => "shared_board",
            Self::Financial => "financial",
            Self::Family => "family",
            Self::Competitive => "competitive",
            Self::Advisory => "advisory",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownVariant {
                what: "relationship type",
                value: s.to_string(),
            })
    }
}

// ---------------------------------------------------------------------------
// Attributes
// ---------------------------------------------------------------------------

/// A typed scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Bool(bool),
    Integer(i64),
    Number(f64),
    Text(String),
}

impl AttributeValue {
    /// Convert a raw JSON value, rejecting arrays, objects, and null.
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Bool(b) => Some(Self::Bool(*b)),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Self::Integer)
                .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(Self::Number)),
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(i) => Some(*i as f64),
            Self::Number(f) => Some(*f),
            _ => None,
        }
    }

    const fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }

    const fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer(_) | Self::Number(_))
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Integer(i) => write!(f, "{i}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// Typed attribute bag attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Attributes(BTreeMap<String, AttributeValue>);

impl Attributes {
    /// Parse raw JSON attributes for `node_id`, dropping invalid entries.
    ///
    /// Non-scalar values and well-known keys with the wrong scalar type are
    /// skipped with a warning.
    #[must_use]
    pub fn from_raw(node_id: &str, raw: &BTreeMap<String, serde_json::Value>) -> Self {
        let mut values = BTreeMap::new();
        for (key, value) in raw {
            let Some(parsed) = AttributeValue::from_json(value) else {
                warn!(node = node_id, key = %key, "dropping non-scalar attribute");
                continue;
            };
            let well_typed = match key.as_str() {
                keys::NAME | keys::ROLE | keys::INDUSTRY => parsed.is_text(),
                keys::TENURE => parsed.is_numeric(),
                _ => true,
            };
            if !well_typed {
                warn!(node = node_id, key = %key, "dropping attribute with wrong type");
                continue;
            }
            values.insert(key.clone(), parsed);
        }
        Self(values)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&AttributeValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.get(keys::NAME).and_then(AttributeValue::as_text)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add keys from `other` that are not already present.
    pub(crate) fn merge_missing(&mut self, other: Self) {
        for (key, value) in other.0 {
            self.0.entry(key).or_insert(value);
        }
    }
}

impl<K: Into<String>> FromIterator<(K, AttributeValue)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, AttributeValue)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

// ---------------------------------------------------------------------------
// Nodes and edges
// ---------------------------------------------------------------------------

/// A board member or organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Attributes::is_empty")]
    pub attributes: Attributes,
}

/// A typed, weighted relationship between two nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub relationship_type: RelationshipType,
    /// Relationship strength in `[0, 1]`.
    pub strength: f64,
    /// Provenance quality in `[0, 1]`.
    pub confidence: f64,
}

impl Edge {
    /// The endpoint opposite `node`, or `None` if `node` is not an endpoint.
    #[must_use]
    pub fn other(&self, node: &NodeId) -> Option<&NodeId> {
        if &self.source == node {
            Some(&self.target)
        } else if &self.target == node {
            Some(&self.source)
        } else {
            None
        }
    }

    /// Whether this edge connects `a` and `b` in either orientation.
    #[must_use]
    pub fn connects(&self, a: &NodeId, b: &NodeId) -> bool {
        (&self.source == a && &self.target == b) || (&self.source == b && &self.target == a)
    }
}

// ---------------------------------------------------------------------------
// Records (data-layer boundary)
// ---------------------------------------------------------------------------

/// A raw node record supplied by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub kind: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl NodeRecord {
    #[must_use]
    pub fn new(id: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            kind: kind.as_str().to_string(),
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// A raw edge record supplied by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    #[serde(alias = "sourceId", alias = "source")]
    pub source_id: String,
    #[serde(alias = "targetId", alias = "target")]
    pub target_id: String,
    #[serde(alias = "relationshipType", alias = "type")]
    pub relationship_type: String,
    pub strength: f64,
    /// Provenance quality in `[0, 1]`. Unrated edges are treated as
    /// [`EdgeRecord::UNRATED_CONFIDENCE`] when the graph is built.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
}

impl EdgeRecord {
    /// Confidence assumed for a record that carries none. No conflict rule
    /// acts on such an edge.
    pub const UNRATED_CONFIDENCE: f64 = 0.0;

    #[must_use]
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: RelationshipType,
        strength: f64,
        confidence: f64,
    ) -> Self {
        Self {
            source_id: source.into(),
            target_id: target.into(),
            relationship_type: relationship_type.as_str().to_string(),
            strength,
            confidence: Some(confidence),
        }
    }
}

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// A point in layout space. 2D layouts keep `z = 0`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Position {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        z: 0.0,
    };

    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }

    /// Arithmetic mean of `points`, or the origin when empty.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Self>) -> Self {
        let mut sum = Self::ORIGIN;
        let mut count = 0usize;
        for p in points {
            sum.x += p.x;
            sum.y += p.y;
            sum.z += p.z;
            count += 1;
        }
        if count == 0 {
            return Self::ORIGIN;
        }
        let n = count as f64;
        Self::new(sum.x / n, sum.y / n, sum.z / n)
    }
}
