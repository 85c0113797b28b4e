use std::fmt;

/// Machine-readable error codes for agent-friendly decision making.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    EmptyGraph,
    DanglingEdge,
    DuplicateNode,
    SelfLoop,
    InvalidConfig,
    ConfigParseError,
    InputParseError,
    ComputationTimeout,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::EmptyGraph => "E2001",
            Self::DanglingEdge => "E2002",
            Self::DuplicateNode => "E2003",
            Self::SelfLoop => "E2004",
            Self::InvalidConfig => "E1001",
            Self::ConfigParseError => "E1002",
            Self::InputParseError => "E1003",
            Self::ComputationTimeout => "E4001",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyGraph => "No usable node records",
            Self::DanglingEdge => "Edge references a missing node",
            Self::DuplicateNode => "Duplicate node id with conflicting kind",
            Self::SelfLoop => "Edge connects a node to itself",
            Self::InvalidConfig => "Invalid configuration value",
            Self::ConfigParseError => "Config file parse error",
            Self::InputParseError => "Input records parse error",
            Self::ComputationTimeout => "Layout time budget exceeded",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators and agents.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::EmptyGraph => Some("Supply at least one well-formed node record."),
            Self::DanglingEdge => {
                Some("Include every edge endpoint in the node records, or drop the edge.")
            }
            Self::DuplicateNode => Some("Give each node id a single kind (member or organization)."),
            Self::SelfLoop => Some("Remove edges whose source and target are the same node."),
            Self::InvalidConfig => Some("Run `boardnet config` to see valid defaults."),
            Self::ConfigParseError => Some("Fix syntax in the TOML config file and retry."),
            Self::InputParseError => {
                Some("Input must be a JSON object with `nodes` and `edges` arrays.")
            }
            Self::ComputationTimeout => {
                Some("Raise `layout.time_budget_ms` or lower `layout.iterations`.")
            }
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Construction-time failures of [`crate::graph::build_graph`].
///
/// All of these are fatal for the analysis run: no partial graph is built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// No node records survived validation.
    #[error("graph has no usable nodes")]
    EmptyGraph,

    /// An edge references a node id that is not in the node set.
    #[error("edge {source_id} -> {target_id} references missing node {missing}")]
    DanglingEdge {
        source_id: String,
        target_id: String,
        missing: String,
    },

    /// Two node records share an id but disagree on kind.
    #[error("node {id} submitted as both {first} and {second}")]
    DuplicateNode {
        id: String,
        first: String,
        second: String,
    },

    /// An edge has identical endpoints.
    #[error("edge on node {0} is a self-loop")]
    SelfLoop(String),
}

impl GraphError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::EmptyGraph => ErrorCode::EmptyGraph,
            Self::DanglingEdge { .. } => ErrorCode::DanglingEdge,
            Self::DuplicateNode { .. } => ErrorCode::DuplicateNode,
            Self::SelfLoop(_) => ErrorCode::SelfLoop,
        }
    }
}

/// An out-of-range or inconsistent configuration value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A numeric option is outside its permitted range.
    #[error("{field} = {value} is out of range ({expected})")]
    OutOfRange {
        field: &'static str,
        value: f64,
        expected: &'static str,
    },

    /// A required string option is empty.
    #[error("{0} must not be empty")]
    Empty(&'static str),
}

impl ConfigError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        ErrorCode::InvalidConfig
    }
}
