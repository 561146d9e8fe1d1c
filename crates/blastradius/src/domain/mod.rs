//! Domain types for the estate graph.
//!
//! The estate is a layered dependency graph: datacenters host servers, servers
//! run applications, and applications are used by business functions. Failure
//! flows in the same direction as the relationships.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of an entity stored in the graph.
///
/// Identity of an estate entity is `(kind, name)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EntityKind {
    /// A physical or logical datacenter
    Datacenter,

    /// A server hosted in a datacenter
    Server,

    /// An IT application running on a server
    Application,

    /// A business function that uses applications
    BusinessFunction,

    /// The singleton bookkeeping record holding summary counts
    Metadata,
}

impl EntityKind {
    /// The four estate kinds, in layering order.
    pub const ESTATE: [EntityKind; 4] = [
        EntityKind::Datacenter,
        EntityKind::Server,
        EntityKind::Application,
        EntityKind::BusinessFunction,
    ];

    /// The graph label for this kind.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Datacenter => "Datacenter",
            EntityKind::Server => "Server",
            EntityKind::Application => "Application",
            EntityKind::BusinessFunction => "BusinessFunction",
            EntityKind::Metadata => "Metadata",
        }
    }

    /// Returns `true` for the four kinds that make up the estate.
    #[must_use]
    pub fn is_estate(self) -> bool {
        self != EntityKind::Metadata
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "datacenter" | "dc" => Ok(EntityKind::Datacenter),
            "server" | "sv" => Ok(EntityKind::Server),
            "application" | "app" => Ok(EntityKind::Application),
            "businessfunction" | "business-function" | "bf" => Ok(EntityKind::BusinessFunction),
            "metadata" => Ok(EntityKind::Metadata),
            _ => Err(format!("Unknown entity kind: {s}")),
        }
    }
}

/// Kind of a directed dependency relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RelationshipKind {
    /// `Datacenter -[HOSTS]-> Server`
    Hosts,

    /// `Server -[RUNS]-> Application`
    Runs,

    /// `Application -[USES]-> BusinessFunction`
    Uses,
}

impl RelationshipKind {
    /// All relationship kinds in merge order.
    pub const ALL: [RelationshipKind; 3] = [
        RelationshipKind::Hosts,
        RelationshipKind::Runs,
        RelationshipKind::Uses,
    ];

    /// The relationship type as stored in the graph.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RelationshipKind::Hosts => "HOSTS",
            RelationshipKind::Runs => "RUNS",
            RelationshipKind::Uses => "USES",
        }
    }

    /// Kind of the entity the relationship starts from.
    #[must_use]
    pub fn source_kind(self) -> EntityKind {
        match self {
            RelationshipKind::Hosts => EntityKind::Datacenter,
            RelationshipKind::Runs => EntityKind::Server,
            RelationshipKind::Uses => EntityKind::Application,
        }
    }

    /// Kind of the entity the relationship points to.
    #[must_use]
    pub fn target_kind(self) -> EntityKind {
        match self {
            RelationshipKind::Hosts => EntityKind::Server,
            RelationshipKind::Runs => EntityKind::Application,
            RelationshipKind::Uses => EntityKind::BusinessFunction,
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HOSTS" => Ok(RelationshipKind::Hosts),
            "RUNS" => Ok(RelationshipKind::Runs),
            "USES" => Ok(RelationshipKind::Uses),
            _ => Err(format!("Unknown relationship kind: {s}")),
        }
    }
}

/// One extracted dependency link, carrying exactly the two names its kind needs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Link {
    /// A datacenter hosting a server
    DatacenterServer {
        /// Datacenter name
        datacenter: String,
        /// Server name
        server: String,
    },

    /// A server running an application
    ServerApplication {
        /// Server name
        server: String,
        /// Application name
        application: String,
    },

    /// An application used by a business function
    ApplicationFunction {
        /// Application name
        application: String,
        /// Business function name
        business_function: String,
    },
}

impl Link {
    /// Build the link for `kind` from its source and target names.
    #[must_use]
    pub fn new(kind: RelationshipKind, source: String, target: String) -> Self {
        match kind {
            RelationshipKind::Hosts => Link::DatacenterServer {
                datacenter: source,
                server: target,
            },
            RelationshipKind::Runs => Link::ServerApplication {
                server: source,
                application: target,
            },
            RelationshipKind::Uses => Link::ApplicationFunction {
                application: source,
                business_function: target,
            },
        }
    }

    /// The relationship kind this link becomes.
    #[must_use]
    pub fn kind(&self) -> RelationshipKind {
        match self {
            Link::DatacenterServer { .. } => RelationshipKind::Hosts,
            Link::ServerApplication { .. } => RelationshipKind::Runs,
            Link::ApplicationFunction { .. } => RelationshipKind::Uses,
        }
    }

    /// `(source, target)` names in dependency direction.
    #[must_use]
    pub fn endpoints(&self) -> (&str, &str) {
        match self {
            Link::DatacenterServer { datacenter, server } => (datacenter.as_str(), server.as_str()),
            Link::ServerApplication {
                server,
                application,
            } => (server.as_str(), application.as_str()),
            Link::ApplicationFunction {
                application,
                business_function,
            } => (application.as_str(), business_function.as_str()),
        }
    }
}

/// Per-kind node counts kept in the `Metadata` singleton.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryCounts {
    /// Number of datacenters
    pub total_dc: u64,
    /// Number of servers
    pub total_server: u64,
    /// Number of applications
    pub total_app: u64,
    /// Number of business functions
    pub total_bf: u64,
}

impl SummaryCounts {
    /// Count stored for `kind`. `Metadata` always reads as zero.
    #[must_use]
    pub fn get(&self, kind: EntityKind) -> u64 {
        match kind {
            EntityKind::Datacenter => self.total_dc,
            EntityKind::Server => self.total_server,
            EntityKind::Application => self.total_app,
            EntityKind::BusinessFunction => self.total_bf,
            EntityKind::Metadata => 0,
        }
    }

    /// Set the count for `kind`. Setting `Metadata` is ignored.
    pub fn set(&mut self, kind: EntityKind, count: u64) {
        match kind {
            EntityKind::Datacenter => self.total_dc = count,
            EntityKind::Server => self.total_server = count,
            EntityKind::Application => self.total_app = count,
            EntityKind::BusinessFunction => self.total_bf = count,
            EntityKind::Metadata => {}
        }
    }

    /// Sum over all four kinds.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.total_dc + self.total_server + self.total_app + self.total_bf
    }
}

/// Store identity of a node, stringified.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the ID as a string slice
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

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<u64> for NodeId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A render color as a `#rrggbb` hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Color(pub &'static str);

impl Color {
    /// The hex string
    #[must_use]
    pub fn as_str(self) -> &'static str {
        self.0
    }

    /// Red, green and blue components, if the hex string is well formed.
    #[must_use]
    pub fn rgb(self) -> Option<(u8, u8, u8)> {
        let hex = self.0.strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(hex.get(range)?, 16).ok();
        Some((channel(0..2)?, channel(2..4)?, channel(4..6)?))
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}
