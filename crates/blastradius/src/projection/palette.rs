//! Fixed render palette.

use crate::domain::{Color, EntityKind, RelationshipKind};

/// Color of every node in the impacted set.
pub const FAILED: Color = Color("#ff0000");

/// Fallback for nodes and edges of an unknown kind.
pub const DEFAULT: Color = Color("#FFC0CB");

/// Node color for an entity kind.
#[must_use]
pub fn entity_color(kind: EntityKind) -> Color {
    match kind {
        EntityKind::Datacenter => Color("#f47535"),
        EntityKind::Server => Color("#b86eac"),
        EntityKind::Application => Color("#3dbfdf"),
        EntityKind::BusinessFunction => Color("#46a64e"),
        EntityKind::Metadata => DEFAULT,
    }
}

/// Edge color for a relationship kind.
#[must_use]
pub fn relationship_color(kind: RelationshipKind) -> Color {
    match kind {
        RelationshipKind::Hosts => Color("#f6a565"),
        RelationshipKind::Runs => Color("#d89edc"),
        RelationshipKind::Uses => Color("#ffffff"),
    }
}

/// Node color for a label as read from the store.
#[must_use]
pub fn node_color(label: &str) -> Color {
    match label.parse::<EntityKind>() {
        Ok(kind) if kind.is_estate() && label == kind.label() => entity_color(kind),
        _ => DEFAULT,
    }
}

/// Edge color for a relationship type as read from the store.
#[must_use]
pub fn edge_color(kind: &str) -> Color {
    match kind.parse::<RelationshipKind>() {
        Ok(kind_value) if kind == kind_value.as_str() => relationship_color(kind_value),
        _ => DEFAULT,
    }
}

/// Display name of an entity kind in summary mode.
#[must_use]
pub fn summary_title(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Datacenter => "Datacenter",
        EntityKind::Server => "Server",
        EntityKind::Application => "IT Application",
        EntityKind::BusinessFunction => "Business Function",
        EntityKind::Metadata => "Metadata",
    }
}
