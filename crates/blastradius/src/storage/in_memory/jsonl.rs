//! JSONL persistence for the in-memory store.
//!
//! Each line of the data file is one record: a node, a relationship, or the
//! summary counts. Nodes keep their store identity so projections stay stable
//! across process restarts.

use super::inner::InMemoryGraphInner;
use super::InMemoryStore;
use crate::domain::{EntityKind, RelationshipKind, SummaryCounts};
use crate::error::StoreResult;
use crate::storage::GraphStore;
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio::sync::Mutex;

/// One line of the data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record {
    Node {
        id: u64,
        kind: EntityKind,
        name: String,
    },
    Relationship {
        kind: RelationshipKind,
        source: u64,
        target: u64,
    },
    Summary {
        counts: SummaryCounts,
    },
}

/// Warnings that can occur during JSONL file loading.
///
/// These are non-fatal: the offending line is skipped and loading continues.
/// Callers should log them, as they point at a hand-edited or damaged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadWarning {
    /// Line that couldn't be parsed as a record
    MalformedRecord {
        /// 1-based line number
        line_number: usize,
        /// Parser message
        error: String,
    },

    /// A node whose `(kind, name)` or identity was already loaded
    DuplicateNode {
        /// 1-based line number
        line_number: usize,
        /// Kind of the skipped node
        kind: EntityKind,
        /// Name of the skipped node
        name: String,
    },

    /// A relationship that refers to a node id not in the file
    DanglingRelationship {
        /// 1-based line number
        line_number: usize,
        /// Source node id
        source: u64,
        /// Target node id
        target: u64,
    },

    /// A node whose id leaves no room for new identities
    IdOutOfRange {
        /// 1-based line number
        line_number: usize,
        /// The rejected id
        id: u64,
    },

    /// A relationship whose endpoints have the wrong kinds for its type
    MismatchedRelationship {
        /// 1-based line number
        line_number: usize,
        /// The relationship kind on the line
        kind: RelationshipKind,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadWarning::MalformedRecord { line_number, error } => {
                write!(f, "line {line_number}: malformed record: {error}")
            }
            LoadWarning::DuplicateNode {
                line_number,
                kind,
                name,
            } => write!(f, "line {line_number}: duplicate {kind} '{name}' skipped"),
            LoadWarning::DanglingRelationship {
                line_number,
                source,
                target,
            } => write!(
                f,
                "line {line_number}: relationship {source} -> {target} references a missing node"
            ),
            LoadWarning::IdOutOfRange { line_number, id } => {
                write!(f, "line {line_number}: node id {id} is out of range")
            }
            LoadWarning::MismatchedRelationship { line_number, kind } => write!(
                f,
                "line {line_number}: {kind} relationship connects the wrong entity kinds"
            ),
        }
    }
}

/// Load a store from a JSONL file.
///
/// # Error Handling
///
/// - **Malformed lines**: Skipped with a warning
/// - **Duplicate nodes**: The first occurrence wins; later ones are skipped
/// - **Node id `u64::MAX`**: Skipped, since no identity would remain after it
/// - **Dangling or mismatched relationships**: Skipped with a warning
///
/// Nodes are loaded before relationships regardless of line order.
///
/// # Errors
///
/// Returns `StoreError::Io` if the file cannot be read.
pub async fn load_from_jsonl(path: &Path) -> StoreResult<(Box<dyn GraphStore>, Vec<LoadWarning>)> {
    let (store, warnings) = load_store(path).await?;
    Ok((Box::new(store), warnings))
}

pub(crate) async fn load_store(path: &Path) -> StoreResult<(InMemoryStore, Vec<LoadWarning>)> {
    let content = tokio::fs::read_to_string(path).await?;
    let mut warnings = Vec::new();

    // First pass: parse every line
    let mut records = Vec::new();
    for (index, line) in content.lines().enumerate() {
        let line_number = index + 1;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<Record>(line) {
            Ok(record) => records.push((line_number, record)),
            Err(e) => warnings.push(LoadWarning::MalformedRecord {
                line_number,
                error: e.to_string(),
            }),
        }
    }

    let mut inner = InMemoryGraphInner::new();
    let mut by_id = HashMap::new();

    // Second pass: nodes and summary
    for (line_number, record) in &records {
        match record {
            Record::Node { id, kind, name } => {
                if by_id.contains_key(id) || inner.node_map.contains_key(&(*kind, name.clone())) {
                    warnings.push(LoadWarning::DuplicateNode {
                        line_number: *line_number,
                        kind: *kind,
                        name: name.clone(),
                    });
                    continue;
                }
                let Ok(index) = inner.insert_node(*id, *kind, name.clone()) else {
                    warnings.push(LoadWarning::IdOutOfRange {
                        line_number: *line_number,
                        id: *id,
                    });
                    continue;
                };
                by_id.insert(*id, index);
            }
            Record::Summary { counts } => inner.summary = Some(*counts),
            Record::Relationship { .. } => {}
        }
    }

    // Third pass: relationships between loaded nodes
    for (line_number, record) in &records {
        let Record::Relationship {
            kind,
            source,
            target,
        } = record
        else {
            continue;
        };

        let (Some(&from), Some(&to)) = (by_id.get(source), by_id.get(target)) else {
            warnings.push(LoadWarning::DanglingRelationship {
                line_number: *line_number,
                source: *source,
                target: *target,
            });
            continue;
        };

        if inner.graph[from].kind != kind.source_kind() || inner.graph[to].kind != kind.target_kind()
        {
            warnings.push(LoadWarning::MismatchedRelationship {
                line_number: *line_number,
                kind: *kind,
            });
            continue;
        }

        inner.merge_edge(from, to, *kind);
    }

    Ok((Arc::new(Mutex::new(inner)), warnings))
}

/// Save the store to a JSONL file with atomic writes.
///
/// Nodes are written first, then relationships, then the summary. The write
/// goes to a temporary file that is renamed over `path`, so a crash leaves the
/// previous file intact.
pub(crate) async fn save_to_jsonl(store: &InMemoryStore, path: &Path) -> StoreResult<()> {
    let records = {
        let inner = store.lock().await;
        collect_records(&inner)
    };

    let temp_path = path.with_extension("tmp");
    let file = File::create(&temp_path).await?;
    let mut writer = BufWriter::new(file);

    for record in &records {
        let json = serde_json::to_string(record)?;
        writer.write_all(json.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }

    writer.flush().await?;
    tokio::fs::rename(&temp_path, path).await?;

    tracing::debug!(path = %path.display(), records = records.len(), "Saved graph");
    Ok(())
}

fn collect_records(inner: &InMemoryGraphInner) -> Vec<Record> {
    let graph = &inner.graph;
    let mut records: Vec<Record> = graph
        .node_weights()
        .map(|node| Record::Node {
            id: node.id,
            kind: node.kind,
            name: node.name.clone(),
        })
        .collect();

    records.extend(graph.edge_references().map(|edge| Record::Relationship {
        kind: *edge.weight(),
        source: graph[edge.source()].id,
        target: graph[edge.target()].id,
    }));

    if let Some(counts) = inner.summary {
        records.push(Record::Summary { counts });
    }

    records
}
