//! Neo4j backend over Bolt.
//!
//! Labels and relationship types cannot be query parameters, so each entity
//! and relationship kind has its own static statement; only names and counts
//! are passed as parameters. Batches use `UNWIND` over two parallel name lists.

use super::{GraphSnapshot, GraphStore, Neo4jSettings, StoredNode, StoredRelationship};
use crate::domain::{EntityKind, Link, NodeId, RelationshipKind, SummaryCounts};
use crate::error::{StoreError, StoreResult};
use async_trait::async_trait;
use neo4rs::{ConfigBuilder, Graph, Query, Txn, query};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

const SNAPSHOT_NODES: &str = "MATCH (n) RETURN id(n) AS id, labels(n) AS labels, n.name AS name";
const SNAPSHOT_RELATIONSHIPS: &str =
    "MATCH (a)-[r]->(b) RETURN id(a) AS source, type(r) AS kind, id(b) AS target";
const DELETE_ALL: &str = "MATCH (n) DETACH DELETE n";
const STORE_SUMMARY: &str = "MERGE (m:Metadata {name: $name}) \
     SET m.totalDc = $totalDc, m.totalServer = $totalServer, \
     m.totalApp = $totalApp, m.totalBf = $totalBf";
const READ_SUMMARY: &str = "MATCH (m:Metadata {name: $name}) \
     RETURN m.totalDc AS totalDc, m.totalServer AS totalServer, \
     m.totalApp AS totalApp, m.totalBf AS totalBf LIMIT 1";

fn merge_node_statement(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Datacenter => "MERGE (n:Datacenter {name: $name}) RETURN id(n) AS id",
        EntityKind::Server => "MERGE (n:Server {name: $name}) RETURN id(n) AS id",
        EntityKind::Application => "MERGE (n:Application {name: $name}) RETURN id(n) AS id",
        EntityKind::BusinessFunction => {
            "MERGE (n:BusinessFunction {name: $name}) RETURN id(n) AS id"
        }
        EntityKind::Metadata => "MERGE (n:Metadata {name: $name}) RETURN id(n) AS id",
    }
}

fn count_statement(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Datacenter => "MATCH (n:Datacenter) RETURN count(n) AS count",
        EntityKind::Server => "MATCH (n:Server) RETURN count(n) AS count",
        EntityKind::Application => "MATCH (n:Application) RETURN count(n) AS count",
        EntityKind::BusinessFunction => "MATCH (n:BusinessFunction) RETURN count(n) AS count",
        EntityKind::Metadata => "MATCH (n:Metadata) RETURN count(n) AS count",
    }
}

fn merge_links_statement(kind: RelationshipKind) -> &'static str {
    match kind {
        RelationshipKind::Hosts => {
            "UNWIND range(0, size($sources) - 1) AS i \
             MERGE (a:Datacenter {name: $sources[i]}) \
             MERGE (b:Server {name: $targets[i]}) \
             MERGE (a)-[:HOSTS]->(b)"
        }
        RelationshipKind::Runs => {
            "UNWIND range(0, size($sources) - 1) AS i \
             MERGE (a:Server {name: $sources[i]}) \
             MERGE (b:Application {name: $targets[i]}) \
             MERGE (a)-[:RUNS]->(b)"
        }
        RelationshipKind::Uses => {
            "UNWIND range(0, size($sources) - 1) AS i \
             MERGE (a:Application {name: $sources[i]}) \
             MERGE (b:BusinessFunction {name: $targets[i]}) \
             MERGE (a)-[:USES]->(b)"
        }
    }
}

fn decode<T>(result: Result<T, neo4rs::DeError>, column: &str) -> StoreResult<T> {
    result.map_err(|e| StoreError::Decode(format!("column '{column}': {e}")))
}

fn to_bolt_count(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

fn from_bolt_count(count: i64) -> u64 {
    u64::try_from(count).unwrap_or(0)
}

/// Graph store backed by a Neo4j database.
pub struct Neo4jStore {
    graph: Arc<Graph>,
    uri: String,
}

impl std::fmt::Debug for Neo4jStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Neo4jStore").field("uri", &self.uri).finish()
    }
}

impl Neo4jStore {
    /// Connect, retrying `connect_retries` times with `retry_delay` between
    /// attempts. Each attempt is verified with a trivial query.
    ///
    /// # Errors
    ///
    /// Returns the last driver error once every attempt has failed.
    pub async fn connect(settings: &Neo4jSettings) -> StoreResult<Self> {
        let mut builder = ConfigBuilder::default()
            .uri(settings.uri.as_str())
            .user(settings.user.as_str())
            .password(settings.password.as_str());
        if let Some(database) = &settings.database {
            builder = builder.db(database.as_str());
        }
        let config = builder.build()?;

        let attempts = settings.connect_retries.max(1);
        let mut last_error = None;
        for attempt in 1..=attempts {
            match Graph::connect(config.clone()).await {
                Ok(graph) => match graph.run(query("RETURN 1")).await {
                    Ok(()) => {
                        info!(uri = %settings.uri, attempt, "Connected to Neo4j");
                        return Ok(Self {
                            graph: Arc::new(graph),
                            uri: settings.uri.clone(),
                        });
                    }
                    Err(e) => {
                        warn!(attempt, error = %e, "Neo4j connection test failed");
                        last_error = Some(e);
                    }
                },
                Err(e) => {
                    warn!(attempt, attempts, error = %e, "Failed to connect to Neo4j");
                    last_error = Some(e);
                }
            }
            if attempt < attempts {
                tokio::time::sleep(settings.retry_delay).await;
            }
        }

        error!(uri = %settings.uri, attempts, "Giving up on Neo4j connection");
        Err(last_error.map_or_else(
            || StoreError::Unavailable(format!("could not connect to {}", settings.uri)),
            StoreError::from,
        ))
    }

    async fn single_row(&self, q: Query) -> StoreResult<Option<neo4rs::Row>> {
        let mut stream = self.graph.execute(q).await?;
        Ok(stream.next().await?)
    }

    async fn run_in_transaction(&self, q: Query) -> StoreResult<()> {
        let mut txn = self.graph.start_txn().await?;
        match txn.run(q).await {
            Ok(()) => Ok(txn.commit().await?),
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e.into())
            }
        }
    }
}

async fn read_snapshot(txn: &mut Txn) -> StoreResult<GraphSnapshot> {
    let mut snapshot = GraphSnapshot::default();

    let mut nodes = txn.execute(query(SNAPSHOT_NODES)).await?;
    while let Some(row) = nodes.next(txn.handle()).await? {
        let id: i64 = decode(row.get("id"), "id")?;
        snapshot.nodes.push(StoredNode {
            id: NodeId::new(id.to_string()),
            labels: decode(row.get("labels"), "labels")?,
            name: decode(row.get("name"), "name")?,
        });
    }

    let mut relationships = txn.execute(query(SNAPSHOT_RELATIONSHIPS)).await?;
    while let Some(row) = relationships.next(txn.handle()).await? {
        let source: i64 = decode(row.get("source"), "source")?;
        let target: i64 = decode(row.get("target"), "target")?;
        snapshot.relationships.push(StoredRelationship {
            source: NodeId::new(source.to_string()),
            kind: decode(row.get("kind"), "kind")?,
            target: NodeId::new(target.to_string()),
        });
    }

    Ok(snapshot)
}

#[async_trait]
impl GraphStore for Neo4jStore {
    async fn merge_node(&mut self, kind: EntityKind, name: &str) -> StoreResult<NodeId> {
        let row = self
            .single_row(query(merge_node_statement(kind)).param("name", name))
            .await?
            .ok_or_else(|| StoreError::Decode("MERGE returned no row".to_string()))?;
        let id: i64 = decode(row.get("id"), "id")?;
        Ok(NodeId::new(id.to_string()))
    }

    async fn merge_relationship(
        &mut self,
        kind: RelationshipKind,
        source: &str,
        target: &str,
    ) -> StoreResult<()> {
        let q = query(merge_links_statement(kind))
            .param("sources", vec![source.to_string()])
            .param("targets", vec![target.to_string()]);
        self.graph.run(q).await?;
        Ok(())
    }

    async fn merge_links(&mut self, kind: RelationshipKind, links: &[Link]) -> StoreResult<usize> {
        if let Some(mismatch) = links.iter().find(|link| link.kind() != kind) {
            return Err(StoreError::MismatchedLink {
                expected: kind,
                found: mismatch.kind(),
            });
        }

        let (sources, targets): (Vec<String>, Vec<String>) = links
            .iter()
            .map(|link| {
                let (source, target) = link.endpoints();
                (source.to_string(), target.to_string())
            })
            .unzip();

        debug!(kind = %kind, links = links.len(), "Merging batch");
        let q = query(merge_links_statement(kind))
            .param("sources", sources)
            .param("targets", targets);
        self.run_in_transaction(q).await?;
        Ok(links.len())
    }

    async fn delete_all(&mut self) -> StoreResult<()> {
        self.graph.run(query(DELETE_ALL)).await?;
        Ok(())
    }

    async fn count_nodes(&self, kind: EntityKind) -> StoreResult<u64> {
        let Some(row) = self.single_row(query(count_statement(kind))).await? else {
            return Ok(0);
        };
        let count: i64 = decode(row.get("count"), "count")?;
        Ok(from_bolt_count(count))
    }

    async fn store_summary_counts(&mut self, counts: SummaryCounts) -> StoreResult<()> {
        let q = query(STORE_SUMMARY)
            .param("name", super::SUMMARY_NODE_NAME)
            .param("totalDc", to_bolt_count(counts.total_dc))
            .param("totalServer", to_bolt_count(counts.total_server))
            .param("totalApp", to_bolt_count(counts.total_app))
            .param("totalBf", to_bolt_count(counts.total_bf));
        self.graph.run(q).await?;
        Ok(())
    }

    async fn summary_counts(&self) -> StoreResult<Option<SummaryCounts>> {
        let q = query(READ_SUMMARY).param("name", super::SUMMARY_NODE_NAME);
        let Some(row) = self.single_row(q).await? else {
            return Ok(None);
        };

        // Missing properties read as zero
        let field = |column: &str| -> StoreResult<u64> {
            let value: Option<i64> = decode(row.get(column), column)?;
            Ok(value.map_or(0, from_bolt_count))
        };
        Ok(Some(SummaryCounts {
            total_dc: field("totalDc")?,
            total_server: field("totalServer")?,
            total_app: field("totalApp")?,
            total_bf: field("totalBf")?,
        }))
    }

    async fn snapshot(&self) -> StoreResult<GraphSnapshot> {
        let mut txn = self.graph.start_txn().await?;
        match read_snapshot(&mut txn).await {
            Ok(snapshot) => {
                txn.commit().await?;
                Ok(snapshot)
            }
            Err(e) => {
                if let Err(rollback) = txn.rollback().await {
                    warn!(error = %rollback, "Rollback failed");
                }
                Err(e)
            }
        }
    }

    async fn ping(&self) -> StoreResult<()> {
        self.graph.run(query("RETURN 1")).await?;
        Ok(())
    }

    async fn save(&self) -> StoreResult<()> {
        // Writes are committed as they happen
        Ok(())
    }

    async fn reload(&mut self) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_statement_names_its_label() {
        for kind in EntityKind::ESTATE {
            assert!(merge_node_statement(kind).contains(kind.label()));
            assert!(count_statement(kind).contains(kind.label()));
        }
    }

    #[test]
    fn batch_statements_follow_relationship_layering() {
        for kind in RelationshipKind::ALL {
            let statement = merge_links_statement(kind);
            assert!(statement.contains(&format!(":{}", kind.source_kind().label())));
            assert!(statement.contains(&format!(":{}", kind.target_kind().label())));
            assert!(statement.contains(&format!("[:{}]", kind.as_str())));
        }
    }

    #[test]
    fn counts_saturate_when_converted() {
        assert_eq!(to_bolt_count(u64::MAX), i64::MAX);
        assert_eq!(from_bolt_count(-1), 0);
        assert_eq!(from_bolt_count(7), 7);
    }
}
