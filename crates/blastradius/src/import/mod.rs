//! Workbook import pipeline.
//!
//! An import runs these steps in order against an explicitly passed store:
//!
//! 1. Check that the three relationship sections exist (fails before any
//!    mutation).
//! 2. Extract and deduplicate the links of each section.
//! 3. Delete everything in the store.
//! 4. Merge each relationship kind in `HOSTS`, `RUNS`, `USES` order. A failed
//!    kind is logged and recorded in [`ImportStats::failures`]; the import
//!    carries on with the next kind.
//! 5. Count each entity kind and overwrite the summary record.
//!
//! Steps 3 and 5 are fatal on failure.

mod dedupe;
mod extract;
mod merge;

pub use dedupe::dedupe;
pub use extract::{SECTIONS, SectionSpec, check_sections, section_for, section_links};
pub use merge::GraphMerger;

use crate::domain::{Link, RelationshipKind, SummaryCounts};
use crate::error::Result;
use crate::storage::GraphStore;
use blastradius_sheets::Workbook;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Per-kind numbers of one import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KindStats {
    /// Relationship kind
    pub kind: RelationshipKind,
    /// Links read from the section, duplicates included
    pub extracted: usize,
    /// Links left after deduplication
    pub unique: usize,
    /// Links actually merged; zero when the kind failed
    pub merged: usize,
}

/// A relationship kind whose batch failed to merge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportFailure {
    /// Relationship kind of the failed batch
    pub kind: RelationshipKind,
    /// The error, rendered for display
    pub message: String,
}

/// Outcome of a completed import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportStats {
    /// One entry per relationship kind, in merge order
    pub kinds: Vec<KindStats>,
    /// Kinds that failed and were skipped
    pub failures: Vec<ImportFailure>,
    /// Counts written to the summary record
    pub summary: SummaryCounts,
    /// When the import finished
    pub completed_at: DateTime<Utc>,
}

impl ImportStats {
    /// Number of links merged for `kind`.
    #[must_use]
    pub fn merged(&self, kind: RelationshipKind) -> usize {
        self.kinds
            .iter()
            .find(|stats| stats.kind == kind)
            .map_or(0, |stats| stats.merged)
    }

    /// Total links merged across all kinds.
    #[must_use]
    pub fn total_merged(&self) -> usize {
        self.kinds.iter().map(|stats| stats.merged).sum()
    }

    /// Returns `true` if every kind merged.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Import a workbook into `store`, replacing its contents.
///
/// # Errors
///
/// - `Error::MissingSection` if a required section is absent; the store is
///   not touched
/// - `Error::StoreUnavailable` if cleanup or the summary counts fail
///
/// A failed relationship kind is not an error; it shows up in
/// [`ImportStats::failures`] with a merged count of zero.
pub async fn import_from_source(
    workbook: &dyn Workbook,
    store: &mut dyn GraphStore,
) -> Result<ImportStats> {
    check_sections(workbook)?;

    let mut batches: Vec<(RelationshipKind, usize, Vec<Link>)> = Vec::with_capacity(SECTIONS.len());
    for spec in &SECTIONS {
        let extracted: Vec<Link> = section_links(workbook, spec)?.collect();
        let count = extracted.len();
        let unique = dedupe(extracted);
        info!(
            section = spec.name,
            kind = %spec.kind,
            rows = count,
            unique = unique.len(),
            "Extracted links"
        );
        batches.push((spec.kind, count, unique));
    }

    let mut merger = GraphMerger::new(store);
    merger.cleanup().await?;

    let mut kinds = Vec::with_capacity(batches.len());
    let mut failures = Vec::new();
    for (kind, extracted, links) in batches {
        let merged = match merger.merge_kind(kind, &links).await {
            Ok(merged) => merged,
            Err(e) => {
                warn!(kind = %kind, error = %e, "Skipping relationship kind");
                failures.push(ImportFailure {
                    kind,
                    message: e.to_string(),
                });
                0
            }
        };
        kinds.push(KindStats {
            kind,
            extracted,
            unique: links.len(),
            merged,
        });
    }

    let summary = merger.store_summary_counts().await?;

    Ok(ImportStats {
        kinds,
        failures,
        summary,
        completed_at: Utc::now(),
    })
}
