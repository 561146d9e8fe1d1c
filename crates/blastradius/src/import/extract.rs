//! Row extraction from the three relationship sections of a workbook.

use crate::domain::{Link, RelationshipKind};
use crate::error::{Error, Result};
use blastradius_sheets::Workbook;
use tracing::debug;

/// Where one relationship kind lives in the workbook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    /// Worksheet name
    pub name: &'static str,
    /// Relationship kind the rows describe
    pub kind: RelationshipKind,
    /// 1-based column of the first field
    pub first_column: usize,
    /// 1-based column of the second field
    pub second_column: usize,
    /// `true` when the first field is the relationship's target
    pub reversed: bool,
}

impl SectionSpec {
    /// Turn the two trimmed field values into a link in dependency direction.
    fn link(&self, first: String, second: String) -> Link {
        if self.reversed {
            Link::new(self.kind, second, first)
        } else {
            Link::new(self.kind, first, second)
        }
    }
}

/// The three required sections, in merge order.
pub static SECTIONS: [SectionSpec; 3] = [
    SectionSpec {
        name: "AirlineEdgeRelateAirlineDCSV",
        kind: RelationshipKind::Hosts,
        first_column: 1,
        second_column: 2,
        reversed: false,
    },
    SectionSpec {
        name: "AirlineEdgeRelateAirlineSVAP",
        kind: RelationshipKind::Runs,
        first_column: 1,
        second_column: 3,
        reversed: false,
    },
    // Business function is listed first; the link still points App -> BF.
    SectionSpec {
        name: "AirlineEdgeRelateBFAPv2",
        kind: RelationshipKind::Uses,
        first_column: 1,
        second_column: 2,
        reversed: true,
    },
];

/// Look up the section layout for a relationship kind.
#[must_use]
pub fn section_for(kind: RelationshipKind) -> &'static SectionSpec {
    match kind {
        RelationshipKind::Hosts => &SECTIONS[0],
        RelationshipKind::Runs => &SECTIONS[1],
        RelationshipKind::Uses => &SECTIONS[2],
    }
}

/// Check that every required section is present.
///
/// # Errors
///
/// Returns `Error::MissingSection` naming the first absent section.
pub fn check_sections(workbook: &dyn Workbook) -> Result<()> {
    for spec in &SECTIONS {
        if !workbook.has_section(spec.name) {
            return Err(Error::MissingSection {
                section: spec.name.to_string(),
            });
        }
    }
    Ok(())
}

/// Lazily yield the links of one section in row order.
///
/// The first row is the header and is skipped. A row contributes a link only
/// when both trimmed fields are non-empty.
///
/// # Errors
///
/// Returns `Error::MissingSection` if the section is absent.
pub fn section_links<'a>(
    workbook: &'a dyn Workbook,
    spec: &'a SectionSpec,
) -> Result<impl Iterator<Item = Link> + 'a> {
    let rows = workbook
        .section(spec.name)
        .ok_or_else(|| Error::MissingSection {
            section: spec.name.to_string(),
        })?;

    Ok(rows.skip(1).filter_map(move |row| {
        let first = row.field(spec.first_column).map(str::trim).unwrap_or_default();
        let second = row.field(spec.second_column).map(str::trim).unwrap_or_default();
        if first.is_empty() || second.is_empty() {
            debug!(section = spec.name, row = row.number(), "Skipping incomplete row");
            return None;
        }
        Some(spec.link(first.to_string(), second.to_string()))
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use blastradius_sheets::MemoryWorkbook;

    fn workbook() -> MemoryWorkbook {
        MemoryWorkbook::new()
            .with_section(
                "AirlineEdgeRelateAirlineDCSV",
                vec![
                    vec!["Datacenter", "Server"],
                    vec![" DC1 ", "Server1"],
                    vec!["", "Server2"],
                    vec!["DC2", "   "],
                    vec![],
                    vec!["DC2", "Server3"],
                ],
            )
            .with_section(
                "AirlineEdgeRelateAirlineSVAP",
                vec![
                    vec!["Server", "Owner", "Application"],
                    vec!["Server1", "ops", "App1"],
                    vec!["Server1", "App-in-wrong-column"],
                ],
            )
            .with_section(
                "AirlineEdgeRelateBFAPv2",
                vec![vec!["Business Function", "Application"], vec!["BF1", "App1"]],
            )
    }

    #[test]
    fn header_and_incomplete_rows_are_skipped() {
        let workbook = workbook();
        let links: Vec<Link> = section_links(&workbook, &SECTIONS[0]).unwrap().collect();

        assert_eq!(
            links,
            vec![
                Link::new(RelationshipKind::Hosts, "DC1".into(), "Server1".into()),
                Link::new(RelationshipKind::Hosts, "DC2".into(), "Server3".into()),
            ]
        );
    }

    #[test]
    fn server_application_reads_third_column() {
        let workbook = workbook();
        let links: Vec<Link> = section_links(&workbook, &SECTIONS[1]).unwrap().collect();

        assert_eq!(
            links,
            vec![Link::new(RelationshipKind::Runs, "Server1".into(), "App1".into())]
        );
    }

    #[test]
    fn business_function_section_points_application_to_function() {
        let workbook = workbook();
        let links: Vec<Link> = section_links(&workbook, &SECTIONS[2]).unwrap().collect();

        assert_eq!(
            links,
            vec![Link::ApplicationFunction {
                application: "App1".into(),
                business_function: "BF1".into(),
            }]
        );
    }

    #[test]
    fn header_only_section_yields_nothing() {
        let workbook =
            MemoryWorkbook::new().with_section("AirlineEdgeRelateBFAPv2", vec![vec!["BF1", "App1"]]);
        assert_eq!(section_links(&workbook, &SECTIONS[2]).unwrap().count(), 0);
    }

    #[test]
    fn missing_section_is_named() {
        let workbook = MemoryWorkbook::new()
            .with_section("AirlineEdgeRelateAirlineDCSV", Vec::<Vec<&str>>::new())
            .with_section("AirlineEdgeRelateAirlineSVAP", Vec::<Vec<&str>>::new());

        match check_sections(&workbook) {
            Err(Error::MissingSection { section }) => {
                assert_eq!(section, "AirlineEdgeRelateBFAPv2");
            }
            other => panic!("expected MissingSection, got {other:?}"),
        }
    }

    #[test]
    fn section_lookup_matches_kind() {
        for kind in RelationshipKind::ALL {
            assert_eq!(section_for(kind).kind, kind);
        }
    }
}
