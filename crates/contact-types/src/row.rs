//! Textual contact-table rows.
//!
//! Downstream consumers read these columns as fixed-precision strings:
//! the gap with 6 decimals (or `N/A`), the area with 2.

use serde::{Deserialize, Serialize};

use crate::record::ContactRecord;

/// Column order of the contact table.
pub const CONTACT_COLUMNS: [&str; 10] = [
    "project",
    "assembly_id",
    "a_part",
    "a_rev",
    "b_part",
    "b_rev",
    "relation",
    "min_gap_mm",
    "contact_area_mm2",
    "note",
];

/// Placeholder written for a gap that does not apply.
pub const GAP_NOT_APPLICABLE: &str = "N/A";

/// One persisted contact record, every field already formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRow {
    pub project: String,
    pub assembly_id: String,
    pub a_part: String,
    pub a_rev: String,
    pub b_part: String,
    pub b_rev: String,
    pub relation: String,
    pub min_gap_mm: String,
    pub contact_area_mm2: String,
    pub note: String,
}

impl ContactRow {
    pub fn from_record(project: &str, assembly_id: &str, record: &ContactRecord) -> Self {
        Self {
            project: project.to_string(),
            assembly_id: assembly_id.to_string(),
            a_part: record.member_a.part_name.clone(),
            a_rev: record.member_a.revision_index.to_string(),
            b_part: record.member_b.part_name.clone(),
            b_rev: record.member_b.revision_index.to_string(),
            relation: record.relation.as_str().to_string(),
            min_gap_mm: format_gap(record.min_gap_mm),
            contact_area_mm2: format_area(record.contact_area_mm2),
            note: record.note.clone(),
        }
    }

    /// Fields in [`CONTACT_COLUMNS`] order.
    pub fn fields(&self) -> [&str; 10] {
        [
            self.project.as_str(),
            self.assembly_id.as_str(),
            self.a_part.as_str(),
            self.a_rev.as_str(),
            self.b_part.as_str(),
            self.b_rev.as_str(),
            self.relation.as_str(),
            self.min_gap_mm.as_str(),
            self.contact_area_mm2.as_str(),
            self.note.as_str(),
        ]
    }

    pub fn belongs_to(&self, project: &str, assembly_id: &str) -> bool {
        self.project == project && self.assembly_id == assembly_id
    }
}

pub fn format_gap(gap_mm: Option<f64>) -> String {
    match gap_mm {
        Some(gap) => format!("{gap:.6}"),
        None => GAP_NOT_APPLICABLE.to_string(),
    }
}

pub fn format_area(area_mm2: f64) -> String {
    format!("{area_mm2:.2}")
}
