//! Contact-table reporting: formatted rows, per-assembly replacement and
//! JSON export.

use contact_types::{ContactRecord, ContactRow};

use crate::types::EngineError;

/// Format records as contact-table rows, preserving order.
pub fn rows_for(project: &str, assembly_id: &str, records: &[ContactRecord]) -> Vec<ContactRow> {
    records
        .iter()
        .map(|r| ContactRow::from_record(project, assembly_id, r))
        .collect()
}

/// Replace every row of one assembly with freshly computed rows.
///
/// Rows of other assemblies keep their order; the fresh rows are appended.
pub fn replace_assembly_rows(
    existing: Vec<ContactRow>,
    project: &str,
    assembly_id: &str,
    fresh: Vec<ContactRow>,
) -> Vec<ContactRow> {
    let mut rows: Vec<ContactRow> = existing
        .into_iter()
        .filter(|r| !r.belongs_to(project, assembly_id))
        .collect();
    rows.extend(fresh);
    rows
}

/// Serialize rows to a pretty-printed JSON array.
pub fn rows_to_json(rows: &[ContactRow]) -> Result<String, EngineError> {
    serde_json::to_string_pretty(rows).map_err(|e| EngineError::Serialize {
        reason: e.to_string(),
    })
}
