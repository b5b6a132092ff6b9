use serde::{Deserialize, Serialize};
use std::fmt;

use crate::member::MemberRef;

/// Geometric relation between two assembly members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// Separated by a measurable gap.
    Clearance,
    /// In contact without volumetric overlap.
    Touching,
    /// The solids share a non-negligible volume.
    Penetration,
    /// At least one shape could not be resolved.
    Unknown,
    /// Classification of this pair failed unexpectedly.
    Error,
}

impl Relation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Relation::Clearance => "clearance",
            Relation::Touching => "touching",
            Relation::Penetration => "penetration",
            Relation::Unknown => "unknown",
            Relation::Error => "error",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification result for one unordered pair of members.
///
/// `member_a` always precedes `member_b` in the classified member list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub member_a: MemberRef,
    pub member_b: MemberRef,
    pub relation: Relation,
    /// Minimum boundary separation in mm. `None` when not applicable
    /// (penetration, unknown, error).
    pub min_gap_mm: Option<f64>,
    /// Shared surface area in mm², 0.0 when not applicable.
    pub contact_area_mm2: f64,
    pub note: String,
}

impl ContactRecord {
    /// A record for a pair whose geometry could not be resolved.
    pub fn unknown(member_a: MemberRef, member_b: MemberRef, note: impl Into<String>) -> Self {
        Self {
            member_a,
            member_b,
            relation: Relation::Unknown,
            min_gap_mm: None,
            contact_area_mm2: 0.0,
            note: note.into(),
        }
    }

    /// A record for a pair whose classification failed.
    pub fn error(member_a: MemberRef, member_b: MemberRef, note: impl Into<String>) -> Self {
        Self {
            relation: Relation::Error,
            ..Self::unknown(member_a, member_b, note)
        }
    }

    /// Whether this record falls to clearance pruning: only `clearance`
    /// records with a gap beyond `clearance_max_mm` are dropped.
    pub fn is_pruned_by(&self, clearance_max_mm: f64) -> bool {
        self.relation == Relation::Clearance
            && self.min_gap_mm.is_some_and(|gap| gap > clearance_max_mm)
    }
}
