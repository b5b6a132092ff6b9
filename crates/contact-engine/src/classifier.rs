//! Pairwise contact classification.
//!
//! Every unordered pair `(i, j)` with `i < j` is classified exactly once,
//! in enumeration order, into one of five terminal relations. A failing
//! pair never aborts the run.

use contact_types::{ClassificationConfig, ContactRecord, MemberRef, Relation};
use geom_query::{Capability, GeometricQuery, Outcome, QueryError};
use tracing::{debug, info, instrument, warn};

use crate::resolver::ShapeResolver;
use crate::types::{pair_count, Classification, EngineError, RunSummary};

pub const MISSING_SHAPE_NOTE: &str = "missing shape";
pub const STUB_NOTE: &str = "stub: no geometric kernel, unverified";
pub const PENETRATION_NOTE: &str = "penetration depth not computed";

/// Classifies assembly member pairs through an injected query adapter.
pub struct ContactClassifier<Q> {
    query: Q,
}

/// Relation and measurements settled for one resolved pair.
struct PairVerdict {
    relation: Relation,
    gap: Option<f64>,
    area: f64,
    notes: Vec<String>,
}

impl<Q: GeometricQuery> ContactClassifier<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    pub fn query(&self) -> &Q {
        &self.query
    }

    pub fn capability(&self) -> Capability {
        self.query.capability()
    }

    /// Classify every pair of `members` and return the retained records in
    /// pair-enumeration order.
    pub fn classify<R>(
        &self,
        project: &str,
        members: &[MemberRef],
        resolver: &R,
        config: &ClassificationConfig,
    ) -> Result<Vec<ContactRecord>, EngineError>
    where
        R: ShapeResolver<Shape = Q::Shape>,
    {
        self.classify_until(project, members, resolver, config, || false)
            .map(|c| c.records)
    }

    /// Like [`classify`](Self::classify), checking `should_stop` before each
    /// pair. A stopped run returns the records of the pairs classified so
    /// far.
    #[instrument(skip_all, fields(project = %project, members = members.len()))]
    pub fn classify_until<R, F>(
        &self,
        project: &str,
        members: &[MemberRef],
        resolver: &R,
        config: &ClassificationConfig,
        mut should_stop: F,
    ) -> Result<Classification, EngineError>
    where
        R: ShapeResolver<Shape = Q::Shape>,
        F: FnMut() -> bool,
    {
        config.validate()?;

        let capability = self.query.capability();
        let mut summary = RunSummary {
            capability,
            candidate_pairs: pair_count(members.len()),
            classified: 0,
            retained: 0,
            pruned: 0,
            cancelled: false,
        };

        // Each member resolves once per run; shapes are immutable meanwhile.
        let shapes: Vec<Option<Q::Shape>> = match capability {
            Capability::Full => members
                .iter()
                .map(|m| resolver.resolve(project, m))
                .collect(),
            Capability::Stub => Vec::new(),
        };

        let mut records = Vec::new();
        'pairs: for i in 0..members.len() {
            for j in (i + 1)..members.len() {
                if should_stop() {
                    summary.cancelled = true;
                    break 'pairs;
                }

                let (a, b) = (&members[i], &members[j]);
                let record = match capability {
                    Capability::Stub => stub_record(a, b, config),
                    Capability::Full => {
                        self.classify_pair(a, b, shapes[i].as_ref(), shapes[j].as_ref(), config)
                    }
                };
                summary.classified += 1;

                if record.is_pruned_by(config.clearance_max_mm) {
                    debug!(a = %a, b = %b, gap = ?record.min_gap_mm, "pruned far clearance pair");
                    summary.pruned += 1;
                    continue;
                }
                debug!(a = %a, b = %b, relation = %record.relation, "classified pair");
                records.push(record);
            }
        }
        summary.retained = records.len();

        info!(
            ?capability,
            candidates = summary.candidate_pairs,
            retained = summary.retained,
            pruned = summary.pruned,
            cancelled = summary.cancelled,
            "contact classification finished"
        );
        Ok(Classification { records, summary })
    }

    fn classify_pair(
        &self,
        a: &MemberRef,
        b: &MemberRef,
        shape_a: Option<&Q::Shape>,
        shape_b: Option<&Q::Shape>,
        config: &ClassificationConfig,
    ) -> ContactRecord {
        let (Some(sa), Some(sb)) = (shape_a, shape_b) else {
            return ContactRecord::unknown(a.clone(), b.clone(), MISSING_SHAPE_NOTE);
        };

        match self.measure_pair(sa, sb, config) {
            Ok(verdict) => ContactRecord {
                member_a: a.clone(),
                member_b: b.clone(),
                relation: verdict.relation,
                min_gap_mm: verdict.gap,
                contact_area_mm2: verdict.area,
                note: verdict.notes.join("; "),
            },
            Err(err) => {
                warn!(a = %a, b = %b, %err, "pair classification failed");
                ContactRecord::error(a.clone(), b.clone(), err.to_string())
            }
        }
    }

    fn measure_pair(
        &self,
        a: &Q::Shape,
        b: &Q::Shape,
        config: &ClassificationConfig,
    ) -> Result<PairVerdict, QueryError> {
        let mut notes = Vec::new();

        let distance = settle("distance", self.query.distance(a, b)?, &mut notes)?;
        let volume = settle("common volume", self.query.common_volume(a, b)?, &mut notes)?;

        if volume > config.volume_epsilon_mm3 {
            notes.insert(0, PENETRATION_NOTE.to_string());
            return Ok(PairVerdict {
                relation: Relation::Penetration,
                gap: None,
                area: 0.0,
                notes,
            });
        }

        let area = settle(
            "common surface area",
            self.query.common_surface_area(a, b)?,
            &mut notes,
        )?;

        let verdict = if area > config.area_epsilon_mm2 || distance.abs() <= config.tolerance_mm {
            PairVerdict {
                relation: Relation::Touching,
                gap: Some(distance),
                area,
                notes,
            }
        } else {
            PairVerdict {
                relation: Relation::Clearance,
                gap: Some(distance),
                area: 0.0,
                notes,
            }
        };
        Ok(verdict)
    }
}

/// Unwrap a primitive outcome: unavailable means 0.0 plus a diagnostic note.
fn settle(
    operation: &str,
    outcome: Outcome<f64>,
    notes: &mut Vec<String>,
) -> Result<f64, QueryError> {
    match outcome {
        Outcome::Done(v) if v.is_finite() => Ok(v),
        Outcome::Done(v) => Err(QueryError::NonFinite {
            operation: operation.to_string(),
            value: v,
        }),
        Outcome::Unavailable { reason } => {
            notes.push(format!("{operation} not computed: {reason}"));
            Ok(0.0)
        }
    }
}

/// Placeholder record used when no kernel backs the query.
fn stub_record(a: &MemberRef, b: &MemberRef, config: &ClassificationConfig) -> ContactRecord {
    ContactRecord {
        member_a: a.clone(),
        member_b: b.clone(),
        relation: Relation::Clearance,
        min_gap_mm: Some(config.stub_gap_mm),
        contact_area_mm2: 0.0,
        note: STUB_NOTE.to_string(),
    }
}
