use contact_types::{Assembly, ClassificationConfig, ContactRecord, ContactRow};
use geom_query::GeometricQuery;
use tracing::instrument;

use crate::classifier::ContactClassifier;
use crate::report;
use crate::resolver::ShapeResolver;
use crate::types::{Classification, EngineError, RunSummary};

/// Contact records computed for one assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct AssemblyContacts {
    pub project: String,
    pub assembly_id: String,
    pub records: Vec<ContactRecord>,
    pub summary: RunSummary,
}

impl AssemblyContacts {
    /// Contact-table rows for these records.
    pub fn rows(&self) -> Vec<ContactRow> {
        report::rows_for(&self.project, &self.assembly_id, &self.records)
    }
}

/// A classifier bound to the resolver that supplies its shapes.
///
/// The query adapter is chosen once by the host and injected here; the
/// engine never probes for a kernel itself.
pub struct ContactEngine<Q, R> {
    classifier: ContactClassifier<Q>,
    resolver: R,
}

impl<Q, R> ContactEngine<Q, R>
where
    Q: GeometricQuery,
    R: ShapeResolver<Shape = Q::Shape>,
{
    pub fn new(query: Q, resolver: R) -> Self {
        Self {
            classifier: ContactClassifier::new(query),
            resolver,
        }
    }

    pub fn classifier(&self) -> &ContactClassifier<Q> {
        &self.classifier
    }

    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Classify the included members of `assembly`.
    #[instrument(skip_all, fields(project = %assembly.project, assembly = %assembly.assembly_id))]
    pub fn run(
        &self,
        assembly: &Assembly,
        config: &ClassificationConfig,
    ) -> Result<AssemblyContacts, EngineError> {
        let members = assembly.included_members();
        let Classification { records, summary } = self.classifier.classify_until(
            &assembly.project,
            &members,
            &self.resolver,
            config,
            || false,
        )?;
        Ok(AssemblyContacts {
            project: assembly.project.clone(),
            assembly_id: assembly.assembly_id.clone(),
            records,
            summary,
        })
    }
}
