use contact_types::{ConfigError, ContactRecord};
use geom_query::Capability;
use serde::Serialize;

/// Records of one classification run plus its bookkeeping.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Retained records in pair-enumeration order.
    pub records: Vec<ContactRecord>,
    pub summary: RunSummary,
}

/// Counters describing one classification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Kernel capability the run was answered with.
    pub capability: Capability,
    /// n·(n-1)/2 for n members.
    pub candidate_pairs: usize,
    /// Pairs classified before the run finished or was cancelled.
    pub classified: usize,
    pub retained: usize,
    /// Clearance pairs dropped for exceeding the clearance threshold.
    pub pruned: usize,
    pub cancelled: bool,
}

/// Errors that abort a run before any pair is processed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to serialize contacts: {reason}")]
    Serialize { reason: String },
}

/// Number of unordered pairs among `n` members.
pub fn pair_count(n: usize) -> usize {
    n * n.saturating_sub(1) / 2
}
