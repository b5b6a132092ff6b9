use nalgebra::Isometry3;
use serde::{Deserialize, Serialize};

/// Placement of a face's local frame in the solid's global frame.
pub type Placement = Isometry3<f64>;

/// Result of a primitive the kernel may be unable to complete.
///
/// `Unavailable` degrades precision; it is never a reason to abort a pair.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Done(T),
    Unavailable { reason: String },
}

impl<T> Outcome<T> {
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Outcome::Unavailable {
            reason: reason.into(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Done(v) => Outcome::Done(f(v)),
            Outcome::Unavailable { reason } => Outcome::Unavailable { reason },
        }
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(v) => Some(v),
            Outcome::Unavailable { .. } => None,
        }
    }
}

/// Which geometric capability backs a query adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    /// A BREP kernel answers distance, intersection and measurement.
    Full,
    /// No kernel is loaded; every primitive is unavailable.
    Stub,
}

/// Unexpected failures of a geometric primitive.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueryError {
    #[error("shape not usable by this kernel: {reason}")]
    UnsupportedShape { reason: String },

    #[error("{operation} produced a non-finite value: {value}")]
    NonFinite { operation: String, value: f64 },

    #[error("invalid mesh: {reason}")]
    InvalidMesh { reason: String },

    #[error("kernel error: {message}")]
    Kernel { message: String },
}

/// Triangulation of one face, in the face's local frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FaceTriangulation {
    pub nodes: Vec<[f64; 3]>,
    /// 0-based indices into `nodes`.
    pub triangles: Vec<[usize; 3]>,
    pub placement: Placement,
}

impl FaceTriangulation {
    pub fn new(nodes: Vec<[f64; 3]>, triangles: Vec<[usize; 3]>) -> Self {
        Self {
            nodes,
            triangles,
            placement: Placement::identity(),
        }
    }

    pub fn with_placement(mut self, placement: Placement) -> Self {
        self.placement = placement;
        self
    }
}

/// Per-face tessellation state reported by a kernel.
#[derive(Debug, Clone, PartialEq)]
pub enum FaceSlot {
    Triangulated(FaceTriangulation),
    /// The face carries no triangulation.
    Missing,
    /// The face could not be resolved.
    Failed(QueryError),
}

/// Triangle mesh sharing one global vertex buffer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectedMesh {
    pub vertices: Vec<[f64; 3]>,
    /// 0-based indices into `vertices`.
    pub triangles: Vec<[u32; 3]>,
}

impl ProjectedMesh {
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Axis-aligned bounds as (min, max). `None` for an empty vertex buffer.
    pub fn bounds(&self) -> Option<([f64; 3], [f64; 3])> {
        let first = *self.vertices.first()?;
        let mut min = first;
        let mut max = first;
        for v in &self.vertices[1..] {
            for i in 0..3 {
                min[i] = min[i].min(v[i]);
                max[i] = max[i].max(v[i]);
            }
        }
        Some((min, max))
    }

    /// Corner positions of one triangle.
    pub fn triangle(&self, index: usize) -> [[f64; 3]; 3] {
        let [a, b, c] = self.triangles[index];
        [
            self.vertices[a as usize],
            self.vertices[b as usize],
            self.vertices[c as usize],
        ]
    }
}
