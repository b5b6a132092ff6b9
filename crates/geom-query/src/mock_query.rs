//! MockQuery: deterministic test double implementing GeometricQuery +
//! FaceTessellator.
//!
//! Pair results are scripted by shape name, so classification policy can
//! be exercised without a kernel. Used by contact-engine tests.

use std::cell::Cell;
use std::collections::HashMap;

use crate::traits::{FaceTessellator, GeometricQuery};
use crate::types::*;

/// Distance reported for pairs without a script.
pub const DEFAULT_MOCK_GAP: f64 = 10.0;

/// A synthetic solid identified by name, with optional per-face
/// triangulations for projection tests.
#[derive(Debug, Clone, PartialEq)]
pub struct MockSolid {
    pub name: String,
    pub faces: Vec<MockFace>,
}

impl MockSolid {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            faces: Vec::new(),
        }
    }

    pub fn with_face(mut self, face: MockFace) -> Self {
        self.faces.push(face);
        self
    }
}

/// Tessellation state of one synthetic face.
#[derive(Debug, Clone, PartialEq)]
pub enum MockFace {
    Triangulated(FaceTriangulation),
    Untriangulated,
    Broken(String),
}

/// Scripted result of a single primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum Scripted {
    Value(f64),
    Unavailable(String),
    Fail(String),
}

impl Scripted {
    fn play(&self) -> Result<Outcome<f64>, QueryError> {
        match self {
            Scripted::Value(v) => Ok(Outcome::Done(*v)),
            Scripted::Unavailable(reason) => Ok(Outcome::unavailable(reason.clone())),
            Scripted::Fail(message) => Err(QueryError::Kernel {
                message: message.clone(),
            }),
        }
    }
}

/// Scripted results for one unordered pair of shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct PairScript {
    pub distance: Scripted,
    pub volume: Scripted,
    pub area: Scripted,
}

impl Default for PairScript {
    fn default() -> Self {
        Self::gap(DEFAULT_MOCK_GAP)
    }
}

impl PairScript {
    /// Disjoint solids separated by `distance`.
    pub fn gap(distance: f64) -> Self {
        Self {
            distance: Scripted::Value(distance),
            volume: Scripted::Value(0.0),
            area: Scripted::Value(0.0),
        }
    }

    /// Solids overlapping in `volume` mm³.
    pub fn overlap(volume: f64) -> Self {
        Self {
            distance: Scripted::Value(0.0),
            volume: Scripted::Value(volume),
            area: Scripted::Value(0.0),
        }
    }

    pub fn with_distance(mut self, distance: Scripted) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_volume(mut self, volume: Scripted) -> Self {
        self.volume = volume;
        self
    }

    pub fn with_area(mut self, area: Scripted) -> Self {
        self.area = area;
        self
    }
}

/// Deterministic test double for the geometric kernel.
#[derive(Debug, Default)]
pub struct MockQuery {
    scripts: HashMap<(String, String), PairScript>,
    calls: Cell<usize>,
}

impl MockQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the results for the pair of shapes named `a` and `b`, in
    /// either order.
    pub fn script(&mut self, a: &str, b: &str, script: PairScript) -> &mut Self {
        self.scripts.insert(pair_key(a, b), script);
        self
    }

    /// Number of primitive calls answered so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn lookup(&self, a: &MockSolid, b: &MockSolid) -> PairScript {
        self.calls.set(self.calls.get() + 1);
        self.scripts
            .get(&pair_key(&a.name, &b.name))
            .cloned()
            .unwrap_or_default()
    }
}

fn pair_key(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

impl GeometricQuery for MockQuery {
    type Shape = MockSolid;

    fn capability(&self) -> Capability {
        Capability::Full
    }

    fn distance(&self, a: &MockSolid, b: &MockSolid) -> Result<Outcome<f64>, QueryError> {
        self.lookup(a, b).distance.play()
    }

    fn common_volume(&self, a: &MockSolid, b: &MockSolid) -> Result<Outcome<f64>, QueryError> {
        self.lookup(a, b).volume.play()
    }

    fn common_surface_area(
        &self,
        a: &MockSolid,
        b: &MockSolid,
    ) -> Result<Outcome<f64>, QueryError> {
        self.lookup(a, b).area.play()
    }
}

impl FaceTessellator for MockQuery {
    type Shape = MockSolid;

    fn face_triangulations(&self, shape: &MockSolid, _deflection: f64) -> Vec<FaceSlot> {
        shape
            .faces
            .iter()
            .map(|face| match face {
                MockFace::Triangulated(tri) => FaceSlot::Triangulated(tri.clone()),
                MockFace::Untriangulated => FaceSlot::Missing,
                MockFace::Broken(reason) => FaceSlot::Failed(QueryError::UnsupportedShape {
                    reason: reason.clone(),
                }),
            })
            .collect()
    }
}
