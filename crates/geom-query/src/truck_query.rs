//! TruckQuery: geometric queries backed by the truck BREP library.
//!
//! Booleans run on the exact BREP. Distances and measurements run on a
//! tessellation with the query's linear deflection, so they carry its
//! chordal error. A solid nested inside its partner never reaches truck's
//! boolean, which cannot intersect disjoint shells; the common region of a
//! nested pair is the inner solid.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, instrument, warn};
use truck_modeling::Solid;

use crate::measure::{self, MeshMeasure};
use crate::projector::{MeshProjector, DEFAULT_DEFLECTION_MM};
use crate::tessellation;
use crate::traits::{FaceTessellator, GeometricQuery};
use crate::types::*;

/// Tolerance handed to truck's boolean operations.
const BOOLEAN_TOLERANCE: f64 = 0.05;

/// Tessellations kept per query, oldest evicted first.
const MESH_CACHE_CAPACITY: usize = 64;

type MeasureFn = fn(&TruckQuery, &Solid) -> Option<MeshMeasure>;

/// Measurement paths, tried in order until one yields a closed mesh.
const MEASURE_STRATEGIES: [(&str, MeasureFn); 2] = [
    ("face-wise integration", measure_face_wise),
    ("merged-mesh integration", measure_merged),
];

/// Real geometric query adapter over truck solids.
///
/// Each solid is tessellated once and kept in a small cache, and the common
/// region of the last pair is kept too, so asking for volume then area runs
/// a single boolean. The caches use interior mutability: one query serves
/// one thread.
///
/// truck reports some failed booleans by panicking. The panic is caught and
/// the primitive comes back `Unavailable`, but the process panic hook still
/// prints it. Hosts that want silence call
/// [`install_quiet_panic_hook`](crate::tessellation::install_quiet_panic_hook).
#[derive(Debug, Clone)]
pub struct TruckQuery {
    deflection: f64,
    meshes: RefCell<Vec<(Solid, Outcome<Rc<ProjectedMesh>>)>>,
    last_common: RefCell<Option<CommonEntry>>,
}

/// Common-region measure of one ordered pair.
#[derive(Debug, Clone)]
struct CommonEntry {
    a: Solid,
    b: Solid,
    measure: Outcome<MeshMeasure>,
}

/// Boundary gap of a tessellated pair, and the inner mesh when one solid
/// lies inside the other.
struct Separation {
    gap: f64,
    inner: Option<Rc<ProjectedMesh>>,
}

impl TruckQuery {
    pub fn new() -> Self {
        Self {
            deflection: DEFAULT_DEFLECTION_MM,
            meshes: RefCell::default(),
            last_common: RefCell::default(),
        }
    }

    /// Use a different tessellation deflection (mm) for distance and
    /// measurement. Cached tessellations are dropped.
    pub fn with_deflection(mut self, deflection: f64) -> Self {
        self.deflection = deflection;
        self.meshes.get_mut().clear();
        *self.last_common.get_mut() = None;
        self
    }

    pub fn deflection(&self) -> f64 {
        self.deflection
    }

    /// Tessellation of a solid, from the cache when this solid was seen
    /// before.
    fn mesh(&self, solid: &Solid) -> Outcome<Rc<ProjectedMesh>> {
        if let Some((_, cached)) = self
            .meshes
            .borrow()
            .iter()
            .find(|(seen, _)| same_solid(seen, solid))
        {
            return cached.clone();
        }

        let mesh = self.tessellate(solid).map(Rc::new);
        let mut meshes = self.meshes.borrow_mut();
        if meshes.len() >= MESH_CACHE_CAPACITY {
            meshes.remove(0);
        }
        meshes.push((solid.clone(), mesh.clone()));
        mesh
    }

    /// Tessellate a solid into one mesh, falling back to the merged mesh
    /// when face-wise extraction yields nothing.
    fn tessellate(&self, solid: &Solid) -> Outcome<ProjectedMesh> {
        let mesh = tessellation::guarded("tessellation", || {
            let mesh = MeshProjector::new(self.deflection).project(self, Some(solid));
            if mesh.is_empty() {
                tessellation::merged_mesh(solid, self.deflection)
            } else {
                mesh
            }
        });
        match mesh {
            Outcome::Done(m) if m.is_empty() => {
                Outcome::unavailable("tessellation produced no triangles")
            }
            other => other,
        }
    }

    fn separation(&self, ma: &Rc<ProjectedMesh>, mb: &Rc<ProjectedMesh>) -> Outcome<Separation> {
        let gap = match tessellation::guarded("distance", || measure::mesh_distance(ma, mb)) {
            Outcome::Done(Ok(d)) => d,
            Outcome::Done(Err(e)) => return Outcome::unavailable(e.to_string()),
            Outcome::Unavailable { reason } => return Outcome::Unavailable { reason },
        };

        // Disjoint boundaries: the pair is either apart or nested.
        let inner = if gap > 0.0 {
            if measure::nested_inside(ma, mb) {
                Some(Rc::clone(ma))
            } else if measure::nested_inside(mb, ma) {
                Some(Rc::clone(mb))
            } else {
                None
            }
        } else {
            None
        };
        Outcome::Done(Separation { gap, inner })
    }

    /// Measure of the region both solids occupy, cached for the last pair.
    fn common(&self, a: &Solid, b: &Solid) -> Outcome<MeshMeasure> {
        if let Some(entry) = self.last_common.borrow().as_ref() {
            if same_solid(&entry.a, a) && same_solid(&entry.b, b) {
                return entry.measure.clone();
            }
        }

        let measure = self.compute_common(a, b);
        *self.last_common.borrow_mut() = Some(CommonEntry {
            a: a.clone(),
            b: b.clone(),
            measure: measure.clone(),
        });
        measure
    }

    fn compute_common(&self, a: &Solid, b: &Solid) -> Outcome<MeshMeasure> {
        if let (Outcome::Done(ma), Outcome::Done(mb)) = (self.mesh(a), self.mesh(b)) {
            if !measure::bounds_overlap(&ma, &mb, self.deflection) {
                return Outcome::Done(MeshMeasure::ZERO);
            }
            match self.separation(&ma, &mb) {
                Outcome::Done(Separation {
                    inner: Some(inner), ..
                }) => {
                    debug!("common region is the nested solid");
                    return Outcome::Done(MeshMeasure::of(&inner));
                }
                Outcome::Done(Separation { gap, inner: None }) if gap > 0.0 => {
                    return Outcome::Done(MeshMeasure::ZERO);
                }
                _ => {}
            }
        }

        match self.common_solid(a, b) {
            Outcome::Done(common) => self.measure(&common),
            Outcome::Unavailable { reason } => Outcome::Unavailable { reason },
        }
    }

    /// Boolean intersection of two solids whose boundaries meet.
    fn common_solid(&self, a: &Solid, b: &Solid) -> Outcome<Solid> {
        match tessellation::guarded("boolean intersection", || {
            truck_shapeops::and(a, b, BOOLEAN_TOLERANCE)
        }) {
            Outcome::Done(Some(solid)) => Outcome::Done(solid),
            Outcome::Done(None) => Outcome::unavailable("truck and() returned None"),
            Outcome::Unavailable { reason } => Outcome::Unavailable { reason },
        }
    }

    /// Measure a solid, trying each strategy in turn.
    fn measure(&self, solid: &Solid) -> Outcome<MeshMeasure> {
        let has_faces = solid
            .boundaries()
            .iter()
            .any(|shell| shell.face_iter().next().is_some());
        if !has_faces {
            return Outcome::Done(MeshMeasure::ZERO);
        }

        for (name, strategy) in MEASURE_STRATEGIES {
            match tessellation::guarded(name, || strategy(self, solid)) {
                Outcome::Done(Some(m)) if m.volume.is_finite() && m.area.is_finite() => {
                    debug!(strategy = name, volume = m.volume, area = m.area, "measured solid");
                    return Outcome::Done(m);
                }
                Outcome::Done(_) => debug!(strategy = name, "measurement yielded nothing"),
                Outcome::Unavailable { reason } => {
                    debug!(strategy = name, %reason, "measurement failed")
                }
            }
        }
        Outcome::unavailable("no measurement strategy succeeded")
    }

    fn common_measure(
        &self,
        operation: &str,
        a: &Solid,
        b: &Solid,
        pick: fn(&MeshMeasure) -> f64,
    ) -> Result<Outcome<f64>, QueryError> {
        match self.common(a, b).map(|m| pick(&m)) {
            Outcome::Done(v) => Ok(Outcome::Done(finite(operation, v)?)),
            Outcome::Unavailable { reason } => {
                warn!(operation, %reason, "primitive unavailable");
                Ok(Outcome::Unavailable { reason })
            }
        }
    }
}

impl Default for TruckQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether two solids are built from the same faces. Clones of one solid
/// compare equal.
fn same_solid(a: &Solid, b: &Solid) -> bool {
    let face_ids = |s: &Solid| {
        s.boundaries()
            .iter()
            .flat_map(|shell| shell.face_iter())
            .map(|face| face.id())
            .collect::<Vec<_>>()
    };
    face_ids(a) == face_ids(b)
}

fn measure_face_wise(query: &TruckQuery, solid: &Solid) -> Option<MeshMeasure> {
    let mesh = MeshProjector::new(query.deflection).project(query, Some(solid));
    (!mesh.is_empty()).then(|| MeshMeasure::of(&mesh))
}

fn measure_merged(query: &TruckQuery, solid: &Solid) -> Option<MeshMeasure> {
    let mesh = tessellation::merged_mesh(solid, query.deflection);
    (!mesh.is_empty()).then(|| MeshMeasure::of(&mesh))
}

fn finite(operation: &str, value: f64) -> Result<f64, QueryError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(QueryError::NonFinite {
            operation: operation.to_string(),
            value,
        })
    }
}

impl GeometricQuery for TruckQuery {
    type Shape = Solid;

    fn capability(&self) -> Capability {
        Capability::Full
    }

    #[instrument(skip_all)]
    fn distance(&self, a: &Solid, b: &Solid) -> Result<Outcome<f64>, QueryError> {
        let (ma, mb) = match (self.mesh(a), self.mesh(b)) {
            (Outcome::Done(ma), Outcome::Done(mb)) => (ma, mb),
            (Outcome::Unavailable { reason }, _) | (_, Outcome::Unavailable { reason }) => {
                warn!(%reason, "distance unavailable");
                return Ok(Outcome::Unavailable { reason });
            }
        };

        match self.separation(&ma, &mb) {
            Outcome::Done(Separation { inner: Some(_), .. }) => {
                debug!("solid nested inside its partner");
                Ok(Outcome::Done(0.0))
            }
            Outcome::Done(Separation { gap, inner: None }) => {
                Ok(Outcome::Done(finite("distance", gap)?))
            }
            Outcome::Unavailable { reason } => {
                warn!(%reason, "distance unavailable");
                Ok(Outcome::Unavailable { reason })
            }
        }
    }

    #[instrument(skip_all)]
    fn common_volume(&self, a: &Solid, b: &Solid) -> Result<Outcome<f64>, QueryError> {
        self.common_measure("common volume", a, b, |m| m.volume)
    }

    #[instrument(skip_all)]
    fn common_surface_area(&self, a: &Solid, b: &Solid) -> Result<Outcome<f64>, QueryError> {
        self.common_measure("common surface area", a, b, |m| m.area)
    }
}

impl FaceTessellator for TruckQuery {
    type Shape = Solid;

    fn face_triangulations(&self, shape: &Solid, deflection: f64) -> Vec<FaceSlot> {
        match tessellation::guarded("face triangulation", || {
            tessellation::face_slots(shape, deflection)
        }) {
            Outcome::Done(slots) => slots,
            Outcome::Unavailable { reason } => {
                warn!(%reason, "face triangulation failed");
                Vec::new()
            }
        }
    }
}
