use crate::types::*;

/// Distance, intersection and measurement primitives over opaque solids.
///
/// Implemented by TruckQuery (real BREP kernel), StubQuery (no kernel) and
/// MockQuery (scripted test double). Callers never learn which one backs
/// the interface beyond [`GeometricQuery::capability`].
pub trait GeometricQuery {
    type Shape;

    fn capability(&self) -> Capability;

    /// Minimum Euclidean distance between the two solids' boundaries, in mm.
    fn distance(&self, a: &Self::Shape, b: &Self::Shape) -> Result<Outcome<f64>, QueryError>;

    /// Volume of the boolean intersection, in mm³. 0.0 when the
    /// intersection is empty.
    fn common_volume(&self, a: &Self::Shape, b: &Self::Shape)
        -> Result<Outcome<f64>, QueryError>;

    /// Boundary surface area of the boolean intersection, in mm².
    fn common_surface_area(
        &self,
        a: &Self::Shape,
        b: &Self::Shape,
    ) -> Result<Outcome<f64>, QueryError>;
}

/// Per-face triangulation access, consumed by the mesh projector.
pub trait FaceTessellator {
    type Shape;

    /// Triangulate the solid (if needed) with the given linear deflection and
    /// report every face in traversal order.
    fn face_triangulations(&self, shape: &Self::Shape, deflection: f64) -> Vec<FaceSlot>;
}
