//! Measurement on tessellated solids: enclosed volume and surface area by
//! surface integration, point containment by winding number, and
//! boundary-to-boundary distance through parry.

use std::f64::consts::PI;

use parry3d_f64::na::{Isometry3, Point3};
use parry3d_f64::query;
use parry3d_f64::shape::TriMesh;

use crate::types::{ProjectedMesh, QueryError};

/// Volume and boundary area of a closed triangle mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshMeasure {
    pub volume: f64,
    pub area: f64,
}

impl MeshMeasure {
    /// Measure of an empty region.
    pub const ZERO: Self = Self {
        volume: 0.0,
        area: 0.0,
    };

    pub fn of(mesh: &ProjectedMesh) -> Self {
        Self {
            volume: mesh_volume(mesh),
            area: mesh_surface_area(mesh),
        }
    }
}

/// Enclosed volume by the divergence theorem.
///
/// Meaningful for closed meshes only; open meshes give an arbitrary value.
pub fn mesh_volume(mesh: &ProjectedMesh) -> f64 {
    let mut volume = 0.0f64;
    for i in 0..mesh.triangle_count() {
        let [p0, p1, p2] = mesh.triangle(i);
        // Signed volume of the tetrahedron spanned with the origin
        volume += p0[0] * (p1[1] * p2[2] - p2[1] * p1[2])
            + p1[0] * (p2[1] * p0[2] - p0[1] * p2[2])
            + p2[0] * (p0[1] * p1[2] - p1[1] * p0[2]);
    }
    (volume / 6.0).abs()
}

pub fn mesh_surface_area(mesh: &ProjectedMesh) -> f64 {
    let mut area = 0.0f64;
    for i in 0..mesh.triangle_count() {
        let [p0, p1, p2] = mesh.triangle(i);
        area += norm(cross(sub(p1, p0), sub(p2, p0))) / 2.0;
    }
    area
}

fn sub(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn norm(a: [f64; 3]) -> f64 {
    dot(a, a).sqrt()
}

/// Whether the bounds of two meshes, each grown by `slack`, overlap.
/// Empty meshes never overlap anything.
pub fn bounds_overlap(a: &ProjectedMesh, b: &ProjectedMesh, slack: f64) -> bool {
    let (Some((min_a, max_a)), Some((min_b, max_b))) = (a.bounds(), b.bounds()) else {
        return false;
    };
    (0..3).all(|i| min_a[i] - slack <= max_b[i] + slack && min_b[i] - slack <= max_a[i] + slack)
}

/// Generalized winding number of a closed mesh around `point`.
///
/// About ±1 inside and 0 outside, whatever the sign convention of the
/// winding. Works on unwelded triangle soup as long as the surface is
/// geometrically closed. Undefined for points on the surface.
pub fn winding_number(mesh: &ProjectedMesh, point: [f64; 3]) -> f64 {
    let mut solid_angle = 0.0f64;
    for i in 0..mesh.triangle_count() {
        let [p0, p1, p2] = mesh.triangle(i);
        let a = sub(p0, point);
        let b = sub(p1, point);
        let c = sub(p2, point);
        let (la, lb, lc) = (norm(a), norm(b), norm(c));
        let numerator = dot(a, cross(b, c));
        let denominator = la * lb * lc + dot(a, b) * lc + dot(b, c) * la + dot(c, a) * lb;
        solid_angle += 2.0 * numerator.atan2(denominator);
    }
    solid_angle / (4.0 * PI)
}

pub fn mesh_contains_point(mesh: &ProjectedMesh, point: [f64; 3]) -> bool {
    winding_number(mesh, point).abs() > 0.5
}

/// Whether `inner` lies inside `outer`, given that their boundaries do not
/// meet. One vertex decides: disjoint boundaries mean either nesting or
/// full separation.
pub fn nested_inside(inner: &ProjectedMesh, outer: &ProjectedMesh) -> bool {
    let (Some((inner_min, inner_max)), Some((outer_min, outer_max))) =
        (inner.bounds(), outer.bounds())
    else {
        return false;
    };
    if (0..3).any(|i| inner_min[i] < outer_min[i] || inner_max[i] > outer_max[i]) {
        return false;
    }
    inner
        .vertices
        .first()
        .is_some_and(|&v| mesh_contains_point(outer, v))
}

/// Minimum distance between the surfaces of two triangle meshes.
///
/// Surfaces that cross report 0.0. A mesh fully inside the other reports
/// the gap between the two boundaries; see [`nested_inside`].
pub fn mesh_distance(a: &ProjectedMesh, b: &ProjectedMesh) -> Result<f64, QueryError> {
    let mesh_a = to_trimesh(a)?;
    let mesh_b = to_trimesh(b)?;
    let identity = Isometry3::identity();
    query::distance(&identity, &mesh_a, &identity, &mesh_b).map_err(|e| QueryError::Kernel {
        message: format!("mesh distance unsupported: {e:?}"),
    })
}

fn to_trimesh(mesh: &ProjectedMesh) -> Result<TriMesh, QueryError> {
    if mesh.is_empty() {
        return Err(QueryError::InvalidMesh {
            reason: "no triangles".to_string(),
        });
    }
    let vertices: Vec<Point3<f64>> = mesh
        .vertices
        .iter()
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect();
    TriMesh::new(vertices, mesh.triangles.clone()).map_err(|e| QueryError::InvalidMesh {
        reason: format!("failed to build trimesh: {e:?}"),
    })
}
