//! Mesh projection: flatten a solid's per-face triangulations into one
//! shared vertex buffer for lightweight viewers.

use nalgebra::Point3;
use tracing::{debug, instrument};

use crate::traits::FaceTessellator;
use crate::types::*;

/// Linear deflection used when the caller does not pick one, in mm.
pub const DEFAULT_DEFLECTION_MM: f64 = 0.2;

/// Converts BREP solids into a single triangle mesh.
#[derive(Debug, Clone, Copy)]
pub struct MeshProjector {
    deflection: f64,
}

impl Default for MeshProjector {
    fn default() -> Self {
        Self::new(DEFAULT_DEFLECTION_MM)
    }
}

impl MeshProjector {
    pub fn new(deflection: f64) -> Self {
        Self { deflection }
    }

    pub fn deflection(&self) -> f64 {
        self.deflection
    }

    /// Project `shape` through `kernel`.
    ///
    /// Face nodes are moved into the global frame by their placement, and
    /// face-local triangle indices are offset by the number of vertices
    /// already accumulated. Faces without a usable triangulation are
    /// skipped; an absent shape or a solid with no triangles at all gives
    /// an empty mesh.
    #[instrument(skip_all, fields(deflection = self.deflection))]
    pub fn project<K: FaceTessellator>(
        &self,
        kernel: &K,
        shape: Option<&K::Shape>,
    ) -> ProjectedMesh {
        let Some(shape) = shape else {
            return ProjectedMesh::default();
        };

        let mut mesh = ProjectedMesh::default();
        let mut skipped = 0usize;

        for slot in kernel.face_triangulations(shape, self.deflection) {
            let tri = match slot {
                FaceSlot::Triangulated(tri) if !tri.triangles.is_empty() => tri,
                FaceSlot::Triangulated(_) | FaceSlot::Missing => {
                    skipped += 1;
                    continue;
                }
                FaceSlot::Failed(err) => {
                    debug!(%err, "skipping unresolved face");
                    skipped += 1;
                    continue;
                }
            };
            if !append_face(&mut mesh, &tri) {
                skipped += 1;
            }
        }

        debug!(
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count(),
            skipped,
            "projected solid"
        );

        if mesh.is_empty() {
            return ProjectedMesh::default();
        }
        mesh
    }
}

/// Append one face, returning whether it contributed any triangle.
fn append_face(mesh: &mut ProjectedMesh, tri: &FaceTriangulation) -> bool {
    let node_count = tri.nodes.len();
    // Triangles pointing past this face's nodes are dropped.
    let valid: Vec<&[usize; 3]> = tri
        .triangles
        .iter()
        .filter(|t| t.iter().all(|&i| i < node_count))
        .collect();
    if valid.is_empty() {
        return false;
    }

    let base = mesh.vertices.len() as u32;
    for node in &tri.nodes {
        let p = tri
            .placement
            .transform_point(&Point3::new(node[0], node[1], node[2]));
        mesh.vertices.push([p.x, p.y, p.z]);
    }
    for t in valid {
        mesh.triangles
            .push([base + t[0] as u32, base + t[1] as u32, base + t[2] as u32]);
    }
    true
}
