//! Truck tessellation access.
//!
//! Wraps truck-meshalgo to report per-face triangulations of a solid, and a
//! merged single-mesh fallback for when face-wise extraction yields nothing.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};

use truck_meshalgo::prelude::*;
use truck_meshalgo::tessellation::{MeshableShape, MeshedShape};

use crate::types::*;

type TruckSolid = truck_modeling::Solid;

/// Triangulate a truck solid and report each face in shell order.
///
/// Truck surfaces live in the solid's global frame, so every placement is
/// the identity. Faces the mesher left without a polygon are `Missing`.
pub fn face_slots(solid: &TruckSolid, tolerance: f64) -> Vec<FaceSlot> {
    let meshed_solid = solid.triangulation(tolerance);

    let mut slots = Vec::new();
    for shell in meshed_solid.boundaries().iter() {
        for face in shell.face_iter() {
            let maybe_mesh: Option<PolygonMesh> = face.surface();
            let Some(face_mesh) = maybe_mesh else {
                slots.push(FaceSlot::Missing);
                continue;
            };

            // Inverted faces carry inverted meshes
            let face_mesh = if !face.orientation() {
                let mut m = face_mesh;
                m.invert();
                m
            } else {
                face_mesh
            };

            let nodes: Vec<[f64; 3]> = face_mesh
                .positions()
                .iter()
                .map(|p| [p[0], p[1], p[2]])
                .collect();
            let triangles: Vec<[usize; 3]> = face_mesh
                .tri_faces()
                .iter()
                .map(|tri| [tri[0].pos, tri[1].pos, tri[2].pos])
                .collect();

            slots.push(FaceSlot::Triangulated(FaceTriangulation::new(
                nodes, triangles,
            )));
        }
    }
    slots
}

/// Fallback tessellation: merge everything into a single mesh.
pub fn merged_mesh(solid: &TruckSolid, tolerance: f64) -> ProjectedMesh {
    let meshed = solid.triangulation(tolerance);
    let mesh = meshed.to_polygon();

    let vertices = mesh.positions().iter().map(|p| [p[0], p[1], p[2]]).collect();
    let triangles = mesh
        .tri_faces()
        .iter()
        .map(|tri| [tri[0].pos as u32, tri[1].pos as u32, tri[2].pos as u32])
        .collect();

    ProjectedMesh {
        vertices,
        triangles,
    }
}

thread_local! {
    static GUARD_DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Run a kernel call, turning a panic inside truck into `Unavailable`.
///
/// The process panic hook still runs before the unwind is caught, so a
/// failing truck boolean prints to stderr unless the host installed
/// [`install_quiet_panic_hook`].
pub fn guarded<T>(operation: &str, f: impl FnOnce() -> T) -> Outcome<T> {
    GUARD_DEPTH.with(|d| d.set(d.get() + 1));
    let result = panic::catch_unwind(AssertUnwindSafe(f));
    GUARD_DEPTH.with(|d| d.set(d.get() - 1));

    match result {
        Ok(value) => Outcome::Done(value),
        Err(payload) => {
            let detail = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            tracing::warn!(operation, %detail, "kernel panicked");
            Outcome::unavailable(format!("{operation} panicked: {detail}"))
        }
    }
}

/// Chain a panic hook that stays silent for panics raised inside
/// [`guarded`] on the current thread and defers to the previous hook for
/// everything else.
///
/// Opt-in: the library never replaces the hook on its own.
pub fn install_quiet_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if !inside_guard() {
            previous(info);
        }
    }));
}

fn inside_guard() -> bool {
    GUARD_DEPTH.with(|d| d.get() > 0)
}
