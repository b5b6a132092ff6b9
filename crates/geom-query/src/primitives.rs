//! Box solids built from truck's sweep API.
//!
//! truck has no built-in box; everything is successive sweeps.

use truck_modeling::builder;
use truck_modeling::topology::Solid;
use truck_modeling::{Point3, Vector3};

/// Create a box solid via successive translational sweeps.
/// Origin at (0,0,0), extends to (w,h,d).
pub fn make_box(w: f64, h: f64, d: f64) -> Solid {
    let v = builder::vertex(Point3::new(0.0, 0.0, 0.0));
    let edge = builder::tsweep(&v, Vector3::new(w, 0.0, 0.0));
    let face = builder::tsweep(&edge, Vector3::new(0.0, h, 0.0));
    builder::tsweep(&face, Vector3::new(0.0, 0.0, d))
}

/// Create an axis-aligned box with its minimum corner at `origin`.
pub fn make_box_at(origin: [f64; 3], size: [f64; 3]) -> Solid {
    let solid = make_box(size[0], size[1], size[2]);
    builder::translated(&solid, Vector3::new(origin[0], origin[1], origin[2]))
}
