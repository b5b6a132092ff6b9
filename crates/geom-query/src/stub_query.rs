//! StubQuery: stands in when no geometric kernel is loaded.

use std::marker::PhantomData;

use crate::traits::{FaceTessellator, GeometricQuery};
use crate::types::*;

const NO_KERNEL: &str = "no geometric kernel loaded";

/// Query adapter for processes without a BREP kernel. Every primitive is
/// unavailable and every shape tessellates to nothing.
pub struct StubQuery<S = ()> {
    _shape: PhantomData<fn(&S)>,
}

impl<S> StubQuery<S> {
    pub fn new() -> Self {
        Self {
            _shape: PhantomData,
        }
    }
}

impl<S> Default for StubQuery<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> GeometricQuery for StubQuery<S> {
    type Shape = S;

    fn capability(&self) -> Capability {
        Capability::Stub
    }

    fn distance(&self, _a: &S, _b: &S) -> Result<Outcome<f64>, QueryError> {
        Ok(Outcome::unavailable(NO_KERNEL))
    }

    fn common_volume(&self, _a: &S, _b: &S) -> Result<Outcome<f64>, QueryError> {
        Ok(Outcome::unavailable(NO_KERNEL))
    }

    fn common_surface_area(&self, _a: &S, _b: &S) -> Result<Outcome<f64>, QueryError> {
        Ok(Outcome::unavailable(NO_KERNEL))
    }
}

impl<S> FaceTessellator for StubQuery<S> {
    type Shape = S;

    fn face_triangulations(&self, _shape: &S, _deflection: f64) -> Vec<FaceSlot> {
        Vec::new()
    }
}
