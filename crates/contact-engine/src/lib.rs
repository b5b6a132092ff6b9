//! Pairwise contact and clearance classification for CAD assemblies.
//!
//! [`ContactClassifier`] walks every unordered pair of assembly members and
//! decides whether they penetrate, touch or keep clearance, using whatever
//! [`geom_query::GeometricQuery`] adapter the caller injects. Without a
//! kernel it still answers, at stub fidelity.

pub mod classifier;
pub mod engine;
pub mod report;
pub mod resolver;
pub mod types;

pub use classifier::ContactClassifier;
pub use engine::{AssemblyContacts, ContactEngine};
pub use report::{replace_assembly_rows, rows_for, rows_to_json};
pub use resolver::{ShapeLibrary, ShapeResolver};
pub use types::*;
