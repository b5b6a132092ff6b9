pub mod measure;
pub mod mock_query;
pub mod primitives;
pub mod projector;
pub mod stub_query;
pub mod tessellation;
pub mod traits;
pub mod truck_query;
pub mod types;

pub use mock_query::{MockFace, MockQuery, MockSolid, PairScript, Scripted};
pub use projector::MeshProjector;
pub use stub_query::StubQuery;
pub use tessellation::install_quiet_panic_hook;
pub use traits::*;
pub use truck_query::TruckQuery;
pub use types::*;
