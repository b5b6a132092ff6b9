pub mod config;
pub mod member;
pub mod record;
pub mod row;

pub use config::*;
pub use member::*;
pub use record::*;
pub use row::*;
