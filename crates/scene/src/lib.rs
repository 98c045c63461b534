pub mod catalogue;
pub mod focus;
pub mod geometry;
pub mod query;
pub mod selection;

pub use catalogue::*;
pub use focus::*;
pub use geometry::*;
pub use query::*;
pub use selection::*;
