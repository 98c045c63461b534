//! Feature-data fetch tracking.
//!
//! [`FetchTable`] is the authoritative per-(source, key) status map;
//! [`FetchCoordinator`] owns it and drives a [`Transport`] with bounded
//! concurrency.

pub mod config;
pub mod coordinator;
pub mod request;
pub mod source;
pub mod status;
pub mod table;
pub mod transport;

pub use config::*;
pub use coordinator::*;
pub use request::*;
pub use source::*;
pub use status::*;
pub use table::*;
pub use transport::*;
