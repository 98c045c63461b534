//! Site context: payload types, hydration into feature buckets, and links.

pub mod context;
pub mod hydrate;
pub mod links;

pub use context::*;
pub use hydrate::*;
pub use links::*;
