//! Data-access capability: the operations a generated route runs between its hooks.

mod collection;
mod generator;
mod memory;

pub use collection::{matches_filters, Collection, DataAccess};
pub use generator::{Generator, DEFAULT_BODY_LIMIT};
pub use memory::MemoryCollection;
