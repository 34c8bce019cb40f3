//! Record storage.

mod memory;
pub mod snapshot;
mod state;

pub use memory::InMemoryStore;
pub use snapshot::SnapshotError;
