//! Infrastructure adapters for Biblio.
//!
//! This crate implements the ports defined in `biblio_core::application::ports`.
//! It contains all external dependencies and I/O operations.

pub mod clock;
pub mod csv_codec;
pub mod store;

use std::sync::Arc;

use biblio_core::application::{Library, LibrarySettings, Repositories, ports::Clock};

// Re-export commonly used adapters
pub use clock::{FixedClock, SystemClock};
pub use csv_codec::CsvCodec;
pub use store::InMemoryStore;

/// Wire a [`Library`] to a store, a clock and the CSV codec.
pub fn library(store: InMemoryStore, clock: Arc<dyn Clock>, settings: LibrarySettings) -> Library {
    let repos = Repositories::from_store(Arc::new(store), clock);
    Library::new(repos, Arc::new(CsvCodec), settings)
}
