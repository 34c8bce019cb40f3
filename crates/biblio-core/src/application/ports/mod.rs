//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `biblio-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - One repository per record type
//!   - `Clock`: today and now
//!   - `TableCodec`: delimited text parsing and writing
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - (The `Library` facade, used by the CLI and the HTTP server)

pub mod output;

pub use output::{
    BookRepository, CategoryRepository, Clock, ContactRepository, ImportLogRepository,
    InventoryRepository, LoanRepository, MemberRepository, TableCodec,
};

#[cfg(test)]
pub use output::{
    MockBookRepository, MockCategoryRepository, MockClock, MockContactRepository,
    MockImportLogRepository, MockInventoryRepository, MockLoanRepository, MockMemberRepository,
};
