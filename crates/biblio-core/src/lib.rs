//! Biblio Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Biblio
//! library lending engine, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │      biblio-cli / biblio-server         │
//! │     (Drive the Library facade)          │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (Catalog, Membership, Loan, Import..)  │
//! │         Orchestrates Use Cases          │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │  (Repositories, Clock, TableCodec)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │    biblio-adapters (Infrastructure)     │
//! │  (InMemoryStore, CsvCodec, Clocks)      │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │     (Book, Member, Loan, Inventory)     │
//! │         No External Dependencies        │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use biblio_core::prelude::*;
//!
//! // Adapters come from biblio-adapters
//! let repos = Repositories::from_store(store, clock);
//! let library = Library::new(repos, codec, LibrarySettings::default());
//!
//! let book = library.catalog.create_book(BookDraft::new("Rayuela"))?;
//! let checkout = library
//!     .loans
//!     .checkout(CheckoutRequest::new(book.id, member_id))?;
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        BookQuery, CheckoutRequest, CsvFormat, Delimiter, ExportRequest, ImportOptions, Library,
        LibrarySettings, LoanQuery, LoanReportRequest, MemberQuery, MemberRegistration,
        Repositories,
        ports::{Clock, TableCodec},
    };
    pub use crate::domain::{
        Book, BookDraft, BookId, BookPatch, BookStatus, ContactDraft, DataKind, Loan, LoanId,
        LoanState, Member, MemberId, MemberProfile,
    };
    pub use crate::error::{LibraryError, LibraryResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
