//! Application layer for Biblio.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (catalogue, membership, loans,
//!   inventory, import, export, reports) behind the `Library` facade
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! lending rules itself. All rules live in `crate::domain`.

pub mod csv;
pub mod error;
pub mod ports;
pub mod services;
pub mod settings;

// Re-export main services
pub use services::{
    AuthorSummary, BookQuery, CatalogService, CategorySummary, Checkout, CheckoutRequest,
    ExportField, ExportFile, ExportRequest, ExportService, GroupBy, ImportOptions, ImportService,
    ImportSummary, InventoryService, InventoryView, Library, LoanQuery, LoanReport,
    LoanReportRequest, LoanService, LoanTotals, LoanView, MemberContact, MemberPatch, MemberQuery,
    MemberRegistration, MembershipService, ReportService, Repositories, RowError,
};

// Re-export port traits (for adapter implementation)
pub use ports::{
    BookRepository, CategoryRepository, Clock, ContactRepository, ImportLogRepository,
    InventoryRepository, LoanRepository, MemberRepository, TableCodec,
};

pub use csv::{CsvFormat, Delimiter, Table, TableRow};
pub use error::ApplicationError;
pub use settings::LibrarySettings;
