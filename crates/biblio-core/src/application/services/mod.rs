//! Application services - orchestrate use cases.
//!
//! Services coordinate the domain layer and ports to accomplish
//! high-level use cases like "check out a book" or "import a member file".

pub mod catalog_service;
pub mod export_service;
pub mod import_service;
pub mod inventory_service;
pub mod library;
pub mod loan_service;
pub mod member_service;
pub mod report_service;

pub use catalog_service::{AuthorSummary, BookQuery, CatalogService, CategorySummary};
pub use export_service::{ExportField, ExportFile, ExportRequest, ExportService};
pub use import_service::{
    BOOK_COLUMNS, ImportOptions, ImportService, ImportSummary, MEMBER_COLUMNS, RowError,
};
pub use inventory_service::{InventoryService, InventoryView};
pub use library::{Library, Repositories};
pub use loan_service::{Checkout, CheckoutRequest, LoanQuery, LoanService, LoanView};
pub use member_service::{
    MemberContact, MemberPatch, MemberQuery, MemberRegistration, MembershipService,
};
pub use report_service::{
    GroupBy, LoanReport, LoanReportRequest, LoanTotals, ReportGroup, ReportService,
};
