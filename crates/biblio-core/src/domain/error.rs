// ============================================================================
// domain/error.rs - LENDING RULE VIOLATIONS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (so import rows can keep them)
/// - Categorizable (for CLI exit codes and HTTP status)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors (400-level equivalent)
    // ========================================================================
    #[error("{field} is required")]
    MissingRequiredField { field: &'static str },

    #[error("Invalid ISBN '{value}': {reason}")]
    InvalidIsbn { value: String, reason: &'static str },

    #[error("Invalid email: {value}")]
    InvalidEmail { value: String },

    #[error("{field} cannot be negative (got {value})")]
    NegativeValue { field: &'static str, value: String },

    #[error("Invalid {field} '{value}': expected {expected}")]
    InvalidValue {
        field: &'static str,
        value: String,
        expected: String,
    },

    #[error("Loan duration must be at least one day (got {days})")]
    InvalidLoanDuration { days: i64 },

    #[error("Start date {from} is after end date {to}")]
    InvalidDateRange { from: String, to: String },

    #[error("Death date {death} precedes birth date {birth}")]
    InvalidLifespan { birth: String, death: String },

    #[error("Outflows ({outflows}) cannot exceed initial stock plus inflows ({received})")]
    StockInconsistent { outflows: i64, received: i64 },

    #[error("Stock count overflow: {field} is too large")]
    StockOverflow { field: &'static str },

    // ========================================================================
    // Operation Conflicts (409-level equivalent)
    // ========================================================================
    #[error("A book with ISBN {isbn} already exists")]
    DuplicateIsbn { isbn: String },

    #[error("Category '{name}' already exists")]
    DuplicateCategory { name: String },

    #[error("{contact} is already registered as member {card}")]
    ContactAlreadyMember { contact: String, card: String },

    #[error("{contact} is a company and cannot hold a membership")]
    CompanyCannotBeMember { contact: String },

    #[error("'{book}' is already on loan to {member}")]
    BookAlreadyLoaned { book: String, member: String },

    #[error("'{book}' cannot be loaned while its status is {status}")]
    BookUnavailable { book: String, status: String },

    #[error("Member {card} is inactive")]
    MemberInactive { card: String },

    #[error("Member {card} already has {limit} active loans")]
    LoanLimitReached { card: String, limit: usize },

    #[error("Cannot delete '{book}' while it is on loan")]
    BookOnLoan { book: String },

    #[error("Cannot delete loan #{loan} while it is {state}")]
    OpenLoanDeletion { loan: u64, state: String },

    #[error("Member {card} still has {count} open loan(s)")]
    MemberHasOpenLoans { card: String, count: usize },

    #[error("Loan #{loan} was already returned")]
    LoanAlreadyReturned { loan: u64 },

    #[error("Only active loans can be renewed (loan #{loan} is {state})")]
    LoanNotActive { loan: u64, state: String },

    #[error("Loan #{loan} is {days} day(s) late and cannot be renewed")]
    LoanOverdue { loan: u64, days: i64 },

    #[error("No copies of '{book}' are available to write off")]
    NoStockAvailable { book: String },

    #[error("An inventory record already exists for '{book}'")]
    InventoryExists { book: String },

    #[error("Import log #{log} has already been finalized")]
    ImportAlreadyFinalized { log: u64 },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIsbn { .. } => vec![
                "An ISBN has 10 or 13 digits once dashes and spaces are removed".into(),
                "The final character of an ISBN-10 may be 'X'".into(),
            ],
            Self::InvalidEmail { value } => vec![
                format!("'{}' is not a valid address", value),
                "Use the form name@domain.tld".into(),
            ],
            Self::DuplicateIsbn { isbn } => vec![
                format!("Look up the existing book: biblio book list --search {}", isbn),
                "Use --update-existing when importing to overwrite it".into(),
            ],
            Self::BookAlreadyLoaned { .. } => vec![
                "Return the current loan before lending the book again".into(),
                "List open loans: biblio loan list --state active".into(),
            ],
            Self::BookUnavailable { .. } => vec![
                "Set the book back to available: biblio book status <ID> available".into(),
            ],
            Self::LoanLimitReached { limit, .. } => vec![
                format!("Members may hold at most {} loans at once", limit),
                "Return a book before borrowing another".into(),
            ],
            Self::MemberInactive { card } => vec![
                format!("Reactivate the member: biblio member activate {}", card),
            ],
            Self::LoanOverdue { .. } => vec![
                "Late loans must be returned instead of renewed".into(),
            ],
            Self::BookOnLoan { .. } | Self::MemberHasOpenLoans { .. } => vec![
                "Return all open loans first".into(),
            ],
            Self::OpenLoanDeletion { .. } => vec![
                "Return the loan before deleting it".into(),
            ],
            Self::NoStockAvailable { .. } => vec![
                "Add stock first: biblio inventory add-stock <BOOK_ID>".into(),
            ],
            Self::MissingRequiredField { field } => vec![format!("Provide a value for {}", field)],
            _ => vec!["See documentation for more details".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingRequiredField { .. }
            | Self::InvalidIsbn { .. }
            | Self::InvalidEmail { .. }
            | Self::NegativeValue { .. }
            | Self::InvalidValue { .. }
            | Self::InvalidLoanDuration { .. }
            | Self::InvalidDateRange { .. }
            | Self::InvalidLifespan { .. }
            | Self::StockInconsistent { .. }
            | Self::StockOverflow { .. } => ErrorCategory::Validation,
            Self::ImportAlreadyFinalized { .. } => ErrorCategory::Internal,
            _ => ErrorCategory::Conflict,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Conflict,
    Internal,
}
