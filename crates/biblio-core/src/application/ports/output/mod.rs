//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `biblio-adapters` crate provides implementations.
//!
//! Repositories are deliberately dumb: they store and fetch records and
//! report missing ids. Uniqueness and lending rules are checked by the
//! services before anything is written.

use chrono::{DateTime, NaiveDate, Utc};

use crate::application::csv::{CsvFormat, Delimiter, Table};
use crate::domain::{
    Book, BookId, Category, CategoryId, Contact, ContactId, Email, ImportLog, ImportLogId,
    InventoryId, InventoryRecord, Isbn, Loan, LoanId, Member, MemberId,
};
use crate::error::LibraryResult;

/// Port for the book catalogue.
///
/// Implemented by:
/// - `biblio_adapters::InMemoryStore::new` (volatile)
/// - `biblio_adapters::InMemoryStore::open` (data file rewritten on every write)
#[cfg_attr(test, mockall::automock)]
pub trait BookRepository: Send + Sync {
    /// Reserve the next sequential id.
    fn next_id(&self) -> LibraryResult<BookId>;

    fn insert(&self, book: Book) -> LibraryResult<()>;

    /// Replace a stored book. Fails with `NotFound` for unknown ids.
    fn update(&self, book: Book) -> LibraryResult<()>;

    fn get(&self, id: BookId) -> LibraryResult<Book>;

    /// All books in id order.
    fn list(&self) -> LibraryResult<Vec<Book>>;

    fn remove(&self, id: BookId) -> LibraryResult<()>;

    fn find_by_isbn(&self, isbn: &Isbn) -> LibraryResult<Option<Book>>;
}

/// Port for contacts (people and companies, optionally authors).
#[cfg_attr(test, mockall::automock)]
pub trait ContactRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<ContactId>;
    fn insert(&self, contact: Contact) -> LibraryResult<()>;
    fn update(&self, contact: Contact) -> LibraryResult<()>;
    fn get(&self, id: ContactId) -> LibraryResult<Contact>;
    fn list(&self) -> LibraryResult<Vec<Contact>>;
    fn remove(&self, id: ContactId) -> LibraryResult<()>;
    fn find_by_email(&self, email: &Email) -> LibraryResult<Option<Contact>>;
}

/// Port for library members.
#[cfg_attr(test, mockall::automock)]
pub trait MemberRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<MemberId>;
    fn insert(&self, member: Member) -> LibraryResult<()>;
    fn update(&self, member: Member) -> LibraryResult<()>;
    fn get(&self, id: MemberId) -> LibraryResult<Member>;
    fn list(&self) -> LibraryResult<Vec<Member>>;
    fn remove(&self, id: MemberId) -> LibraryResult<()>;

    /// The member linked to a contact, if any.
    fn find_by_contact(&self, contact: ContactId) -> LibraryResult<Option<Member>>;
}

/// Port for loans.
#[cfg_attr(test, mockall::automock)]
pub trait LoanRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<LoanId>;
    fn insert(&self, loan: Loan) -> LibraryResult<()>;
    fn update(&self, loan: Loan) -> LibraryResult<()>;
    fn get(&self, id: LoanId) -> LibraryResult<Loan>;
    fn list(&self) -> LibraryResult<Vec<Loan>>;
    fn remove(&self, id: LoanId) -> LibraryResult<()>;

    /// The open (active or overdue) loan of a book, if any.
    fn open_for_book(&self, book: BookId) -> LibraryResult<Option<Loan>>;

    /// Every loan of a member, open or not.
    fn for_member(&self, member: MemberId) -> LibraryResult<Vec<Loan>>;

    /// Every loan of a book, open or not.
    fn for_book(&self, book: BookId) -> LibraryResult<Vec<Loan>>;
}

/// Port for book categories.
#[cfg_attr(test, mockall::automock)]
pub trait CategoryRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<CategoryId>;
    fn insert(&self, category: Category) -> LibraryResult<()>;
    fn update(&self, category: Category) -> LibraryResult<()>;
    fn get(&self, id: CategoryId) -> LibraryResult<Category>;
    fn list(&self) -> LibraryResult<Vec<Category>>;
    fn remove(&self, id: CategoryId) -> LibraryResult<()>;

    /// Case-insensitive lookup.
    fn find_by_name(&self, name: &str) -> LibraryResult<Option<Category>>;
}

/// Port for per-book stock records.
#[cfg_attr(test, mockall::automock)]
pub trait InventoryRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<InventoryId>;
    fn insert(&self, record: InventoryRecord) -> LibraryResult<()>;
    fn update(&self, record: InventoryRecord) -> LibraryResult<()>;
    fn get(&self, id: InventoryId) -> LibraryResult<InventoryRecord>;
    fn list(&self) -> LibraryResult<Vec<InventoryRecord>>;
    fn remove(&self, id: InventoryId) -> LibraryResult<()>;
    fn find_by_book(&self, book: BookId) -> LibraryResult<Option<InventoryRecord>>;
}

/// Port for the import audit trail. Entries are never deleted.
#[cfg_attr(test, mockall::automock)]
pub trait ImportLogRepository: Send + Sync {
    fn next_id(&self) -> LibraryResult<ImportLogId>;
    fn insert(&self, log: ImportLog) -> LibraryResult<()>;
    fn update(&self, log: ImportLog) -> LibraryResult<()>;
    fn get(&self, id: ImportLogId) -> LibraryResult<ImportLog>;

    /// Newest first.
    fn list(&self) -> LibraryResult<Vec<ImportLog>>;
}

/// Port for the current date and time.
///
/// Implemented by:
/// - `biblio_adapters::SystemClock` (production)
/// - `biblio_adapters::FixedClock` (testing)
#[cfg_attr(test, mockall::automock)]
pub trait Clock: Send + Sync {
    fn today(&self) -> NaiveDate;
    fn now(&self) -> DateTime<Utc>;
}

/// Port for delimited text.
///
/// Implemented by `biblio_adapters::CsvCodec`.
pub trait TableCodec: Send + Sync {
    /// Split already-decoded text into rows.
    ///
    /// Malformed rows are reported inside the table; only a failure to read
    /// the file as a whole is an error.
    fn parse(&self, text: &str, format: &CsvFormat) -> LibraryResult<Table>;

    /// Write a header and rows as delimited text. Fields are quoted when
    /// needed.
    fn write(
        &self,
        header: &[String],
        rows: &[Vec<String>],
        delimiter: Delimiter,
    ) -> LibraryResult<Vec<u8>>;
}
