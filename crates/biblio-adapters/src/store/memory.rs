//! In-memory record store, optionally backed by a JSON file.

use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

use tracing::{debug, error};

use biblio_core::{
    application::{
        ApplicationError,
        ports::{
            BookRepository, CategoryRepository, ContactRepository, ImportLogRepository,
            InventoryRepository, LoanRepository, MemberRepository,
        },
    },
    domain::{
        Book, BookId, Category, CategoryId, Contact, ContactId, Email, ImportLog, ImportLogId,
        InventoryId, InventoryRecord, Isbn, Loan, LoanId, Member, MemberId,
    },
    error::LibraryResult,
};

use super::snapshot;
use super::state::{LibraryState, add, discard, fetch, next, replace};

/// Thread-safe store implementing every repository port.
///
/// Opened with [`InMemoryStore::open`], the store rewrites its data file
/// after each successful change.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<RwLock<LibraryState>>,
    data_file: Option<PathBuf>,
}

impl InMemoryStore {
    /// Create a new empty, volatile store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a data file (missing means empty) and keep it up to date.
    pub fn open(path: impl Into<PathBuf>) -> LibraryResult<Self> {
        let path = path.into();
        let state = snapshot::load(&path)?;
        debug!(
            path = %path.display(),
            books = state.books.len(),
            members = state.members.len(),
            loans = state.loans.len(),
            "Data file loaded"
        );
        Ok(Self {
            inner: Arc::new(RwLock::new(state)),
            data_file: Some(path),
        })
    }

    pub fn data_file(&self) -> Option<&Path> {
        self.data_file.as_deref()
    }

    /// Number of books stored.
    pub fn book_count(&self) -> LibraryResult<usize> {
        self.read(|s| s.books.len())
    }

    /// Write the data file now. A no-op for volatile stores.
    pub fn flush(&self) -> LibraryResult<()> {
        let state = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        self.persist(&state)
    }

    fn read<R>(&self, f: impl FnOnce(&LibraryState) -> R) -> LibraryResult<R> {
        let state = self
            .inner
            .read()
            .map_err(|_| ApplicationError::StoreLockError)?;
        Ok(f(&state))
    }

    /// Run a change under the write lock, then persist.
    ///
    /// `f` must check before it mutates; an error leaves the state as it was.
    fn write<R>(&self, f: impl FnOnce(&mut LibraryState) -> LibraryResult<R>) -> LibraryResult<R> {
        let mut state = self
            .inner
            .write()
            .map_err(|_| ApplicationError::StoreLockError)?;
        let out = f(&mut state)?;
        self.persist(&state)?;
        Ok(out)
    }

    fn persist(&self, state: &LibraryState) -> LibraryResult<()> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };
        snapshot::save(path, state).map_err(|e| {
            error!(path = %path.display(), error = %e, "Failed to write data file");
            e.into()
        })
    }
}

impl BookRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<BookId> {
        self.write(|s| Ok(BookId::new(next(&mut s.sequences.book))))
    }

    fn insert(&self, book: Book) -> LibraryResult<()> {
        self.write(|s| add(&mut s.books, "Book", book.id, book))
    }

    fn update(&self, book: Book) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.books, "Book", book.id, book))
    }

    fn get(&self, id: BookId) -> LibraryResult<Book> {
        self.read(|s| fetch(&s.books, "Book", id))?
    }

    fn list(&self) -> LibraryResult<Vec<Book>> {
        self.read(|s| s.books.values().cloned().collect())
    }

    fn remove(&self, id: BookId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.books, "Book", id))
    }

    fn find_by_isbn(&self, isbn: &Isbn) -> LibraryResult<Option<Book>> {
        self.read(|s| {
            s.books
                .values()
                .find(|b| b.isbn.as_ref() == Some(isbn))
                .cloned()
        })
    }
}

impl ContactRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<ContactId> {
        self.write(|s| Ok(ContactId::new(next(&mut s.sequences.contact))))
    }

    fn insert(&self, contact: Contact) -> LibraryResult<()> {
        self.write(|s| add(&mut s.contacts, "Contact", contact.id, contact))
    }

    fn update(&self, contact: Contact) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.contacts, "Contact", contact.id, contact))
    }

    fn get(&self, id: ContactId) -> LibraryResult<Contact> {
        self.read(|s| fetch(&s.contacts, "Contact", id))?
    }

    fn list(&self) -> LibraryResult<Vec<Contact>> {
        self.read(|s| s.contacts.values().cloned().collect())
    }

    fn remove(&self, id: ContactId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.contacts, "Contact", id))
    }

    fn find_by_email(&self, email: &Email) -> LibraryResult<Option<Contact>> {
        self.read(|s| {
            s.contacts
                .values()
                .find(|c| c.email.as_ref() == Some(email))
                .cloned()
        })
    }
}

impl MemberRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<MemberId> {
        self.write(|s| Ok(MemberId::new(next(&mut s.sequences.member))))
    }

    fn insert(&self, member: Member) -> LibraryResult<()> {
        self.write(|s| add(&mut s.members, "Member", member.id, member))
    }

    fn update(&self, member: Member) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.members, "Member", member.id, member))
    }

    fn get(&self, id: MemberId) -> LibraryResult<Member> {
        self.read(|s| fetch(&s.members, "Member", id))?
    }

    fn list(&self) -> LibraryResult<Vec<Member>> {
        self.read(|s| s.members.values().cloned().collect())
    }

    fn remove(&self, id: MemberId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.members, "Member", id))
    }

    fn find_by_contact(&self, contact: ContactId) -> LibraryResult<Option<Member>> {
        self.read(|s| {
            s.members
                .values()
                .find(|m| m.contact_id == contact)
                .cloned()
        })
    }
}

impl LoanRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<LoanId> {
        self.write(|s| Ok(LoanId::new(next(&mut s.sequences.loan))))
    }

    fn insert(&self, loan: Loan) -> LibraryResult<()> {
        self.write(|s| add(&mut s.loans, "Loan", loan.id, loan))
    }

    fn update(&self, loan: Loan) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.loans, "Loan", loan.id, loan))
    }

    fn get(&self, id: LoanId) -> LibraryResult<Loan> {
        self.read(|s| fetch(&s.loans, "Loan", id))?
    }

    fn list(&self) -> LibraryResult<Vec<Loan>> {
        self.read(|s| s.loans.values().cloned().collect())
    }

    fn remove(&self, id: LoanId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.loans, "Loan", id))
    }

    fn open_for_book(&self, book: BookId) -> LibraryResult<Option<Loan>> {
        self.read(|s| {
            s.loans
                .values()
                .find(|l| l.book_id == book && l.is_open())
                .cloned()
        })
    }

    fn for_member(&self, member: MemberId) -> LibraryResult<Vec<Loan>> {
        self.read(|s| {
            s.loans
                .values()
                .filter(|l| l.member_id == member)
                .cloned()
                .collect()
        })
    }

    fn for_book(&self, book: BookId) -> LibraryResult<Vec<Loan>> {
        self.read(|s| {
            s.loans
                .values()
                .filter(|l| l.book_id == book)
                .cloned()
                .collect()
        })
    }
}

impl CategoryRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<CategoryId> {
        self.write(|s| Ok(CategoryId::new(next(&mut s.sequences.category))))
    }

    fn insert(&self, category: Category) -> LibraryResult<()> {
        self.write(|s| add(&mut s.categories, "Category", category.id, category))
    }

    fn update(&self, category: Category) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.categories, "Category", category.id, category))
    }

    fn get(&self, id: CategoryId) -> LibraryResult<Category> {
        self.read(|s| fetch(&s.categories, "Category", id))?
    }

    fn list(&self) -> LibraryResult<Vec<Category>> {
        self.read(|s| s.categories.values().cloned().collect())
    }

    fn remove(&self, id: CategoryId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.categories, "Category", id))
    }

    fn find_by_name(&self, name: &str) -> LibraryResult<Option<Category>> {
        self.read(|s| s.categories.values().find(|c| c.same_name(name)).cloned())
    }
}

impl InventoryRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<InventoryId> {
        self.write(|s| Ok(InventoryId::new(next(&mut s.sequences.inventory))))
    }

    fn insert(&self, record: InventoryRecord) -> LibraryResult<()> {
        self.write(|s| add(&mut s.inventory, "Inventory", record.id, record))
    }

    fn update(&self, record: InventoryRecord) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.inventory, "Inventory", record.id, record))
    }

    fn get(&self, id: InventoryId) -> LibraryResult<InventoryRecord> {
        self.read(|s| fetch(&s.inventory, "Inventory", id))?
    }

    fn list(&self) -> LibraryResult<Vec<InventoryRecord>> {
        self.read(|s| s.inventory.values().cloned().collect())
    }

    fn remove(&self, id: InventoryId) -> LibraryResult<()> {
        self.write(|s| discard(&mut s.inventory, "Inventory", id))
    }

    fn find_by_book(&self, book: BookId) -> LibraryResult<Option<InventoryRecord>> {
        self.read(|s| {
            s.inventory
                .values()
                .find(|r| r.book_id == book)
                .cloned()
        })
    }
}

impl ImportLogRepository for InMemoryStore {
    fn next_id(&self) -> LibraryResult<ImportLogId> {
        self.write(|s| Ok(ImportLogId::new(next(&mut s.sequences.import_log))))
    }

    fn insert(&self, log: ImportLog) -> LibraryResult<()> {
        self.write(|s| add(&mut s.import_logs, "Import log", log.id, log))
    }

    fn update(&self, log: ImportLog) -> LibraryResult<()> {
        self.write(|s| replace(&mut s.import_logs, "Import log", log.id, log))
    }

    fn get(&self, id: ImportLogId) -> LibraryResult<ImportLog> {
        self.read(|s| fetch(&s.import_logs, "Import log", id))?
    }

    fn list(&self) -> LibraryResult<Vec<ImportLog>> {
        self.read(|s| s.import_logs.values().rev().cloned().collect())
    }
}
