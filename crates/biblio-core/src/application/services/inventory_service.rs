//! Inventory Service - stock records and their derived figures.

use tracing::{info, instrument};

use crate::{
    application::{ApplicationError, services::Repositories},
    domain::{
        Book, BookId, DomainError, DomainValidator as validator, InventoryRecord,
        InventorySnapshot, StockTier,
    },
    error::LibraryResult,
};

/// A stock record with its book and the figures computed as of now.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryView {
    pub record: InventoryRecord,
    pub book_title: String,
    pub snapshot: InventorySnapshot,
}

#[derive(Clone)]
pub struct InventoryService {
    repos: Repositories,
}

impl InventoryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Open the stock record of a book. Each book has at most one.
    #[instrument(skip(self), fields(book = %book_id))]
    pub fn init(&self, book_id: BookId, initial_stock: i64) -> LibraryResult<InventoryView> {
        let book = self.repos.books.get(book_id)?;
        if self.repos.inventory.find_by_book(book_id)?.is_some() {
            return Err(DomainError::InventoryExists { book: book.title }.into());
        }
        let record = InventoryRecord::new(
            self.repos.inventory.next_id()?,
            book_id,
            initial_stock,
            self.repos.clock.now(),
        )?;
        self.repos.inventory.insert(record.clone())?;
        info!(initial_stock, "Inventory opened");
        self.view(record, &book)
    }

    pub fn for_book(&self, book_id: BookId) -> LibraryResult<InventoryView> {
        let book = self.repos.books.get(book_id)?;
        let record = self.record_for(&book)?;
        self.view(record, &book)
    }

    /// Every stock record, optionally only those in one tier, by book title.
    pub fn list(&self, tier: Option<StockTier>) -> LibraryResult<Vec<InventoryView>> {
        let mut views = Vec::new();
        for record in self.repos.inventory.list()? {
            let book = self.repos.books.get(record.book_id)?;
            let view = self.view(record, &book)?;
            if tier.is_none_or(|t| t == view.snapshot.tier) {
                views.push(view);
            }
        }
        views.sort_by_key(|v| v.book_title.to_lowercase());
        Ok(views)
    }

    #[instrument(skip(self), fields(book = %book_id))]
    pub fn add_stock(&self, book_id: BookId, quantity: i64) -> LibraryResult<InventoryView> {
        let book = self.repos.books.get(book_id)?;
        let mut record = self.record_for(&book)?;
        record.add_stock(quantity, self.repos.clock.now())?;
        self.repos.inventory.update(record.clone())?;
        info!(quantity, total = record.total(), "Stock added");
        self.view(record, &book)
    }

    /// Remove one copy. At least one copy must be on the shelf.
    #[instrument(skip(self), fields(book = %book_id))]
    pub fn write_off(&self, book_id: BookId) -> LibraryResult<InventoryView> {
        let book = self.repos.books.get(book_id)?;
        let mut record = self.record_for(&book)?;
        let open = self.open_loans(book_id)?;
        record.write_off(open, &book.title, self.repos.clock.now())?;
        self.repos.inventory.update(record.clone())?;
        info!(total = record.total(), "Copy written off");
        self.view(record, &book)
    }

    /// Overwrite all three counters.
    pub fn adjust(
        &self,
        book_id: BookId,
        initial_stock: i64,
        inflows: i64,
        outflows: i64,
    ) -> LibraryResult<InventoryView> {
        let book = self.repos.books.get(book_id)?;
        let mut record = self.record_for(&book)?;
        record.adjust(initial_stock, inflows, outflows, self.repos.clock.now())?;
        validator::validate_inventory(&record)?;
        self.repos.inventory.update(record.clone())?;
        self.view(record, &book)
    }

    fn record_for(&self, book: &Book) -> LibraryResult<InventoryRecord> {
        self.repos
            .inventory
            .find_by_book(book.id)?
            .ok_or_else(|| ApplicationError::not_found("Inventory for book", book.id).into())
    }

    fn open_loans(&self, book_id: BookId) -> LibraryResult<usize> {
        Ok(self
            .repos
            .loans
            .for_book(book_id)?
            .iter()
            .filter(|l| l.is_open())
            .count())
    }

    fn view(&self, record: InventoryRecord, book: &Book) -> LibraryResult<InventoryView> {
        let snapshot = record.snapshot(self.open_loans(book.id)?, book.price);
        Ok(InventoryView {
            record,
            book_title: book.title.clone(),
            snapshot,
        })
    }
}
