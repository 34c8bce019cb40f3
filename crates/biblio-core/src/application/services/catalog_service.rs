//! Catalog Service - books, categories and authors.

use std::collections::BTreeSet;

use tracing::{debug, info, instrument};

use crate::{
    application::{ApplicationError, services::Repositories},
    domain::{
        AuthorProfile, Book, BookDraft, BookId, BookPatch, BookStatus, CATEGORY_COLORS, Category,
        CategoryId, Contact, ContactDraft, ContactId, DomainError, DomainValidator as validator,
        Isbn,
    },
    error::LibraryResult,
};

/// Filters for listing books. Results are ordered by title.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BookQuery {
    /// Case-insensitive match on title, author or ISBN.
    pub search: Option<String>,
    pub status: Option<BookStatus>,
    pub available: Option<bool>,
    pub limit: Option<usize>,
    pub offset: usize,
}

impl BookQuery {
    fn matches(&self, book: &Book) -> bool {
        if self.status.is_some_and(|s| s != book.status) {
            return false;
        }
        if self.available.is_some_and(|a| a != book.available()) {
            return false;
        }
        match self.search.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(term) => {
                let term = term.to_lowercase();
                book.title.to_lowercase().contains(&term)
                    || book
                        .author
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&term))
                    || book.isbn.as_ref().is_some_and(|i| {
                        i.as_str()
                            .contains(&term.replace(['-', ' '], "").to_uppercase())
                    })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CategorySummary {
    pub category: Category,
    pub book_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorSummary {
    pub contact: Contact,
    pub book_count: usize,
}

/// Book catalogue use cases.
#[derive(Clone)]
pub struct CatalogService {
    repos: Repositories,
}

impl CatalogService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    // ========================================================================
    // Books
    // ========================================================================

    #[instrument(skip_all, fields(title = %draft.title))]
    pub fn create_book(&self, draft: BookDraft) -> LibraryResult<Book> {
        if let Some(author) = draft.author_id {
            self.ensure_author(author)?;
        }
        self.ensure_categories(&draft.categories)?;

        let id = self.repos.books.next_id()?;
        let book = Book::new(id, draft, self.repos.clock.now())?;
        self.ensure_unique_isbn(book.isbn.as_ref(), None)?;
        validator::validate_book(&book)?;

        self.repos.books.insert(book.clone())?;
        info!(book = %book.id, "Book created");
        Ok(book)
    }

    pub fn get_book(&self, id: BookId) -> LibraryResult<Book> {
        debug!(book = %id, "Loading book");
        self.repos.books.get(id)
    }

    pub fn list_books(&self, query: &BookQuery) -> LibraryResult<Vec<Book>> {
        let mut books: Vec<Book> = self
            .repos
            .books
            .list()?
            .into_iter()
            .filter(|b| query.matches(b))
            .collect();
        books.sort_by(|a, b| {
            a.title
                .to_lowercase()
                .cmp(&b.title.to_lowercase())
                .then(a.id.cmp(&b.id))
        });
        let page = books.into_iter().skip(query.offset);
        Ok(match query.limit {
            Some(limit) => page.take(limit).collect(),
            None => page.collect(),
        })
    }

    pub fn find_by_isbn(&self, raw: &str) -> LibraryResult<Option<Book>> {
        let isbn = Isbn::parse(raw)?;
        self.repos.books.find_by_isbn(&isbn)
    }

    /// Apply a partial update. A status change goes through the same rule
    /// as [`set_status`](Self::set_status).
    #[instrument(skip(self, patch), fields(book = %id))]
    pub fn update_book(&self, id: BookId, patch: BookPatch) -> LibraryResult<Book> {
        let mut book = self.repos.books.get(id)?;
        if patch.is_empty() {
            return Ok(book);
        }
        if let Some(author) = patch.author_id {
            self.ensure_author(author)?;
        }
        if let Some(status) = patch.status {
            self.ensure_status_change_allowed(&book, status)?;
        }

        book.apply(patch, self.repos.clock.now())?;
        self.ensure_unique_isbn(book.isbn.as_ref(), Some(id))?;
        self.repos.books.update(book.clone())?;
        info!("Book updated");
        Ok(book)
    }

    /// Manually mark a book. Refused while an open loan holds the book,
    /// unless the new status is `loaned`.
    #[instrument(skip(self), fields(book = %id))]
    pub fn set_status(&self, id: BookId, status: BookStatus) -> LibraryResult<Book> {
        let mut book = self.repos.books.get(id)?;
        self.ensure_status_change_allowed(&book, status)?;
        book.set_status(status, self.repos.clock.now());
        self.repos.books.update(book.clone())?;
        info!(status = %status, "Book status changed");
        Ok(book)
    }

    /// Delete a book with its stock record and its closed loan history.
    #[instrument(skip(self), fields(book = %id))]
    pub fn delete_book(&self, id: BookId) -> LibraryResult<Book> {
        let book = self.repos.books.get(id)?;
        book.ensure_deletable()?;
        if self.repos.loans.open_for_book(id)?.is_some() {
            return Err(DomainError::BookOnLoan {
                book: book.title.clone(),
            }
            .into());
        }

        for loan in self.repos.loans.for_book(id)? {
            self.repos.loans.remove(loan.id)?;
        }
        if let Some(record) = self.repos.inventory.find_by_book(id)? {
            self.repos.inventory.remove(record.id)?;
        }
        self.repos.books.remove(id)?;
        info!("Book deleted");
        Ok(book)
    }

    /// Add categories to a book. Already assigned ones are ignored.
    pub fn assign_categories(&self, id: BookId, categories: &[CategoryId]) -> LibraryResult<Book> {
        let wanted: BTreeSet<CategoryId> = categories.iter().copied().collect();
        self.ensure_categories(&wanted)?;

        let mut book = self.repos.books.get(id)?;
        book.categories.extend(wanted);
        book.updated_at = self.repos.clock.now();
        self.repos.books.update(book.clone())?;
        Ok(book)
    }

    /// Category names of a book, in id order.
    pub fn category_names(&self, book: &Book) -> LibraryResult<Vec<String>> {
        book.categories
            .iter()
            .map(|id| self.repos.categories.get(*id).map(|c| c.name))
            .collect()
    }

    fn ensure_unique_isbn(&self, isbn: Option<&Isbn>, current: Option<BookId>) -> LibraryResult<()> {
        let Some(isbn) = isbn else {
            return Ok(());
        };
        match self.repos.books.find_by_isbn(isbn)? {
            Some(existing) if Some(existing.id) != current => Err(DomainError::DuplicateIsbn {
                isbn: isbn.to_string(),
            }
            .into()),
            _ => Ok(()),
        }
    }

    fn ensure_status_change_allowed(&self, book: &Book, status: BookStatus) -> LibraryResult<()> {
        if status == book.status || status == BookStatus::Loaned {
            return Ok(());
        }
        if self.repos.loans.open_for_book(book.id)?.is_some() {
            return Err(DomainError::BookOnLoan {
                book: book.title.clone(),
            }
            .into());
        }
        Ok(())
    }

    fn ensure_categories(&self, ids: &BTreeSet<CategoryId>) -> LibraryResult<()> {
        for id in ids {
            self.repos.categories.get(*id)?;
        }
        Ok(())
    }

    fn ensure_author(&self, id: ContactId) -> LibraryResult<Contact> {
        let contact = self.repos.contacts.get(id)?;
        if !contact.is_author() {
            return Err(ApplicationError::ValidationFailed(format!(
                "contact {} is not an author",
                contact.name
            ))
            .into());
        }
        Ok(contact)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    /// Create a category. Without a color the next one in the palette is used.
    #[instrument(skip(self, description))]
    pub fn create_category(
        &self,
        name: &str,
        description: Option<String>,
        color: Option<u8>,
    ) -> LibraryResult<Category> {
        if self.repos.categories.find_by_name(name)?.is_some() {
            return Err(DomainError::DuplicateCategory {
                name: name.trim().to_string(),
            }
            .into());
        }
        let id = self.repos.categories.next_id()?;
        let color = color.unwrap_or_else(|| (id.get() % u64::from(CATEGORY_COLORS)) as u8);
        let category = Category::new(id, name, description, color, self.repos.clock.now())?;
        self.repos.categories.insert(category.clone())?;
        info!(category = %category.id, "Category created");
        Ok(category)
    }

    pub fn list_categories(&self) -> LibraryResult<Vec<CategorySummary>> {
        let books = self.repos.books.list()?;
        let mut categories: Vec<CategorySummary> = self
            .repos
            .categories
            .list()?
            .into_iter()
            .map(|category| CategorySummary {
                book_count: books
                    .iter()
                    .filter(|b| b.categories.contains(&category.id))
                    .count(),
                category,
            })
            .collect();
        categories.sort_by_key(|c| c.category.name.to_lowercase());
        Ok(categories)
    }

    pub fn rename_category(&self, id: CategoryId, name: &str) -> LibraryResult<Category> {
        if let Some(existing) = self.repos.categories.find_by_name(name)? {
            if existing.id != id {
                return Err(DomainError::DuplicateCategory {
                    name: name.trim().to_string(),
                }
                .into());
            }
        }
        let mut category = self.repos.categories.get(id)?;
        category.rename(name, self.repos.clock.now())?;
        self.repos.categories.update(category.clone())?;
        Ok(category)
    }

    /// Delete a category and detach it from every book.
    #[instrument(skip(self), fields(category = %id))]
    pub fn delete_category(&self, id: CategoryId) -> LibraryResult<usize> {
        self.repos.categories.get(id)?;
        let now = self.repos.clock.now();
        let mut detached = 0;
        for mut book in self.repos.books.list()? {
            if book.categories.remove(&id) {
                book.updated_at = now;
                self.repos.books.update(book)?;
                detached += 1;
            }
        }
        self.repos.categories.remove(id)?;
        info!(detached, "Category deleted");
        Ok(detached)
    }

    // ========================================================================
    // Authors
    // ========================================================================

    /// Register an author. The draft always gets an author profile.
    pub fn add_author(&self, mut draft: ContactDraft) -> LibraryResult<Contact> {
        if draft.author.is_none() {
            draft.author = Some(AuthorProfile::default());
        }
        let id = self.repos.contacts.next_id()?;
        let contact = Contact::new(id, draft, self.repos.clock.now())?;
        self.repos.contacts.insert(contact.clone())?;
        info!(author = %contact.id, "Author registered");
        Ok(contact)
    }

    pub fn list_authors(&self) -> LibraryResult<Vec<AuthorSummary>> {
        let books = self.repos.books.list()?;
        let mut authors: Vec<AuthorSummary> = self
            .repos
            .contacts
            .list()?
            .into_iter()
            .filter(Contact::is_author)
            .map(|contact| AuthorSummary {
                book_count: books
                    .iter()
                    .filter(|b| b.author_id == Some(contact.id))
                    .count(),
                contact,
            })
            .collect();
        authors.sort_by_key(|a| a.contact.name.to_lowercase());
        Ok(authors)
    }
}
