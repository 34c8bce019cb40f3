//! The `Book` aggregate: a catalogue entry with circulation status.
//!
//! Availability is never stored. [`Book::available`] is derived from the
//! status, so the flag and the status cannot drift apart.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{
    error::DomainError,
    value_objects::{BookStatus, Isbn},
};

use super::common::{BookId, CategoryId, ContactId, clean_text, required_text};

/// A catalogue entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub title: String,
    pub isbn: Option<Isbn>,
    pub author: Option<String>,
    pub author_id: Option<ContactId>,
    pub publisher: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub pages: i32,
    pub price: f64,
    pub description: Option<String>,
    pub status: BookStatus,
    #[serde(default)]
    pub categories: BTreeSet<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a book.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookDraft {
    pub title: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<ContactId>,
    pub publisher: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub pages: i32,
    pub price: f64,
    pub description: Option<String>,
    pub status: Option<BookStatus>,
    pub categories: BTreeSet<CategoryId>,
}

impl BookDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn isbn(mut self, isbn: impl Into<String>) -> Self {
        self.isbn = Some(isbn.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn publisher(mut self, publisher: impl Into<String>) -> Self {
        self.publisher = Some(publisher.into());
        self
    }

    pub fn pages(mut self, pages: i32) -> Self {
        self.pages = pages;
        self
    }

    pub fn price(mut self, price: f64) -> Self {
        self.price = price;
        self
    }
}

/// Partial update for a book. `None` leaves the field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookPatch {
    pub title: Option<String>,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub author_id: Option<ContactId>,
    pub publisher: Option<String>,
    pub published_on: Option<NaiveDate>,
    pub pages: Option<i32>,
    pub price: Option<f64>,
    pub description: Option<String>,
    pub status: Option<BookStatus>,
}

impl BookPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Book {
    /// Build a validated book from a draft.
    pub fn new(id: BookId, draft: BookDraft, now: DateTime<Utc>) -> Result<Self, DomainError> {
        let isbn = parse_optional_isbn(draft.isbn.as_deref())?;
        let book = Self {
            id,
            title: required_text(&draft.title, "title")?,
            isbn,
            author: clean_text(draft.author),
            author_id: draft.author_id,
            publisher: clean_text(draft.publisher),
            published_on: draft.published_on,
            pages: draft.pages,
            price: draft.price,
            description: clean_text(draft.description),
            status: draft.status.unwrap_or_default(),
            categories: draft.categories,
            created_at: now,
            updated_at: now,
        };
        book.validate()?;
        Ok(book)
    }

    /// Whether the book can be lent right now.
    pub const fn available(&self) -> bool {
        self.status.is_available()
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.title.trim().is_empty() {
            return Err(DomainError::MissingRequiredField { field: "title" });
        }
        if self.pages < 0 {
            return Err(DomainError::NegativeValue {
                field: "pages",
                value: self.pages.to_string(),
            });
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(DomainError::NegativeValue {
                field: "price",
                value: self.price.to_string(),
            });
        }
        Ok(())
    }

    /// Apply a patch atomically: either every field changes or none does.
    pub fn apply(&mut self, patch: BookPatch, now: DateTime<Utc>) -> Result<(), DomainError> {
        let mut next = self.clone();
        if let Some(title) = patch.title {
            next.title = required_text(&title, "title")?;
        }
        if let Some(isbn) = patch.isbn {
            next.isbn = parse_optional_isbn(Some(&isbn))?;
        }
        if patch.author.is_some() {
            next.author = clean_text(patch.author);
        }
        if patch.author_id.is_some() {
            next.author_id = patch.author_id;
        }
        if patch.publisher.is_some() {
            next.publisher = clean_text(patch.publisher);
        }
        if patch.published_on.is_some() {
            next.published_on = patch.published_on;
        }
        if let Some(pages) = patch.pages {
            next.pages = pages;
        }
        if let Some(price) = patch.price {
            next.price = price;
        }
        if patch.description.is_some() {
            next.description = clean_text(patch.description);
        }
        if let Some(status) = patch.status {
            next.status = status;
        }
        next.validate()?;
        next.updated_at = now;
        *self = next;
        Ok(())
    }

    pub fn set_status(&mut self, status: BookStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// A loaned book cannot be removed from the catalogue.
    pub fn ensure_deletable(&self) -> Result<(), DomainError> {
        if self.status == BookStatus::Loaned {
            return Err(DomainError::BookOnLoan {
                book: self.title.clone(),
            });
        }
        Ok(())
    }

    /// Title plus ISBN, used as the relation label in exports and reports.
    pub fn label(&self) -> String {
        match &self.isbn {
            Some(isbn) => format!("{} [{}]", self.title, isbn),
            None => self.title.clone(),
        }
    }
}

fn parse_optional_isbn(raw: Option<&str>) -> Result<Option<Isbn>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => Isbn::parse(value).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn book() -> Book {
        Book::new(
            BookId::new(1),
            BookDraft::new("Cien años de soledad")
                .isbn("978-84-376-0494-7")
                .pages(471)
                .price(19.9),
            now(),
        )
        .unwrap()
    }

    #[test]
    fn new_book_is_available() {
        let book = book();
        assert_eq!(book.status, BookStatus::Available);
        assert!(book.available());
        assert_eq!(book.isbn.as_ref().unwrap().as_str(), "9788437604947");
    }

    #[test]
    fn availability_follows_status() {
        let mut book = book();
        for status in BookStatus::ALL {
            book.set_status(status, now());
            assert_eq!(book.available(), status == BookStatus::Available);
        }
    }

    #[test]
    fn negative_pages_rejected() {
        let err = Book::new(BookId::new(1), BookDraft::new("X").pages(-1), now()).unwrap_err();
        assert!(matches!(err, DomainError::NegativeValue { field: "pages", .. }));
    }

    #[test]
    fn negative_price_rejected() {
        let err = Book::new(BookId::new(1), BookDraft::new("X").price(-0.5), now()).unwrap_err();
        assert!(matches!(err, DomainError::NegativeValue { field: "price", .. }));
    }

    #[test]
    fn blank_title_rejected() {
        let err = Book::new(BookId::new(1), BookDraft::new("   "), now()).unwrap_err();
        assert_eq!(err, DomainError::MissingRequiredField { field: "title" });
    }

    #[test]
    fn blank_isbn_means_none() {
        let book = Book::new(BookId::new(1), BookDraft::new("X").isbn("  "), now()).unwrap();
        assert!(book.isbn.is_none());
    }

    #[test]
    fn failed_patch_leaves_book_untouched() {
        let mut book = book();
        let before = book.clone();
        let patch = BookPatch {
            title: Some("Otro".into()),
            pages: Some(-3),
            ..BookPatch::default()
        };
        assert!(book.apply(patch, now()).is_err());
        assert_eq!(book, before);
    }

    #[test]
    fn loaned_book_cannot_be_deleted() {
        let mut book = book();
        book.set_status(BookStatus::Loaned, now());
        assert!(matches!(
            book.ensure_deletable(),
            Err(DomainError::BookOnLoan { .. })
        ));
        book.set_status(BookStatus::Maintenance, now());
        assert!(book.ensure_deletable().is_ok());
    }
}
