//! JSON shapes of the book endpoints.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use biblio_core::{
    application::Library,
    domain::{Book, BookDraft, BookPatch, BookStatus, DomainError},
    error::LibraryResult,
};

/// A book as the API shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookJson {
    pub id: u64,
    pub name: String,
    pub isbn: Option<String>,
    pub author: Option<String>,
    pub publisher: Option<String>,
    pub publication_date: Option<NaiveDate>,
    pub pages: i32,
    pub price: f64,
    pub available: bool,
    pub status: &'static str,
    pub categories: Vec<String>,
}

impl BookJson {
    pub fn load(library: &Library, book: Book) -> LibraryResult<Self> {
        let categories = library.catalog.category_names(&book)?;
        Ok(Self {
            id: book.id.get(),
            available: book.available(),
            status: book.status.as_str(),
            name: book.title,
            isbn: book.isbn.map(String::from),
            author: book.author,
            publisher: book.publisher,
            publication_date: book.published_on,
            pages: book.pages,
            price: book.price,
            categories,
        })
    }

    pub fn load_all(library: &Library, books: Vec<Book>) -> LibraryResult<Vec<Self>> {
        books.into_iter().map(|b| Self::load(library, b)).collect()
    }
}

/// Writable book fields. Anything else in the body is ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BookFields {
    pub name: Option<String>,
    pub isbn: Option<String>,
    #[serde(alias = "autor")]
    pub author: Option<String>,
    #[serde(alias = "editorial")]
    pub publisher: Option<String>,
    #[serde(alias = "fecha_publicacion")]
    pub publication_date: Option<NaiveDate>,
    #[serde(alias = "paginas")]
    pub pages: Option<i32>,
    #[serde(alias = "precio")]
    pub price: Option<f64>,
    #[serde(alias = "descripcion")]
    pub description: Option<String>,
    #[serde(alias = "estado")]
    pub status: Option<String>,
}

impl BookFields {
    /// True when `name` is absent or blank.
    pub fn lacks_name(&self) -> bool {
        self.name.as_deref().is_none_or(|n| n.trim().is_empty())
    }

    fn parsed_status(&self) -> Result<Option<BookStatus>, DomainError> {
        self.status.as_deref().map(str::parse).transpose()
    }

    pub fn into_draft(self) -> Result<BookDraft, DomainError> {
        let status = self.parsed_status()?;
        Ok(BookDraft {
            isbn: self.isbn,
            author: self.author,
            publisher: self.publisher,
            published_on: self.publication_date,
            pages: self.pages.unwrap_or_default(),
            price: self.price.unwrap_or_default(),
            description: self.description,
            status,
            ..BookDraft::new(self.name.unwrap_or_default())
        })
    }

    pub fn into_patch(self) -> Result<BookPatch, DomainError> {
        let status = self.parsed_status()?;
        Ok(BookPatch {
            title: self.name,
            isbn: self.isbn,
            author: self.author,
            publisher: self.publisher,
            published_on: self.publication_date,
            pages: self.pages,
            price: self.price,
            description: self.description,
            status,
            ..BookPatch::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spanish_field_names_are_accepted() {
        let fields: BookFields = serde_json::from_value(serde_json::json!({
            "name": "Rayuela",
            "autor": "Julio Cortázar",
            "paginas": 736,
            "estado": "disponible",
            "owner": "ignored"
        }))
        .unwrap();

        let draft = fields.into_draft().unwrap();
        assert_eq!(draft.author.as_deref(), Some("Julio Cortázar"));
        assert_eq!(draft.pages, 736);
        assert_eq!(draft.status, Some(BookStatus::Available));
    }

    #[test]
    fn unknown_status_is_rejected() {
        let fields = BookFields {
            status: Some("lost".into()),
            ..BookFields::default()
        };
        assert!(fields.into_patch().is_err());
    }

    #[test]
    fn blank_name_counts_as_missing() {
        let fields = BookFields {
            name: Some("  ".into()),
            ..BookFields::default()
        };
        assert!(fields.lacks_name());
    }
}
