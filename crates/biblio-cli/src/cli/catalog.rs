//! `book`, `author` and `category` arguments.

use chrono::NaiveDate;
use clap::{Args, Subcommand};

use biblio_core::domain::{BookId, BookStatus, CategoryId, ContactId, LiteraryGenre};

// ── book ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum BookCommands {
    /// Add a book to the catalogue.
    #[command(visible_alias = "new")]
    Add(BookAddArgs),

    /// List books ordered by title.
    #[command(visible_alias = "ls")]
    List(BookListArgs),

    /// Show one book with its categories and stock.
    Show {
        #[arg(value_name = "BOOK_ID")]
        id: BookId,
    },

    /// Change fields of a book.
    Update(BookUpdateArgs),

    /// Delete a book. Refused while it is on loan.
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "BOOK_ID")]
        id: BookId,
        /// Skip the confirmation prompt.
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Set the status (available, reserved, maintenance, loaned).
    Status {
        #[arg(value_name = "BOOK_ID")]
        id: BookId,
        status: BookStatus,
    },

    /// Check an ISBN and show its normalized form.
    IsbnCheck { isbn: String },
}

#[derive(Debug, Args)]
pub struct BookAddArgs {
    /// Title of the book.
    pub title: String,

    #[arg(long)]
    pub isbn: Option<String>,

    /// Author name as free text.
    #[arg(short = 'a', long)]
    pub author: Option<String>,

    /// Link a registered author.
    #[arg(long, value_name = "CONTACT_ID")]
    pub author_id: Option<ContactId>,

    #[arg(long)]
    pub publisher: Option<String>,

    /// Publication date (YYYY-MM-DD).
    #[arg(long, value_name = "DATE")]
    pub published: Option<NaiveDate>,

    #[arg(long)]
    pub pages: Option<i32>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub status: Option<BookStatus>,

    /// Category ids; repeat or separate with commas.
    #[arg(long = "category", value_name = "CATEGORY_ID", value_delimiter = ',')]
    pub categories: Vec<CategoryId>,
}

#[derive(Debug, Args)]
pub struct BookListArgs {
    /// Match title, author or ISBN.
    #[arg(short = 's', long)]
    pub search: Option<String>,

    #[arg(long)]
    pub status: Option<BookStatus>,

    /// Only books that can be lent right now.
    #[arg(long)]
    pub available: bool,

    #[arg(long)]
    pub limit: Option<usize>,

    #[arg(long, default_value_t = 0)]
    pub offset: usize,
}

#[derive(Debug, Args)]
pub struct BookUpdateArgs {
    #[arg(value_name = "BOOK_ID")]
    pub id: BookId,

    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub isbn: Option<String>,

    #[arg(short = 'a', long)]
    pub author: Option<String>,

    #[arg(long, value_name = "CONTACT_ID")]
    pub author_id: Option<ContactId>,

    #[arg(long)]
    pub publisher: Option<String>,

    #[arg(long, value_name = "DATE")]
    pub published: Option<NaiveDate>,

    #[arg(long)]
    pub pages: Option<i32>,

    #[arg(long)]
    pub price: Option<f64>,

    #[arg(long)]
    pub description: Option<String>,
}

// ── author ────────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum AuthorCommands {
    /// Register an author.
    Add {
        name: String,
        #[arg(long)]
        nationality: Option<String>,
        #[arg(long, value_name = "DATE")]
        born: Option<NaiveDate>,
        #[arg(long, value_name = "DATE")]
        died: Option<NaiveDate>,
        /// novel, poetry, essay, short_story, theatre or other.
        #[arg(long)]
        genre: Option<LiteraryGenre>,
        #[arg(long)]
        biography: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },

    /// List authors with their number of books.
    #[command(visible_alias = "ls")]
    List,
}

// ── category ──────────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum CategoryCommands {
    /// Create a category.
    Add {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Palette index 0-11. Picked automatically when omitted.
        #[arg(long)]
        color: Option<u8>,
    },

    /// List categories with their number of books.
    #[command(visible_alias = "ls")]
    List,

    /// Rename a category.
    Rename {
        #[arg(value_name = "CATEGORY_ID")]
        id: CategoryId,
        name: String,
    },

    /// Add categories to a book.
    Assign {
        #[arg(value_name = "BOOK_ID")]
        book: BookId,
        #[arg(value_name = "CATEGORY_ID", value_delimiter = ',', required = true)]
        categories: Vec<CategoryId>,
    },

    /// Delete a category and detach it from every book.
    #[command(visible_alias = "rm")]
    Delete {
        #[arg(value_name = "CATEGORY_ID")]
        id: CategoryId,
    },
}
