//! `biblio book`: the catalogue.

use tracing::{info, instrument};

use biblio_core::{
    application::BookQuery,
    domain::{Book, BookDraft, BookPatch, Isbn},
};
use biblio_server::dto::BookJson;

use super::{optional, or_dash};
use crate::{
    cli::{BookAddArgs, BookCommands, BookListArgs, BookUpdateArgs},
    error::{CliError, CliResult},
    output::{OutputManager, confirm},
    session::Session,
};

#[instrument(skip_all)]
pub fn execute(cmd: BookCommands, session: &Session, output: &OutputManager) -> CliResult<()> {
    match cmd {
        BookCommands::Add(args) => add(args, session, output),
        BookCommands::List(args) => list(args, session, output),
        BookCommands::Show { id } => {
            let book = session.library.catalog.get_book(id)?;
            show(book, session, output)
        }
        BookCommands::Update(args) => update(args, session, output),
        BookCommands::Delete { id, yes } => {
            let library = &session.library;
            let book = library.catalog.get_book(id)?;
            if !yes && !confirm(&format!("Delete \"{}\"?", book.title))? {
                return Err(CliError::Cancelled);
            }
            let deleted = library.catalog.delete_book(id)?;
            info!(book = %deleted.id, "Book deleted");
            output.success(&format!("Deleted book {} \"{}\"", deleted.id, deleted.title))?;
            Ok(())
        }
        BookCommands::Status { id, status } => {
            let book = session.library.catalog.set_status(id, status)?;
            if output.is_json() {
                return output.json(&BookJson::load(&session.library, book)?);
            }
            output.success(&format!("\"{}\" is now {}", book.title, book.status))?;
            Ok(())
        }
        BookCommands::IsbnCheck { isbn } => {
            let parsed = Isbn::parse(&isbn).map_err(biblio_core::error::LibraryError::from)?;
            if output.is_json() {
                return output.json(&serde_json::json!({
                    "input": isbn,
                    "isbn": parsed.as_str(),
                    "digits": parsed.as_str().len(),
                }));
            }
            output.success(&format!("Valid ISBN-{}", parsed.as_str().len()))?;
            output.print(parsed.as_str())?;
            Ok(())
        }
    }
}

fn add(args: BookAddArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let draft = BookDraft {
        title: args.title,
        isbn: args.isbn,
        author: args.author,
        author_id: args.author_id,
        publisher: args.publisher,
        published_on: args.published,
        pages: args.pages.unwrap_or_default(),
        price: args.price.unwrap_or_default(),
        description: args.description,
        status: args.status,
        categories: args.categories.into_iter().collect(),
    };
    let book = session.library.catalog.create_book(draft)?;
    info!(book = %book.id, "Book created");

    if output.is_json() {
        return output.json(&BookJson::load(&session.library, book)?);
    }
    output.success(&format!("Added book {} \"{}\"", book.id, book.title))?;
    Ok(())
}

fn list(args: BookListArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let query = BookQuery {
        search: args.search,
        status: args.status,
        available: args.available.then_some(true),
        limit: args.limit,
        offset: args.offset,
    };
    let books = session.library.catalog.list_books(&query)?;

    if output.is_json() {
        return output.json(&BookJson::load_all(&session.library, books)?);
    }
    if books.is_empty() {
        output.info("No books found")?;
        return Ok(());
    }

    let rows: Vec<Vec<String>> = books
        .iter()
        .map(|b| {
            vec![
                b.id.to_string(),
                b.title.clone(),
                or_dash(b.author.as_deref()),
                or_dash(b.isbn.as_ref()),
                b.status.to_string(),
            ]
        })
        .collect();
    output.table(&["ID", "TITLE", "AUTHOR", "ISBN", "STATUS"], &rows)?;
    Ok(())
}

fn show(book: Book, session: &Session, output: &OutputManager) -> CliResult<()> {
    let library = &session.library;
    let stock = optional(library.inventory.for_book(book.id))?;

    if output.is_json() {
        return output.json(&BookJson::load(library, book)?);
    }

    let categories = library.catalog.category_names(&book)?;
    let mut fields = vec![
        ("ID", book.id.to_string()),
        ("Title", book.title.clone()),
        ("ISBN", or_dash(book.isbn.as_ref())),
        ("Author", or_dash(book.author.as_deref())),
        ("Publisher", or_dash(book.publisher.as_deref())),
        ("Published", or_dash(book.published_on)),
        ("Pages", book.pages.to_string()),
        ("Price", format!("{:.2}", book.price)),
        ("Status", book.status.to_string()),
        (
            "Categories",
            if categories.is_empty() {
                "-".into()
            } else {
                categories.join(", ")
            },
        ),
    ];
    if let Some(stock) = stock {
        fields.push((
            "Stock",
            format!(
                "{} available of {} ({})",
                stock.snapshot.available, stock.snapshot.total, stock.snapshot.tier
            ),
        ));
    }
    if let Some(description) = &book.description {
        fields.push(("Description", description.clone()));
    }
    output.fields(&fields)?;
    Ok(())
}

fn update(args: BookUpdateArgs, session: &Session, output: &OutputManager) -> CliResult<()> {
    let patch = BookPatch {
        title: args.title,
        isbn: args.isbn,
        author: args.author,
        author_id: args.author_id,
        publisher: args.publisher,
        published_on: args.published,
        pages: args.pages,
        price: args.price,
        description: args.description,
        status: None,
    };
    if patch.is_empty() {
        return Err(CliError::InvalidInput {
            message: "nothing to update; pass at least one field".into(),
            source: None,
        });
    }

    let book = session.library.catalog.update_book(args.id, patch)?;
    info!(book = %book.id, "Book updated");
    if output.is_json() {
        return output.json(&BookJson::load(&session.library, book)?);
    }
    output.success(&format!("Updated book {} \"{}\"", book.id, book.title))?;
    Ok(())
}
