//! JSON-RPC style book endpoints.
//!
//! Every call is a `POST` whose body is `{"jsonrpc": "2.0", "params": {..}}`.
//! Business failures come back inside `result` as `{"error": ".."}`; only
//! transport problems (bad JSON, missing token) use HTTP status codes.

use std::cmp::Ordering;

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use biblio_core::{
    application::{BookQuery, Library},
    domain::{Book, BookId, BookStatus, DomainError},
    error::{ErrorCategory, LibraryError, LibraryResult},
};

use crate::{
    dto::{BookFields, BookJson},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/library/books", post(list_books))
        .route("/api/library/book/create", post(create_book))
        .route("/api/library/book/update/{id}", post(update_book))
        .route("/api/library/book/delete/{id}", post(delete_book))
        .route("/api/library/book/{id}", post(get_book))
}

#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "P: Deserialize<'de> + Default"))]
struct RpcRequest<P> {
    #[serde(default)]
    id: Value,
    #[serde(default)]
    params: P,
}

fn reply(id: Value, result: Value) -> Json<Value> {
    Json(json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": result,
    }))
}

fn failure(message: impl ToString) -> Value {
    json!({ "error": message.to_string() })
}

fn not_found(id: u64) -> Value {
    json!({ "error": "Book not found", "id": id })
}

/// `None` for unknown ids; other failures pass through.
fn lookup(library: &Library, id: u64) -> LibraryResult<Option<Book>> {
    match library.catalog.get_book(BookId::new(id)) {
        Ok(book) => Ok(Some(book)),
        Err(err) if err.category() == ErrorCategory::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

fn into_result(outcome: LibraryResult<Value>) -> Value {
    outcome.unwrap_or_else(|err: LibraryError| {
        warn!(error = %err, "RPC call failed");
        failure(err)
    })
}

// ── list ─────────────────────────────────────────────────────────────────────

/// `[field, operator, value]`, as in `["available", "=", true]`.
type DomainTerm = (String, String, Value);

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ListParams {
    domain: Vec<DomainTerm>,
    limit: usize,
    offset: usize,
    order: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            domain: Vec::new(),
            limit: 100,
            offset: 0,
            order: "name".into(),
        }
    }
}

type Filter = Box<dyn Fn(&Book) -> bool + Send>;

fn text_filter(op: &str, value: &Value, get: fn(&Book) -> Option<String>) -> Result<Filter, String> {
    let wanted = value
        .as_str()
        .ok_or_else(|| format!("expected a string, got {}", value))?
        .to_lowercase();
    match op {
        "=" => Ok(Box::new(move |b: &Book| {
            get(b).is_some_and(|v| v.to_lowercase() == wanted)
        })),
        "ilike" | "like" => Ok(Box::new(move |b: &Book| {
            get(b).is_some_and(|v| v.to_lowercase().contains(&wanted))
        })),
        other => Err(format!("unsupported operator '{}' for text", other)),
    }
}

fn number_filter(op: &str, value: &Value, get: fn(&Book) -> f64) -> Result<Filter, String> {
    let wanted = value
        .as_f64()
        .ok_or_else(|| format!("expected a number, got {}", value))?;
    let accepts: fn(Ordering) -> bool = match op {
        "=" => Ordering::is_eq,
        "!=" => Ordering::is_ne,
        ">" => Ordering::is_gt,
        ">=" => Ordering::is_ge,
        "<" => Ordering::is_lt,
        "<=" => Ordering::is_le,
        other => return Err(format!("unsupported operator '{}' for numbers", other)),
    };
    Ok(Box::new(move |b: &Book| {
        get(b).partial_cmp(&wanted).is_some_and(accepts)
    }))
}

fn term_filter((field, op, value): &DomainTerm) -> Result<Filter, String> {
    match field.as_str() {
        "name" | "title" => text_filter(op, value, |b| Some(b.title.clone())),
        "author" | "autor" => text_filter(op, value, |b| b.author.clone()),
        "publisher" | "editorial" => text_filter(op, value, |b| b.publisher.clone()),
        "isbn" => text_filter(op, value, |b| b.isbn.as_ref().map(|i| i.to_string())),
        "pages" | "paginas" => number_filter(op, value, |b| f64::from(b.pages)),
        "price" | "precio" => number_filter(op, value, |b| b.price),
        "available" | "disponible" => {
            let wanted = value
                .as_bool()
                .ok_or_else(|| format!("expected true or false, got {}", value))?;
            match op.as_str() {
                "=" => Ok(Box::new(move |b: &Book| b.available() == wanted)),
                "!=" => Ok(Box::new(move |b: &Book| b.available() != wanted)),
                other => Err(format!("unsupported operator '{}' for available", other)),
            }
        }
        "status" | "estado" => {
            let wanted: BookStatus = value
                .as_str()
                .unwrap_or_default()
                .parse()
                .map_err(|e: DomainError| e.to_string())?;
            match op.as_str() {
                "=" => Ok(Box::new(move |b: &Book| b.status == wanted)),
                "!=" => Ok(Box::new(move |b: &Book| b.status != wanted)),
                other => Err(format!("unsupported operator '{}' for status", other)),
            }
        }
        other => Err(format!("unknown field '{}'", other)),
    }
}

/// Parse `"field"` or `"field desc"` into a comparator.
fn ordering(order: &str) -> Result<Box<dyn Fn(&Book, &Book) -> Ordering>, String> {
    let mut parts = order.split_whitespace();
    let field = parts.next().unwrap_or("name").to_string();
    let descending = match parts.next().map(str::to_ascii_lowercase).as_deref() {
        None | Some("asc") => false,
        Some("desc") => true,
        Some(other) => return Err(format!("unknown sort direction '{}'", other)),
    };
    let compare: fn(&Book, &Book) -> Ordering = match field.as_str() {
        "name" | "title" => |a, b| a.title.to_lowercase().cmp(&b.title.to_lowercase()),
        "id" => |a, b| a.id.cmp(&b.id),
        "price" | "precio" => |a, b| a.price.total_cmp(&b.price),
        "pages" | "paginas" => |a, b| a.pages.cmp(&b.pages),
        other => return Err(format!("cannot order by '{}'", other)),
    };
    Ok(Box::new(move |a: &Book, b: &Book| {
        let ord = compare(a, b).then(a.id.cmp(&b.id));
        if descending { ord.reverse() } else { ord }
    }))
}

fn search(library: &Library, params: ListParams) -> LibraryResult<Value> {
    let filters = match params.domain.iter().map(term_filter).collect::<Result<Vec<_>, _>>() {
        Ok(filters) => filters,
        Err(message) => return Ok(failure(message)),
    };
    let compare = match ordering(&params.order) {
        Ok(compare) => compare,
        Err(message) => return Ok(failure(message)),
    };

    let mut books: Vec<Book> = library
        .catalog
        .list_books(&BookQuery::default())?
        .into_iter()
        .filter(|b| filters.iter().all(|f| f(b)))
        .collect();
    books.sort_by(|a, b| compare(a, b));
    let page: Vec<Book> = books
        .into_iter()
        .skip(params.offset)
        .take(params.limit)
        .collect();

    let data = BookJson::load_all(library, page)?;
    Ok(json!({
        "success": true,
        "count": data.len(),
        "data": data,
    }))
}

async fn list_books(
    State(state): State<AppState>,
    Json(req): Json<RpcRequest<ListParams>>,
) -> Json<Value> {
    let params = req.params;
    let outcome = state
        .with_library(move |library| search(library, params))
        .await;
    reply(req.id, into_result(outcome))
}

// ── single book ──────────────────────────────────────────────────────────────

async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<RpcRequest<Value>>,
) -> Json<Value> {
    let outcome = state
        .with_library(move |library| match lookup(library, id)? {
            Some(book) => Ok(json!({
                "success": true,
                "data": BookJson::load(library, book)?,
            })),
            None => Ok(not_found(id)),
        })
        .await;
    reply(req.id, into_result(outcome))
}

async fn create_book(
    State(state): State<AppState>,
    Json(req): Json<RpcRequest<BookFields>>,
) -> Json<Value> {
    if req.params.lacks_name() {
        return reply(req.id, failure("Field required: name"));
    }
    let fields = req.params;
    let outcome = state
        .with_library(move |library| {
            let book = library.catalog.create_book(fields.into_draft()?)?;
            info!(book = %book.id, "Book created over RPC");
            Ok(json!({
                "success": true,
                "id": book.id.get(),
                "message": format!("Book \"{}\" created", book.title),
            }))
        })
        .await;
    reply(req.id, into_result(outcome))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<RpcRequest<BookFields>>,
) -> Json<Value> {
    let fields = req.params;
    let outcome = state
        .with_library(move |library| {
            if lookup(library, id)?.is_none() {
                return Ok(not_found(id));
            }
            let book = library
                .catalog
                .update_book(BookId::new(id), fields.into_patch()?)?;
            Ok(json!({
                "success": true,
                "id": book.id.get(),
                "message": "Book updated",
            }))
        })
        .await;
    reply(req.id, into_result(outcome))
}

async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(req): Json<RpcRequest<Value>>,
) -> Json<Value> {
    let outcome = state
        .with_library(move |library| {
            if lookup(library, id)?.is_none() {
                return Ok(not_found(id));
            }
            let book = library.catalog.delete_book(BookId::new(id))?;
            Ok(json!({
                "success": true,
                "message": format!("Book \"{}\" deleted", book.title),
            }))
        })
        .await;
    reply(req.id, into_result(outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_domain_field_is_reported() {
        let term: DomainTerm = ("owner".into(), "=".into(), json!("x"));
        let err = term_filter(&term).err().unwrap();
        assert_eq!(err, "unknown field 'owner'");
    }

    #[test]
    fn order_accepts_direction() {
        assert!(ordering("price desc").is_ok());
        assert!(ordering("name sideways").is_err());
        assert!(ordering("shelf").is_err());
    }
}
