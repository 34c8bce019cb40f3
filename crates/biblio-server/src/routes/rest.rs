//! REST v2 book resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

use biblio_core::{
    application::BookQuery,
    domain::{BookId, BookStatus},
    error::LibraryError,
};

use crate::{
    dto::{BookFields, BookJson},
    error::{ApiError, ApiResult},
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/v2/books", get(list_books).post(create_book))
        .route(
            "/api/v2/books/{id}",
            get(get_book).put(update_book).delete(delete_book),
        )
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    search: Option<String>,
    status: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_limit() -> usize {
    50
}

async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<ListQuery>,
) -> ApiResult<Json<Value>> {
    let status = params
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(str::parse::<BookStatus>)
        .transpose()
        .map_err(LibraryError::from)?;
    let query = BookQuery {
        search: params.search,
        status,
        limit: Some(params.limit),
        ..BookQuery::default()
    };
    let results = state
        .with_library(move |library| {
            let books = library.catalog.list_books(&query)?;
            BookJson::load_all(library, books)
        })
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": results.len(),
        "results": results,
    })))
}

async fn get_book(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let data = state
        .with_library(move |library| {
            let book = library.catalog.get_book(BookId::new(id))?;
            BookJson::load(library, book)
        })
        .await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

async fn create_book(
    State(state): State<AppState>,
    Json(fields): Json<BookFields>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    if fields.lacks_name() {
        return Err(ApiError::BadRequest("Field required: name".into()));
    }
    let draft = fields.into_draft().map_err(LibraryError::from)?;
    let data = state
        .with_library(move |library| {
            let book = library.catalog.create_book(draft)?;
            info!(book = %book.id, "Book created");
            BookJson::load(library, book)
        })
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "success": true, "data": data })),
    ))
}

async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(fields): Json<BookFields>,
) -> ApiResult<Json<Value>> {
    let patch = fields.into_patch().map_err(LibraryError::from)?;
    let data = state
        .with_library(move |library| {
            let book = library.catalog.update_book(BookId::new(id), patch)?;
            BookJson::load(library, book)
        })
        .await?;
    Ok(Json(json!({ "success": true, "data": data })))
}

async fn delete_book(State(state): State<AppState>, Path(id): Path<u64>) -> ApiResult<Json<Value>> {
    let book = state
        .with_library(move |library| library.catalog.delete_book(BookId::new(id)))
        .await?;
    Ok(Json(json!({
        "success": true,
        "message": format!("Book \"{}\" deleted", book.title),
    })))
}
