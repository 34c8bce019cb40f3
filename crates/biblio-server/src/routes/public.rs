use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::Deserialize;
use serde_json::{Value, json};

use biblio_core::application::BookQuery;

use crate::{dto::BookJson, error::ApiResult, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/library/public/books", get(list_books))
}

#[derive(Debug, Deserialize)]
struct PublicQuery {
    #[serde(default = "default_limit")]
    limit: usize,
    #[serde(default)]
    offset: usize,
    /// Only `true` filters; any other value lists everything.
    #[serde(default, alias = "available")]
    disponible: Option<String>,
}

fn default_limit() -> usize {
    100
}

async fn list_books(
    State(state): State<AppState>,
    Query(params): Query<PublicQuery>,
) -> ApiResult<Json<Value>> {
    let query = BookQuery {
        available: (params.disponible.as_deref() == Some("true")).then_some(true),
        limit: Some(params.limit),
        offset: params.offset,
        ..BookQuery::default()
    };
    let data = state
        .with_library(move |library| {
            let books = library.catalog.list_books(&query)?;
            BookJson::load_all(library, books)
        })
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": data.len(),
        "data": data,
    })))
}
