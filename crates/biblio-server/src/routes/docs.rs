use axum::{Router, routing::get};

pub fn routes() -> Router<crate::state::AppState> {
    Router::new().route("/api/library/docs", get(docs))
}

const DOCS: &str = "\
Biblio HTTP API

Public
  GET  /api/library/public/books?limit=100&offset=0&disponible=true

JSON-RPC (POST, body {\"jsonrpc\": \"2.0\", \"params\": {...}})
  POST /api/library/books              list (domain, limit, offset, order)
  POST /api/library/book/{id}          get one book
  POST /api/library/book/create        create (name required)
  POST /api/library/book/update/{id}   update
  POST /api/library/book/delete/{id}   delete

REST v2
  GET    /api/v2/books?search=&status=&limit=50
  POST   /api/v2/books
  GET    /api/v2/books/{id}
  PUT    /api/v2/books/{id}
  DELETE /api/v2/books/{id}

Authentication
  When the server has an API token, JSON-RPC and REST calls need
  the header `Authorization: Bearer <token>`.
";

async fn docs() -> &'static str {
    DOCS
}
