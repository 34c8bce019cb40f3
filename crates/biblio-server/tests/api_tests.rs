use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::NaiveDate;
use serde_json::{Value, json};
use tower::ServiceExt;

use biblio_adapters::{FixedClock, InMemoryStore};
use biblio_core::{
    application::{CheckoutRequest, Library, LibrarySettings, MemberRegistration},
    domain::{BookDraft, BookId, ContactDraft},
};
use biblio_server::Server;

fn library() -> Arc<Library> {
    let clock = FixedClock::at(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
    Arc::new(biblio_adapters::library(
        InMemoryStore::new(),
        Arc::new(clock),
        LibrarySettings::default(),
    ))
}

fn router(library: Arc<Library>, token: Option<&str>) -> Router {
    let mut builder = Server::builder().library(library);
    if let Some(token) = token {
        builder = builder.api_token(token);
    }
    builder.build().unwrap().router()
}

fn seed(library: &Library) {
    for (title, isbn) in [
        ("Rayuela", "9788420412146"),
        ("Ficciones", "9788420633800"),
        ("Cien años de soledad", "9788437604947"),
    ] {
        library
            .catalog
            .create_book(BookDraft::new(title).isbn(isbn).price(20.0))
            .unwrap();
    }
}

async fn call(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {}", token));
    }
    let body = match body {
        Some(v) => Body::from(serde_json::to_string(&v).unwrap()),
        None => Body::empty(),
    };
    let resp = router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), 1024 * 1024)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn rpc(params: Value) -> Option<Value> {
    Some(json!({ "jsonrpc": "2.0", "id": 7, "params": params }))
}

#[tokio::test]
async fn public_listing_filters_available_books() {
    let library = library();
    seed(&library);
    let member = library
        .members
        .register(MemberRegistration::new_person(ContactDraft::person("Ana")))
        .unwrap();
    library
        .loans
        .checkout(CheckoutRequest::new(BookId::new(1), member.member.id))
        .unwrap();
    let router = router(library, Some("s3cret"));

    let (status, body) = call(&router, "GET", "/api/library/public/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 3);

    let (_, body) = call(
        &router,
        "GET",
        "/api/library/public/books?disponible=true&limit=1",
        None,
        None,
    )
    .await;
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["name"], "Cien años de soledad");
    assert_eq!(body["data"][0]["status"], "available");
}

#[tokio::test]
async fn private_endpoints_need_the_token() {
    let router = router(library(), Some("s3cret"));

    let (status, body) = call(&router, "GET", "/api/v2/books", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unauthorized");

    let (status, _) = call(&router, "GET", "/api/v2/books", None, Some("wrong")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&router, "GET", "/api/v2/books", None, Some("s3cret")).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn rpc_list_applies_domain_and_order() {
    let library = library();
    seed(&library);
    let router = router(library, None);

    let (status, body) = call(
        &router,
        "POST",
        "/api/library/books",
        rpc(json!({
            "domain": [["name", "ilike", "a"], ["available", "=", true]],
            "order": "name desc",
            "limit": 2
        })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], 7);
    let names: Vec<&str> = body["result"]["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Rayuela", "Cien años de soledad"]);
}

#[tokio::test]
async fn rpc_crud_reports_errors_in_result() {
    let router = router(library(), None);

    let (_, body) = call(&router, "POST", "/api/library/book/create", rpc(json!({})), None).await;
    assert_eq!(body["result"]["error"], "Field required: name");

    let (_, body) = call(
        &router,
        "POST",
        "/api/library/book/create",
        rpc(json!({ "name": "Rayuela", "isbn": "978-84-204-1214-6", "paginas": 736 })),
        None,
    )
    .await;
    assert_eq!(body["result"]["success"], true);
    let id = body["result"]["id"].as_u64().unwrap();

    let (_, body) = call(
        &router,
        "POST",
        "/api/library/book/create",
        rpc(json!({ "name": "Otra Rayuela", "isbn": "9788420412146" })),
        None,
    )
    .await;
    assert_eq!(
        body["result"]["error"],
        "A book with ISBN 9788420412146 already exists"
    );

    let (_, body) = call(
        &router,
        "POST",
        &format!("/api/library/book/update/{}", id),
        rpc(json!({ "price": 22.5 })),
        None,
    )
    .await;
    assert_eq!(body["result"]["message"], "Book updated");

    let (_, body) = call(&router, "POST", &format!("/api/library/book/{}", id), rpc(json!({})), None).await;
    assert_eq!(body["result"]["data"]["price"], 22.5);
    assert_eq!(body["result"]["data"]["pages"], 736);

    let (_, body) = call(&router, "POST", "/api/library/book/delete/99", rpc(json!({})), None).await;
    assert_eq!(body["result"]["error"], "Book not found");
    assert_eq!(body["result"]["id"], 99);
}

#[tokio::test]
async fn rest_maps_failures_to_status_codes() {
    let library = library();
    let router = router(library.clone(), None);

    let (status, body) = call(
        &router,
        "POST",
        "/api/v2/books",
        Some(json!({ "name": "Rayuela", "isbn": "9788420412146" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["id"].as_u64().unwrap();

    let (status, body) = call(&router, "GET", "/api/v2/books/404", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Book 404 not found");

    let (status, _) = call(
        &router,
        "POST",
        "/api/v2/books",
        Some(json!({ "name": "Broken", "isbn": "12" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(
        &router,
        "POST",
        "/api/v2/books",
        Some(json!({ "name": "Copy", "isbn": "978-84-204-1214-6" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/v2/books/{}", id),
        Some(json!({ "status": "maintenance" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["available"], false);

    let (status, body) = call(&router, "GET", "/api/v2/books?status=maintenance", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);

    let (status, _) = call(&router, "DELETE", &format!("/api/v2/books/{}", id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(library.catalog.get_book(id.into()).is_err());
}

#[tokio::test]
async fn docs_list_every_endpoint() {
    let router = router(library(), Some("s3cret"));
    let req = Request::builder()
        .uri("/api/library/docs")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), 64 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("/api/library/book/create"));
    assert!(text.contains("DELETE /api/v2/books/{id}"));
}

#[tokio::test]
async fn multibyte_isbn_is_a_validation_error() {
    let library = library();
    let router = router(library.clone(), None);

    let (status, body) = call(
        &router,
        "POST",
        "/api/v2/books",
        Some(json!({ "name": "Rayuela", "isbn": "12345678é" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "validation");

    let (status, body) = call(
        &router,
        "POST",
        "/api/library/book/create",
        rpc(json!({ "name": "Rayuela", "isbn": "123456789é" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["result"]["error"].as_str().unwrap().starts_with("Invalid ISBN"));

    let (status, body) = call(&router, "GET", "/api/v2/books", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 0);
}

#[tokio::test]
async fn concurrent_writes_all_land() {
    let library = library();
    let router = router(library.clone(), None);

    let calls = (0..8).map(|n| {
        let router = router.clone();
        async move {
            call(
                &router,
                "POST",
                "/api/v2/books",
                Some(json!({ "name": format!("Libro {n}") })),
                None,
            )
            .await
            .0
        }
    });
    for status in spawn_all(calls).await {
        assert_eq!(status, StatusCode::CREATED);
    }
    assert_eq!(library.catalog.list_books(&Default::default()).unwrap().len(), 8);
}

async fn spawn_all<F>(calls: impl Iterator<Item = F>) -> Vec<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    let handles: Vec<_> = calls.map(tokio::spawn).collect();
    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        out.push(handle.await.unwrap());
    }
    out
}
