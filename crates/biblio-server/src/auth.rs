//! Bearer token check for the private endpoints.

use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::{IntoResponse, Response},
};
use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{error::ApiError, state::AppState};

/// Reject requests without the configured token. Open when no token is set.
pub async fn require_token(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let Some(expected) = state.api_token.as_deref() else {
        return next.run(req).await;
    };

    let token = extract_bearer(req.headers());
    if token.is_some_and(|t| token_matches(t, expected)) {
        return next.run(req).await;
    }
    debug!(
        path = %req.uri().path(),
        present = token.is_some(),
        "Rejected request without a valid token"
    );
    ApiError::Unauthorized.into_response()
}

/// Compare without leaking how many leading bytes matched.
fn token_matches(given: &str, expected: &str) -> bool {
    given.as_bytes().ct_eq(expected.as_bytes()).into()
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn bearer_prefix_is_required() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer s3cret"));
        assert_eq!(extract_bearer(&headers), Some("s3cret"));

        headers.insert("authorization", HeaderValue::from_static("Basic s3cret"));
        assert_eq!(extract_bearer(&headers), None);
    }

    #[test]
    fn token_comparison() {
        assert!(token_matches("s3cret", "s3cret"));
        assert!(!token_matches("s3cre", "s3cret"));
        assert!(!token_matches("s3cret!", "s3cret"));
        assert!(!token_matches("S3cret", "s3cret"));
        assert!(!token_matches("", "s3cret"));
    }
}
